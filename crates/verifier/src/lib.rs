//! Verifier side of the ownership attestation.
//!
//! Executes the owner verifier contract's logic over ABI-encoded calldata:
//! guardian quorum over the response digest, shape and freshness of the
//! attested Solana response, then an [`OwnershipPredicate`]. Accepted calls
//! produce a [`Receipt`] carrying an ABI-encoded `OwnerVerified` log.

pub mod abi;
mod clock;
mod errors;
mod predicate;
mod receipt;
pub mod token_account;
mod verifier;

pub use abi::{encode_verify_owner, evm_struct_to_signatures, signatures_to_evm_struct};
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::VerifyError;
pub use predicate::{OwnershipPredicate, PredicateError, TokenAccountOwnership};
pub use receipt::{Receipt, ReceiptError, VerificationResult};
pub use verifier::{
    OwnerVerifier, ReplayPolicy, VerificationState, VerifierClient, VerifierConfig,
    DEFAULT_ALLOWED_STALENESS_SECS, DEFAULT_REJECTED_CAPACITY,
};
