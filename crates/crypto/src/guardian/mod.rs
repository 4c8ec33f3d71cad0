//! Guardian signature sets (M-of-N, M = 2N/3 + 1).
//!
//! Guardians are identified by their EVM address. Each signature names the
//! index of its guardian in the set and must recover to that guardian's
//! address over the attested digest.

mod errors;
mod set;
mod signature;
mod signer;
mod verification;

pub use errors::QuorumError;
pub use set::{GuardianSet, MAX_GUARDIANS};
pub use signature::{GuardianSignature, SignatureSet, GUARDIAN_SIGNATURE_LEN};
pub use signer::{pubkey_to_address, GuardianSigner};
pub use verification::verify_quorum;
