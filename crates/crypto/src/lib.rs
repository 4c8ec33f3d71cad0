//! Cryptographic primitives for guardian attestations.

pub mod guardian;

pub use guardian::{
    verify_quorum, GuardianSet, GuardianSignature, GuardianSigner, QuorumError, SignatureSet,
    GUARDIAN_SIGNATURE_LEN, MAX_GUARDIANS,
};
