//! Error types for guardian signature operations.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors that can occur while building a guardian set or checking a
/// signature set against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuorumError {
    /// Not enough signatures to meet the quorum.
    #[error("insufficient signatures: provided {provided}, required {required}")]
    InsufficientSignatures { provided: usize, required: usize },

    /// Guardian set has no members.
    #[error("guardian set is empty")]
    EmptyGuardianSet,

    /// Guardian set exceeds what a `u8` index can address.
    #[error("too many guardians: {0}")]
    TooManyGuardians(usize),

    /// Same guardian address listed twice.
    #[error("duplicate guardian {0}")]
    DuplicateGuardian(Address),

    /// Guardian set expired before the signatures were checked.
    #[error("guardian set {index} expired at {expiration_time}, now {now}")]
    GuardianSetExpired {
        index: u32,
        expiration_time: u32,
        now: u64,
    },

    /// Signature verification failed.
    #[error("invalid signature for guardian {index}")]
    InvalidSignature { index: u8 },

    /// Signature bytes do not form a recoverable signature.
    #[error("invalid signature format")]
    InvalidSignatureFormat,

    /// Encoded signature has the wrong length.
    #[error("expected {expected} signature bytes, got {got}")]
    InvalidSignatureLength { expected: usize, got: usize },

    /// Encoded value is not hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Secret key bytes are not a valid scalar.
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// Same guardian index signed twice.
    #[error("duplicate guardian index: {0}")]
    DuplicateGuardianIndex(u8),

    /// Guardian indices are not strictly ascending.
    #[error("guardian index {index} follows {previous}")]
    SignaturesOutOfOrder { previous: u8, index: u8 },

    /// Guardian index out of bounds.
    #[error("guardian index {index} out of bounds (set size {max})")]
    GuardianIndexOutOfBounds { index: u8, max: usize },
}

impl From<hex::FromHexError> for QuorumError {
    fn from(e: hex::FromHexError) -> Self {
        Self::InvalidHex(e.to_string())
    }
}
