use alloy_primitives::B256;
use ccq_crypto::QuorumError;
use ccq_primitives::{ChainId, Finality};
use ccq_query_types::CodecError;
use thiserror::Error;

use crate::predicate::PredicateError;

/// Reasons the verifier rejects a submission. Each maps to a revert of the
/// on-chain verifier.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("abi: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    /// Signature `v` outside 27/28.
    #[error("invalid signature v {0}")]
    InvalidV(u8),

    #[error("quorum: {0}")]
    Quorum(#[from] QuorumError),

    #[error("response: {0}")]
    Codec(#[from] CodecError),

    #[error("expected exactly one per-chain response, got {0}")]
    UnexpectedResponseCount(usize),

    #[error("response is for chain {0}, expected solana")]
    UnexpectedChain(ChainId),

    #[error("expected a solana pda response")]
    UnexpectedQueryType,

    #[error("commitment {0} is not accepted, need finalized")]
    UnexpectedCommitment(Finality),

    #[error("expected exactly one result, got {0}")]
    UnexpectedResultCount(usize),

    #[error("block time {block_time}s is before the oldest accepted {min_block_time}s")]
    StaleBlockTime { block_time: u64, min_block_time: u64 },

    #[error("ownership: {0}")]
    Predicate(#[from] PredicateError),

    #[error("response {0} already verified")]
    AlreadyVerified(B256),
}

impl VerifyError {
    /// Whether the signatures, rather than the attested content, were at
    /// fault.
    pub fn is_quorum_failure(&self) -> bool {
        matches!(self, Self::Quorum(_) | Self::InvalidV(_))
    }
}
