use ccq_pda::PdaError;
use ccq_primitives::{ChainId, Finality, Pubkey};
use ccq_query_types::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream chain state could not be read.
    #[error("proxy unavailable: {0}")]
    Unavailable(String),

    #[error("account {account} not found at {finality} commitment")]
    AccountNotFound { account: Pubkey, finality: Finality },

    #[error("unsupported chain {0}")]
    UnsupportedChain(ChainId),

    #[error("context slot {slot} is behind the requested minimum {min}")]
    MinContextSlotNotReached { slot: u64, min: u64 },

    #[error("no guardian signers configured")]
    NoSigners,

    #[error("fixture: {0}")]
    Fixture(String),

    #[error("derivation: {0}")]
    Derivation(#[from] PdaError),

    #[error("codec: {0}")]
    Codec(#[from] CodecError),
}
