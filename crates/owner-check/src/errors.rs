use ccq_pda::PdaError;
use ccq_primitives::Pubkey;
use ccq_proxy::ProxyError;
use ccq_query_types::CodecError;
use ccq_verifier::{ReceiptError, VerifyError};
use thiserror::Error;

/// Failure of any pipeline step. Every variant aborts the check.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("derivation: {0}")]
    Derivation(#[from] PdaError),

    #[error("proxy: {0}")]
    Proxy(#[from] ProxyError),

    #[error("signed response: {0}")]
    Codec(#[from] CodecError),

    /// The signed response decoded, but its first per-chain response holds
    /// no PDA result.
    #[error("signed response carries no PDA result")]
    MissingPdaResult,

    /// The verifier did not accept the signatures.
    #[error("quorum failure: {0}")]
    QuorumFailure(VerifyError),

    /// The verifier accepted the signatures but not the attested content.
    #[error("verifier rejected the response: {0}")]
    Rejected(VerifyError),

    #[error("receipt: {0}")]
    Receipt(#[from] ReceiptError),

    /// A value reported downstream differs from the local expectation.
    #[error("{field} mismatch: expected {expected}, got {got}")]
    Mismatch {
        field: &'static str,
        expected: Pubkey,
        got: Pubkey,
    },
}

impl From<VerifyError> for FlowError {
    fn from(e: VerifyError) -> Self {
        if e.is_quorum_failure() {
            Self::QuorumFailure(e)
        } else {
            Self::Rejected(e)
        }
    }
}
