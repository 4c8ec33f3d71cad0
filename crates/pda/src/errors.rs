use thiserror::Error;

/// Errors from deriving a program address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PdaError {
    /// A single seed is longer than [`MAX_SEED_LEN`](crate::MAX_SEED_LEN).
    #[error("seed {index} is {len} bytes, max is {max}")]
    MaxSeedLengthExceeded { index: usize, len: usize, max: usize },

    /// More seeds than the chain accepts, counting the bump.
    #[error("too many seeds: {count} (max {max})")]
    TooManySeeds { count: usize, max: usize },

    /// The candidate for this exact bump lies on the curve.
    #[error("derived candidate lies on the ed25519 curve")]
    OnCurve,

    /// No bump in `1..=255` produced an off-curve candidate.
    #[error("no viable bump found for program {program}")]
    DerivationExhausted { program: String },
}
