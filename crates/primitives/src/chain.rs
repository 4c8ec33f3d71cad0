//! Chain identifiers and commitment levels.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wormhole chain identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u16);

impl ChainId {
    /// Off-chain requester (query proxy clients).
    pub const OFF_CHAIN: ChainId = ChainId(0);
    pub const SOLANA: ChainId = ChainId(1);
    pub const ETHEREUM: ChainId = ChainId(2);

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for ChainId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Commitment level a queried account state must have reached.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    #[default]
    Finalized,
    Confirmed,
}

impl Finality {
    /// Name used on the wire and by the Solana RPC.
    pub const fn as_str(self) -> &'static str {
        match self {
            Finality::Finalized => "finalized",
            Finality::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for Finality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown commitment level: {0:?}")]
pub struct ParseFinalityError(pub String);

impl FromStr for Finality {
    type Err = ParseFinalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finalized" => Ok(Finality::Finalized),
            "confirmed" => Ok(Finality::Confirmed),
            other => Err(ParseFinalityError(other.to_owned())),
        }
    }
}
