//! Collection of data types shared by the query, verification and derivation
//! crates.

mod chain;
pub mod constants;
mod pubkey;

pub use chain::{ChainId, Finality, ParseFinalityError};
pub use pubkey::{ParsePubkeyError, Pubkey, PUBKEY_LEN};
