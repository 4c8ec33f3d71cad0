//! Program-derived address derivation.
//!
//! Mirrors the chain's canonical algorithm: a candidate is the SHA-256 of the
//! seeds, a bump byte, the owning program and a fixed marker, and it is only
//! accepted if it does not decompress to an Ed25519 point. Any deviation here
//! derives a different account than the one a query proxy attests to, so the
//! constants and ordering are fixed.

mod ata;
mod derive;
mod errors;
mod seeds;

pub use ata::{associated_token_address, associated_token_seeds};
pub use derive::{
    create_program_address, find_program_address, is_on_curve, MAX_SEEDS, MAX_SEED_LEN,
    PDA_MARKER,
};
pub use errors::PdaError;
pub use seeds::{DerivedAddress, SeedSet};
