//! Associated token account derivation.

use ccq_primitives::{constants::ASSOCIATED_TOKEN_PROGRAM_ID, Pubkey};

use crate::{DerivedAddress, PdaError, SeedSet};

/// Seeds of the associated token account of `owner` for `mint`, in the order
/// the associated token program expects.
pub fn associated_token_seeds(owner: &Pubkey, token_program: &Pubkey, mint: &Pubkey) -> SeedSet {
    // Three 32-byte seeds are always within limits.
    SeedSet::from_pubkeys(&[*owner, *token_program, *mint])
        .expect("three account keys are valid seeds")
}

/// Derives the associated token account of `owner` for `mint`.
pub fn associated_token_address(
    owner: &Pubkey,
    token_program: &Pubkey,
    mint: &Pubkey,
) -> Result<DerivedAddress, PdaError> {
    associated_token_seeds(owner, token_program, mint).derive(&ASSOCIATED_TOKEN_PROGRAM_ID)
}
