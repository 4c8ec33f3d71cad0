//! Candidate hashing and the bump search.

use ccq_primitives::{Pubkey, PUBKEY_LEN};
use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::PdaError;

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Marker appended after the program id in every candidate preimage.
pub const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// Returns `true` if the bytes decompress to a point on the Ed25519 curve.
///
/// Such an address could have a private key, so it is never a valid
/// program-derived address.
pub fn is_on_curve(bytes: &[u8; PUBKEY_LEN]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

/// Derives the address for an exact seed list, where the caller already
/// appended the bump as the last seed.
///
/// Fails with [`PdaError::OnCurve`] if the candidate is a curve point.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, PdaError> {
    create_with(seeds, program_id, is_on_curve)
}

/// Searches bumps from 255 down to 1 and returns the first off-curve address
/// together with its bump.
///
/// `seeds` must leave room for the bump, so at most [`MAX_SEEDS`]` - 1`.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), PdaError> {
    find_with(seeds, program_id, is_on_curve)
}

fn check_seeds(seeds: &[&[u8]]) -> Result<(), PdaError> {
    if seeds.len() > MAX_SEEDS {
        return Err(PdaError::TooManySeeds {
            count: seeds.len(),
            max: MAX_SEEDS,
        });
    }
    check_seed_lengths(seeds)
}

/// Checks seeds that still need the bump appended.
pub(crate) fn check_unbumped_seeds(seeds: &[&[u8]]) -> Result<(), PdaError> {
    // The bump takes one seed slot.
    if seeds.len() >= MAX_SEEDS {
        return Err(PdaError::TooManySeeds {
            count: seeds.len() + 1,
            max: MAX_SEEDS,
        });
    }
    check_seed_lengths(seeds)
}

fn check_seed_lengths(seeds: &[&[u8]]) -> Result<(), PdaError> {
    if let Some((index, seed)) = seeds
        .iter()
        .enumerate()
        .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
        return Err(PdaError::MaxSeedLengthExceeded {
            index,
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }

    Ok(())
}

fn candidate(seeds: &[&[u8]], program_id: &Pubkey) -> [u8; PUBKEY_LEN] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

fn create_with(
    seeds: &[&[u8]],
    program_id: &Pubkey,
    on_curve: impl Fn(&[u8; PUBKEY_LEN]) -> bool,
) -> Result<Pubkey, PdaError> {
    check_seeds(seeds)?;

    let hash = candidate(seeds, program_id);
    if on_curve(&hash) {
        return Err(PdaError::OnCurve);
    }

    Ok(Pubkey::new(hash))
}

pub(crate) fn find_with(
    seeds: &[&[u8]],
    program_id: &Pubkey,
    on_curve: impl Fn(&[u8; PUBKEY_LEN]) -> bool,
) -> Result<(Pubkey, u8), PdaError> {
    check_unbumped_seeds(seeds)?;

    for bump in (1..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);

        match create_with(&with_bump, program_id, &on_curve) {
            Ok(address) => return Ok((address, bump)),
            Err(PdaError::OnCurve) => trace!(bump, "candidate on curve"),
            Err(e) => return Err(e),
        }
    }

    Err(PdaError::DerivationExhausted {
        program: program_id.to_string(),
    })
}
