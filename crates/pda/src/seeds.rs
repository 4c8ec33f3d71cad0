//! Owned seed lists and derivation results.

use ccq_primitives::Pubkey;

use crate::{
    derive::{check_unbumped_seeds, find_program_address},
    PdaError,
};

/// Ordered list of derivation seeds.
///
/// The bump is not part of the set; it is appended by the derivation. Limits
/// are checked on construction so a set that exists can always be fed to
/// [`SeedSet::derive`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SeedSet(Vec<Vec<u8>>);

impl SeedSet {
    pub fn new(seeds: Vec<Vec<u8>>) -> Result<Self, PdaError> {
        let refs: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
        check_unbumped_seeds(&refs)?;
        Ok(Self(seeds))
    }

    /// Seed set made of account keys, the common case for token accounts.
    pub fn from_pubkeys(keys: &[Pubkey]) -> Result<Self, PdaError> {
        Self::new(keys.iter().map(|k| k.to_bytes().to_vec()).collect())
    }

    pub fn seeds(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Vec<u8>> {
        self.0
    }

    /// Derives the canonical address of this seed set under `program_id`.
    pub fn derive(&self, program_id: &Pubkey) -> Result<DerivedAddress, PdaError> {
        let refs: Vec<&[u8]> = self.0.iter().map(Vec::as_slice).collect();
        let (address, bump) = find_program_address(&refs, program_id)?;
        Ok(DerivedAddress { address, bump })
    }
}

/// Canonical program-derived address and the bump that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
}

#[cfg(test)]
mod tests {
    use ccq_primitives::constants::TOKEN_PROGRAM_ID;

    use super::*;
    use crate::{MAX_SEEDS, MAX_SEED_LEN};

    #[test]
    fn test_seed_set_limits() {
        assert!(SeedSet::new(vec![vec![0; MAX_SEED_LEN]; MAX_SEEDS - 1]).is_ok());
        assert!(matches!(
            SeedSet::new(vec![vec![0; 1]; MAX_SEEDS]),
            Err(PdaError::TooManySeeds { .. })
        ));
        assert!(matches!(
            SeedSet::new(vec![vec![0; MAX_SEED_LEN + 1]]),
            Err(PdaError::MaxSeedLengthExceeded { index: 0, .. })
        ));
    }

    #[test]
    fn test_seed_set_fails_like_find_program_address() {
        let cases = [
            vec![vec![0; 1]; MAX_SEEDS],
            vec![vec![0; 1]; MAX_SEEDS + 3],
            vec![vec![1], vec![0; MAX_SEED_LEN + 1]],
            vec![vec![0; MAX_SEED_LEN + 1]; MAX_SEEDS],
        ];
        for seeds in cases {
            let refs: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
            let direct = find_program_address(&refs, &TOKEN_PROGRAM_ID).unwrap_err();
            assert_eq!(SeedSet::new(seeds.clone()).unwrap_err(), direct);
        }
    }

    #[test]
    fn test_derive_matches_free_function() {
        let set = SeedSet::new(vec![b"vault".to_vec(), vec![1, 2, 3]]).unwrap();
        let derived = set.derive(&TOKEN_PROGRAM_ID).unwrap();
        let seeds: [&[u8]; 2] = [b"vault", &[1, 2, 3]];
        let (address, bump) = find_program_address(&seeds, &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(derived, DerivedAddress { address, bump });
    }
}
