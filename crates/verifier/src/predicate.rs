//! Ownership predicates over an attested derived account.

use ccq_primitives::{
    constants::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID},
    Pubkey,
};
use ccq_query_types::{PdaLookup, SolanaPdaResult};
use thiserror::Error;

use crate::token_account::{read_mint_and_owner, TokenAccountError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("account derived under {0}, expected the associated token program")]
    WrongProgram(Pubkey),

    #[error("expected 3 seeds, got {0}")]
    SeedCount(usize),

    #[error("owner seed is not a 32-byte key")]
    InvalidOwnerSeed,

    #[error("token program seed does not match")]
    WrongTokenProgram,

    #[error("mint seed does not match")]
    WrongMintSeed,

    #[error("account is owned by {0}, expected the token program")]
    WrongAccountOwner(Pubkey),

    #[error("token account: {0}")]
    TokenAccount(#[from] TokenAccountError),

    #[error("token account mint {got}, expected {expected}")]
    WrongMint { expected: Pubkey, got: Pubkey },

    #[error("token account owner {data} differs from seed owner {seed}")]
    OwnerMismatch { seed: Pubkey, data: Pubkey },
}

/// Decides who owns an attested account.
pub trait OwnershipPredicate {
    /// Returns the proven owner of `result.account`, or why it cannot be
    /// proven.
    fn check(&self, lookup: &PdaLookup, result: &SolanaPdaResult) -> Result<Pubkey, PredicateError>;
}

/// Ownership of an associated token account of a fixed mint.
///
/// The owner is the first derivation seed. The account data has to agree:
/// a token account for the configured mint held by that same owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TokenAccountOwnership {
    mint: Pubkey,
    token_program: Pubkey,
}

impl TokenAccountOwnership {
    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            token_program: TOKEN_PROGRAM_ID,
        }
    }

    pub fn with_token_program(mut self, token_program: Pubkey) -> Self {
        self.token_program = token_program;
        self
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    pub fn token_program(&self) -> &Pubkey {
        &self.token_program
    }
}

impl OwnershipPredicate for TokenAccountOwnership {
    fn check(&self, lookup: &PdaLookup, result: &SolanaPdaResult) -> Result<Pubkey, PredicateError> {
        if lookup.program != ASSOCIATED_TOKEN_PROGRAM_ID {
            return Err(PredicateError::WrongProgram(lookup.program));
        }

        let [owner_seed, program_seed, mint_seed] = lookup.seeds.as_slice() else {
            return Err(PredicateError::SeedCount(lookup.seeds.len()));
        };
        let seed_owner =
            Pubkey::try_from_slice(owner_seed).map_err(|_| PredicateError::InvalidOwnerSeed)?;
        if program_seed.as_slice() != self.token_program.as_bytes() {
            return Err(PredicateError::WrongTokenProgram);
        }
        if mint_seed.as_slice() != self.mint.as_bytes() {
            return Err(PredicateError::WrongMintSeed);
        }

        if result.owner != self.token_program {
            return Err(PredicateError::WrongAccountOwner(result.owner));
        }

        let (mint, owner) = read_mint_and_owner(&result.data)?;
        if mint != self.mint {
            return Err(PredicateError::WrongMint {
                expected: self.mint,
                got: mint,
            });
        }
        if owner != seed_owner {
            return Err(PredicateError::OwnerMismatch {
                seed: seed_owner,
                data: owner,
            });
        }

        Ok(seed_owner)
    }
}
