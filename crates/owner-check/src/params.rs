use ccq_pda::{associated_token_seeds, SeedSet};
use ccq_primitives::{constants::ASSOCIATED_TOKEN_PROGRAM_ID, ChainId, Finality, Pubkey};
use ccq_query_types::{ChainQuery, PdaLookup, PerChainQueryRequest, QueryRequest, SolanaPdaQueryRequest};

/// Whose token account to check, for which mint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OwnerCheckParams {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub token_program: Pubkey,
    pub finality: Finality,
    pub nonce: u32,
}

impl OwnerCheckParams {
    pub fn seeds(&self) -> SeedSet {
        associated_token_seeds(&self.owner, &self.token_program, &self.mint)
    }

    /// A single Solana PDA query for the owner's associated token account.
    pub fn request(&self) -> QueryRequest {
        let lookup = PdaLookup::new(ASSOCIATED_TOKEN_PROGRAM_ID, self.seeds().into_inner());
        QueryRequest::new(
            self.nonce,
            vec![PerChainQueryRequest::new(
                ChainId::SOLANA,
                ChainQuery::SolanaPda(SolanaPdaQueryRequest::new(self.finality, vec![lookup])),
            )],
        )
    }
}
