//! In-process query proxy.

use std::fmt;

use ccq_crypto::{GuardianSignature, GuardianSigner};
use ccq_pda::SeedSet;
use ccq_primitives::{ChainId, Finality, Pubkey};
use ccq_query_types::{
    encode_to_vec, response_digest, ChainQuery, ChainQueryResponse, PerChainQueryResponse,
    QueryRequest, QueryResponse, SolanaAccountQueryRequest, SolanaAccountQueryResponse,
    SolanaAccountResult, SolanaPdaQueryRequest, SolanaPdaQueryResponse, SolanaPdaResult,
    OFF_CHAIN_REQUEST_ID_LEN,
};
use tracing::{debug, info, instrument};

use crate::{AccountSource, AccountState, ProxyError, SignedQueryResponse, SlotInfo};

/// Request id the mock answers with. Off-chain requests are identified by
/// the requester's signature; the mock does not require one.
pub const MOCK_REQUEST_ID: [u8; OFF_CHAIN_REQUEST_ID_LEN] = [0; OFF_CHAIN_REQUEST_ID_LEN];

/// Answers query requests with guardian-signed responses.
pub trait QueryProxy {
    fn query(&self, request: &QueryRequest) -> Result<SignedQueryResponse, ProxyError>;
}

/// Serves Solana queries from an [`AccountSource`] and signs with every
/// configured guardian key.
pub struct MockQueryProxy<S> {
    source: S,
    signers: Vec<GuardianSigner>,
}

impl<S: AccountSource> MockQueryProxy<S> {
    /// Signers are ordered by guardian index so the signature list comes out
    /// in the order verifiers require.
    pub fn new(source: S, mut signers: Vec<GuardianSigner>) -> Result<Self, ProxyError> {
        if signers.is_empty() {
            return Err(ProxyError::NoSigners);
        }
        signers.sort_by_key(GuardianSigner::index);
        Ok(Self { source, signers })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Builds the unsigned response to `request`.
    pub fn respond(&self, request: &QueryRequest) -> Result<QueryResponse, ProxyError> {
        let mut responses = Vec::with_capacity(request.requests.len());
        for per_chain in &request.requests {
            if per_chain.chain_id != ChainId::SOLANA {
                return Err(ProxyError::UnsupportedChain(per_chain.chain_id));
            }

            let response = match &per_chain.query {
                ChainQuery::SolanaAccount(q) => {
                    ChainQueryResponse::SolanaAccount(self.accounts_query(q)?)
                }
                ChainQuery::SolanaPda(q) => ChainQueryResponse::SolanaPda(self.pda_query(q)?),
            };
            responses.push(PerChainQueryResponse::new(per_chain.chain_id, response));
        }

        Ok(QueryResponse::try_new(
            ChainId::OFF_CHAIN,
            MOCK_REQUEST_ID.to_vec(),
            request.clone(),
            responses,
        )?)
    }

    fn sign(&self, bytes: &[u8]) -> Vec<GuardianSignature> {
        let digest = response_digest(bytes);
        self.signers
            .iter()
            .map(|signer| signer.sign_digest(&digest.0))
            .collect()
    }

    fn context_slot(&self, commitment: Finality, min_context_slot: u64) -> Result<SlotInfo, ProxyError> {
        let info = self.source.slot_info(commitment)?;
        if info.slot < min_context_slot {
            return Err(ProxyError::MinContextSlotNotReached {
                slot: info.slot,
                min: min_context_slot,
            });
        }
        Ok(info)
    }

    fn fetch(&self, address: &Pubkey, commitment: Finality) -> Result<AccountState, ProxyError> {
        self.source
            .get_account(address, commitment)?
            .ok_or(ProxyError::AccountNotFound {
                account: *address,
                finality: commitment,
            })
    }

    fn accounts_query(
        &self,
        query: &SolanaAccountQueryRequest,
    ) -> Result<SolanaAccountQueryResponse, ProxyError> {
        let info = self.context_slot(query.commitment, query.min_context_slot)?;

        let mut results = Vec::with_capacity(query.accounts.len());
        for address in &query.accounts {
            let state = self.fetch(address, query.commitment)?;
            results.push(SolanaAccountResult {
                lamports: state.lamports,
                rent_epoch: state.rent_epoch,
                executable: state.executable,
                owner: state.owner,
                data: slice_data(&state.data, query.data_slice_offset, query.data_slice_length),
            });
        }

        Ok(SolanaAccountQueryResponse {
            slot_number: info.slot,
            block_time_us: info.block_time_us,
            block_hash: info.block_hash,
            results,
        })
    }

    fn pda_query(&self, query: &SolanaPdaQueryRequest) -> Result<SolanaPdaQueryResponse, ProxyError> {
        let info = self.context_slot(query.commitment, query.min_context_slot)?;

        let mut results = Vec::with_capacity(query.pdas.len());
        for lookup in &query.pdas {
            let derived = SeedSet::new(lookup.seeds.clone())?.derive(&lookup.program)?;
            debug!(program = %lookup.program, account = %derived.address, bump = derived.bump, "derived pda");

            let state = self.fetch(&derived.address, query.commitment)?;
            results.push(SolanaPdaResult {
                account: derived.address,
                bump: derived.bump,
                lamports: state.lamports,
                rent_epoch: state.rent_epoch,
                executable: state.executable,
                owner: state.owner,
                data: slice_data(&state.data, query.data_slice_offset, query.data_slice_length),
            });
        }

        Ok(SolanaPdaQueryResponse {
            slot_number: info.slot,
            block_time_us: info.block_time_us,
            block_hash: info.block_hash,
            results,
        })
    }
}

impl<S: AccountSource> QueryProxy for MockQueryProxy<S> {
    #[instrument(skip_all, fields(nonce = request.nonce))]
    fn query(&self, request: &QueryRequest) -> Result<SignedQueryResponse, ProxyError> {
        let response = self.respond(request)?;
        let bytes = encode_to_vec(&response)?;
        let signatures = self.sign(&bytes);

        info!(
            len = bytes.len(),
            signatures = signatures.len(),
            "signed query response"
        );
        Ok(SignedQueryResponse::new(bytes, signatures))
    }
}

impl<S: fmt::Debug> fmt::Debug for MockQueryProxy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockQueryProxy")
            .field("source", &self.source)
            .field("signers", &self.signers)
            .finish()
    }
}

/// Applies a Solana RPC data slice. Offset and length both zero return the
/// full data; ranges past the end are clamped.
fn slice_data(data: &[u8], offset: u64, length: u64) -> Vec<u8> {
    if offset == 0 && length == 0 {
        return data.to_vec();
    }

    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
    let len = usize::try_from(length).unwrap_or(usize::MAX);
    let end = start.saturating_add(len).min(data.len());
    data[start..end].to_vec()
}
