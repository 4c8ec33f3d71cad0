//! Query requests.

use bytes::{Buf, BufMut};
use ccq_primitives::{ChainId, Finality, Pubkey};

use crate::codec::{
    decode_exact, read_per_chain_frame, write_bytes_u32, write_count_u8, write_per_chain_frame,
    Codec, CodecError, ReadExt,
};

/// Version byte leading requests and responses.
pub const QUERY_VERSION: u8 = 1;

/// Per-chain query discriminant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum QueryType {
    SolanaAccount = 4,
    SolanaPda = 5,
}

impl TryFrom<u8> for QueryType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(QueryType::SolanaAccount),
            5 => Ok(QueryType::SolanaPda),
            other => Err(CodecError::UnknownQueryType(other)),
        }
    }
}

/// A batch of per-chain queries under one nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRequest {
    pub nonce: u32,
    pub requests: Vec<PerChainQueryRequest>,
}

impl QueryRequest {
    pub fn new(nonce: u32, requests: Vec<PerChainQueryRequest>) -> Self {
        Self { nonce, requests }
    }
}

impl Codec for QueryRequest {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        buf.put_u8(QUERY_VERSION);
        buf.put_u32(self.nonce);
        write_count_u8(buf, self.requests.len(), "per-chain requests")?;
        for request in &self.requests {
            request.encode(buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let version = buf.read_u8()?;
        if version != QUERY_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let nonce = buf.read_u32()?;
        let count = buf.read_u8()?;
        let requests = (0..count)
            .map(|_| PerChainQueryRequest::decode(buf))
            .collect::<Result<_, _>>()?;

        Ok(Self { nonce, requests })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerChainQueryRequest {
    pub chain_id: ChainId,
    pub query: ChainQuery,
}

impl PerChainQueryRequest {
    pub fn new(chain_id: ChainId, query: ChainQuery) -> Self {
        Self { chain_id, query }
    }
}

impl Codec for PerChainQueryRequest {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        let mut body = Vec::new();
        match &self.query {
            ChainQuery::SolanaAccount(q) => q.encode(&mut body)?,
            ChainQuery::SolanaPda(q) => q.encode(&mut body)?,
        }
        write_per_chain_frame(buf, self.chain_id, self.query.query_type() as u8, &body)
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let (chain_id, query_type, body) = read_per_chain_frame(buf)?;
        let query = match QueryType::try_from(query_type)? {
            QueryType::SolanaAccount => ChainQuery::SolanaAccount(decode_exact(&body)?),
            QueryType::SolanaPda => ChainQuery::SolanaPda(decode_exact(&body)?),
        };
        Ok(Self { chain_id, query })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainQuery {
    SolanaAccount(SolanaAccountQueryRequest),
    SolanaPda(SolanaPdaQueryRequest),
}

impl ChainQuery {
    pub fn query_type(&self) -> QueryType {
        match self {
            ChainQuery::SolanaAccount(_) => QueryType::SolanaAccount,
            ChainQuery::SolanaPda(_) => QueryType::SolanaPda,
        }
    }

    /// Number of accounts the query asks for.
    pub fn lookup_count(&self) -> usize {
        match self {
            ChainQuery::SolanaAccount(q) => q.accounts.len(),
            ChainQuery::SolanaPda(q) => q.pdas.len(),
        }
    }
}

/// Reads accounts by address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolanaAccountQueryRequest {
    pub commitment: Finality,
    /// Minimum slot the serving node must have reached; zero means any.
    pub min_context_slot: u64,
    pub data_slice_offset: u64,
    /// Zero returns the whole account data.
    pub data_slice_length: u64,
    pub accounts: Vec<Pubkey>,
}

impl SolanaAccountQueryRequest {
    pub fn new(commitment: Finality, accounts: Vec<Pubkey>) -> Self {
        Self {
            commitment,
            min_context_slot: 0,
            data_slice_offset: 0,
            data_slice_length: 0,
            accounts,
        }
    }
}

impl Codec for SolanaAccountQueryRequest {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        write_bytes_u32(buf, self.commitment.as_str().as_bytes(), "commitment")?;
        buf.put_u64(self.min_context_slot);
        buf.put_u64(self.data_slice_offset);
        buf.put_u64(self.data_slice_length);
        write_count_u8(buf, self.accounts.len(), "accounts")?;
        for account in &self.accounts {
            buf.put_slice(account.as_bytes());
        }
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let commitment = buf.read_commitment()?;
        let min_context_slot = buf.read_u64()?;
        let data_slice_offset = buf.read_u64()?;
        let data_slice_length = buf.read_u64()?;
        let count = buf.read_u8()?;
        let accounts = (0..count)
            .map(|_| buf.read_pubkey())
            .collect::<Result<_, _>>()?;

        Ok(Self {
            commitment,
            min_context_slot,
            data_slice_offset,
            data_slice_length,
            accounts,
        })
    }
}

/// Reads program-derived accounts, naming each by program and seeds. The
/// serving side derives the address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolanaPdaQueryRequest {
    pub commitment: Finality,
    pub min_context_slot: u64,
    pub data_slice_offset: u64,
    pub data_slice_length: u64,
    pub pdas: Vec<PdaLookup>,
}

impl SolanaPdaQueryRequest {
    pub fn new(commitment: Finality, pdas: Vec<PdaLookup>) -> Self {
        Self {
            commitment,
            min_context_slot: 0,
            data_slice_offset: 0,
            data_slice_length: 0,
            pdas,
        }
    }
}

impl Codec for SolanaPdaQueryRequest {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        write_bytes_u32(buf, self.commitment.as_str().as_bytes(), "commitment")?;
        buf.put_u64(self.min_context_slot);
        buf.put_u64(self.data_slice_offset);
        buf.put_u64(self.data_slice_length);
        write_count_u8(buf, self.pdas.len(), "pdas")?;
        for pda in &self.pdas {
            pda.encode(buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let commitment = buf.read_commitment()?;
        let min_context_slot = buf.read_u64()?;
        let data_slice_offset = buf.read_u64()?;
        let data_slice_length = buf.read_u64()?;
        let count = buf.read_u8()?;
        let pdas = (0..count)
            .map(|_| PdaLookup::decode(buf))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            commitment,
            min_context_slot,
            data_slice_offset,
            data_slice_length,
            pdas,
        })
    }
}

/// Program id and the seeds, without bump, of one derived account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdaLookup {
    pub program: Pubkey,
    pub seeds: Vec<Vec<u8>>,
}

impl PdaLookup {
    pub fn new(program: Pubkey, seeds: Vec<Vec<u8>>) -> Self {
        Self { program, seeds }
    }
}

impl Codec for PdaLookup {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        buf.put_slice(self.program.as_bytes());
        write_count_u8(buf, self.seeds.len(), "seeds")?;
        for seed in &self.seeds {
            write_bytes_u32(buf, seed, "seed")?;
        }
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let program = buf.read_pubkey()?;
        let count = buf.read_u8()?;
        let seeds = (0..count)
            .map(|_| buf.read_bytes_u32())
            .collect::<Result<_, _>>()?;
        Ok(Self { program, seeds })
    }
}
