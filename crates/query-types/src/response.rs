//! Query responses, as produced and signed by the guardians.

use bytes::{Buf, BufMut};
use ccq_primitives::{ChainId, Pubkey};

use crate::{
    codec::{
        decode_exact, encode_to_vec, read_per_chain_frame, write_bytes_u32, write_count_u8,
        write_per_chain_frame, Codec, CodecError, ReadExt,
    },
    request::{ChainQuery, QueryRequest, QueryType, QUERY_VERSION},
};

/// Request id length for off-chain requests: the requester's signature.
pub const OFF_CHAIN_REQUEST_ID_LEN: usize = 65;

/// Request id length for on-chain requests: the transaction hash.
pub const ON_CHAIN_REQUEST_ID_LEN: usize = 32;

fn request_id_len(chain_id: ChainId) -> usize {
    if chain_id == ChainId::OFF_CHAIN {
        OFF_CHAIN_REQUEST_ID_LEN
    } else {
        ON_CHAIN_REQUEST_ID_LEN
    }
}

/// The full signed payload: the request it answers plus one response per
/// per-chain request, in the same order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResponse {
    pub request_chain_id: ChainId,
    pub request_id: Vec<u8>,
    pub request: QueryRequest,
    pub responses: Vec<PerChainQueryResponse>,
}

impl QueryResponse {
    /// Builds a response and checks it answers `request`.
    pub fn try_new(
        request_chain_id: ChainId,
        request_id: Vec<u8>,
        request: QueryRequest,
        responses: Vec<PerChainQueryResponse>,
    ) -> Result<Self, CodecError> {
        let response = Self {
            request_chain_id,
            request_id,
            request,
            responses,
        };
        response.check_request_id()?;
        response.check_matches_request()?;
        Ok(response)
    }

    fn check_request_id(&self) -> Result<(), CodecError> {
        let expected = request_id_len(self.request_chain_id);
        if self.request_id.len() != expected {
            return Err(CodecError::InvalidRequestIdLength {
                expected,
                got: self.request_id.len(),
            });
        }
        Ok(())
    }

    /// Checks the responses line up with the embedded request: same count,
    /// and per position the same chain, query type and number of results.
    pub fn check_matches_request(&self) -> Result<(), CodecError> {
        let requests = &self.request.requests;
        if requests.len() != self.responses.len() {
            return Err(CodecError::ResponseCountMismatch {
                requests: requests.len(),
                responses: self.responses.len(),
            });
        }

        for (index, (req, resp)) in requests.iter().zip(&self.responses).enumerate() {
            if req.chain_id != resp.chain_id {
                return Err(CodecError::ChainIdMismatch {
                    index,
                    request: req.chain_id,
                    response: resp.chain_id,
                });
            }

            if req.query.query_type() != resp.response.query_type() {
                return Err(CodecError::ResponseTypeMismatch { index });
            }

            let requested = req.query.lookup_count();
            let returned = resp.response.result_count();
            if requested != returned {
                return Err(CodecError::ResultCountMismatch {
                    index,
                    requested,
                    returned,
                });
            }
        }

        Ok(())
    }

    /// Request of the per-chain response at `index`.
    pub fn request_for(&self, index: usize) -> Option<&ChainQuery> {
        self.request.requests.get(index).map(|r| &r.query)
    }
}

impl Codec for QueryResponse {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        self.check_request_id()?;

        buf.put_u8(QUERY_VERSION);
        buf.put_u16(self.request_chain_id.get());
        buf.put_slice(&self.request_id);
        write_bytes_u32(buf, &encode_to_vec(&self.request)?, "request")?;
        write_count_u8(buf, self.responses.len(), "per-chain responses")?;
        for response in &self.responses {
            response.encode(buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let version = buf.read_u8()?;
        if version != QUERY_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let request_chain_id = buf.read_chain_id()?;
        let request_id = buf.read_vec(request_id_len(request_chain_id))?;
        let request = decode_exact(&buf.read_bytes_u32()?)?;
        let count = buf.read_u8()?;
        let responses = (0..count)
            .map(|_| PerChainQueryResponse::decode(buf))
            .collect::<Result<_, _>>()?;

        let response = Self {
            request_chain_id,
            request_id,
            request,
            responses,
        };
        response.check_matches_request()?;
        Ok(response)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerChainQueryResponse {
    pub chain_id: ChainId,
    pub response: ChainQueryResponse,
}

impl PerChainQueryResponse {
    pub fn new(chain_id: ChainId, response: ChainQueryResponse) -> Self {
        Self { chain_id, response }
    }
}

impl Codec for PerChainQueryResponse {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        let mut body = Vec::new();
        match &self.response {
            ChainQueryResponse::SolanaAccount(r) => r.encode(&mut body)?,
            ChainQueryResponse::SolanaPda(r) => r.encode(&mut body)?,
        }
        write_per_chain_frame(buf, self.chain_id, self.response.query_type() as u8, &body)
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let (chain_id, query_type, body) = read_per_chain_frame(buf)?;
        let response = match QueryType::try_from(query_type)? {
            QueryType::SolanaAccount => ChainQueryResponse::SolanaAccount(decode_exact(&body)?),
            QueryType::SolanaPda => ChainQueryResponse::SolanaPda(decode_exact(&body)?),
        };
        Ok(Self { chain_id, response })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainQueryResponse {
    SolanaAccount(SolanaAccountQueryResponse),
    SolanaPda(SolanaPdaQueryResponse),
}

impl ChainQueryResponse {
    pub fn query_type(&self) -> QueryType {
        match self {
            ChainQueryResponse::SolanaAccount(_) => QueryType::SolanaAccount,
            ChainQueryResponse::SolanaPda(_) => QueryType::SolanaPda,
        }
    }

    pub fn result_count(&self) -> usize {
        match self {
            ChainQueryResponse::SolanaAccount(r) => r.results.len(),
            ChainQueryResponse::SolanaPda(r) => r.results.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolanaAccountQueryResponse {
    pub slot_number: u64,
    /// Microseconds since the unix epoch.
    pub block_time_us: u64,
    pub block_hash: [u8; 32],
    pub results: Vec<SolanaAccountResult>,
}

/// Account state as returned by the Solana RPC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolanaAccountResult {
    pub lamports: u64,
    pub rent_epoch: u64,
    pub executable: bool,
    /// Program owning the account.
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

impl SolanaAccountResult {
    fn encode_fields(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        buf.put_u64(self.lamports);
        buf.put_u64(self.rent_epoch);
        buf.put_u8(self.executable as u8);
        buf.put_slice(self.owner.as_bytes());
        write_bytes_u32(buf, &self.data, "account data")
    }

    fn decode_fields(buf: &mut impl Buf) -> Result<Self, CodecError> {
        Ok(Self {
            lamports: buf.read_u64()?,
            rent_epoch: buf.read_u64()?,
            executable: buf.read_bool()?,
            owner: buf.read_pubkey()?,
            data: buf.read_bytes_u32()?,
        })
    }
}

impl Codec for SolanaAccountQueryResponse {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        buf.put_u64(self.slot_number);
        buf.put_u64(self.block_time_us);
        buf.put_slice(&self.block_hash);
        write_count_u8(buf, self.results.len(), "results")?;
        for result in &self.results {
            result.encode_fields(buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let slot_number = buf.read_u64()?;
        let block_time_us = buf.read_u64()?;
        let block_hash = buf.read_arr()?;
        let count = buf.read_u8()?;
        let results = (0..count)
            .map(|_| SolanaAccountResult::decode_fields(buf))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            slot_number,
            block_time_us,
            block_hash,
            results,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolanaPdaQueryResponse {
    pub slot_number: u64,
    /// Microseconds since the unix epoch.
    pub block_time_us: u64,
    pub block_hash: [u8; 32],
    pub results: Vec<SolanaPdaResult>,
}

/// A derived account and its state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolanaPdaResult {
    pub account: Pubkey,
    pub bump: u8,
    pub lamports: u64,
    pub rent_epoch: u64,
    pub executable: bool,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

impl SolanaPdaResult {
    fn encode_fields(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        buf.put_slice(self.account.as_bytes());
        buf.put_u8(self.bump);
        buf.put_u64(self.lamports);
        buf.put_u64(self.rent_epoch);
        buf.put_u8(self.executable as u8);
        buf.put_slice(self.owner.as_bytes());
        write_bytes_u32(buf, &self.data, "account data")
    }

    fn decode_fields(buf: &mut impl Buf) -> Result<Self, CodecError> {
        Ok(Self {
            account: buf.read_pubkey()?,
            bump: buf.read_u8()?,
            lamports: buf.read_u64()?,
            rent_epoch: buf.read_u64()?,
            executable: buf.read_bool()?,
            owner: buf.read_pubkey()?,
            data: buf.read_bytes_u32()?,
        })
    }
}

impl Codec for SolanaPdaQueryResponse {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError> {
        buf.put_u64(self.slot_number);
        buf.put_u64(self.block_time_us);
        buf.put_slice(&self.block_hash);
        write_count_u8(buf, self.results.len(), "results")?;
        for result in &self.results {
            result.encode_fields(buf)?;
        }
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let slot_number = buf.read_u64()?;
        let block_time_us = buf.read_u64()?;
        let block_hash = buf.read_arr()?;
        let count = buf.read_u8()?;
        let results = (0..count)
            .map(|_| SolanaPdaResult::decode_fields(buf))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            slot_number,
            block_time_us,
            block_hash,
            results,
        })
    }
}
