//! Cross-chain query requests and responses, their byte encoding and the
//! digests guardians sign over them.
//!
//! Only the Solana query types are modelled. All integers are big-endian.

mod codec;
mod digest;
mod request;
mod response;

pub use codec::{decode_exact, encode_to_vec, Codec, CodecError};
pub use digest::{request_digest, response_digest, Network, RESPONSE_PREFIX};
pub use request::{
    ChainQuery, PdaLookup, PerChainQueryRequest, QueryRequest, QueryType,
    SolanaAccountQueryRequest, SolanaPdaQueryRequest, QUERY_VERSION,
};
pub use response::{
    ChainQueryResponse, PerChainQueryResponse, QueryResponse, SolanaAccountQueryResponse,
    SolanaAccountResult, SolanaPdaQueryResponse, SolanaPdaResult, OFF_CHAIN_REQUEST_ID_LEN,
    ON_CHAIN_REQUEST_ID_LEN,
};
