//! Signed response envelope, as a proxy returns it to clients.

use alloy_primitives::B256;
use ccq_crypto::GuardianSignature;
use ccq_query_types::{decode_exact, response_digest, CodecError, QueryResponse};
use serde::{Deserialize, Serialize};

/// Serialized response bytes and the guardian signatures over their digest.
///
/// JSON form: `{"bytes": "<hex>", "signatures": ["<132 hex chars>", ..]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedQueryResponse {
    #[serde(with = "hex::serde")]
    pub bytes: Vec<u8>,
    pub signatures: Vec<GuardianSignature>,
}

impl SignedQueryResponse {
    pub fn new(bytes: Vec<u8>, signatures: Vec<GuardianSignature>) -> Self {
        Self { bytes, signatures }
    }

    /// Decodes the signed bytes.
    pub fn parse(&self) -> Result<QueryResponse, CodecError> {
        decode_exact(&self.bytes)
    }

    /// The digest the signatures are over.
    pub fn digest(&self) -> B256 {
        response_digest(&self.bytes)
    }
}
