//! Digests guardians sign over requests and responses.

use alloy_primitives::{keccak256, B256};

/// Domain prefix of response digests.
pub const RESPONSE_PREFIX: &[u8; 35] = b"query_response_0000000000000000000|";

/// Guardian network a request is addressed to. Each network has its own
/// request signing domain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    #[default]
    Devnet,
}

impl Network {
    pub const fn request_prefix(self) -> &'static [u8; 35] {
        match self {
            Network::Mainnet => b"mainnet_query_request_000000000000|",
            Network::Testnet => b"testnet_query_request_000000000000|",
            Network::Devnet => b"devnet_query_request_0000000000000|",
        }
    }
}

fn prefixed_digest(prefix: &[u8], bytes: &[u8]) -> B256 {
    let mut preimage = Vec::with_capacity(prefix.len() + 32);
    preimage.extend_from_slice(prefix);
    preimage.extend_from_slice(keccak256(bytes).as_slice());
    keccak256(preimage)
}

/// Digest a requester signs over serialized request bytes.
pub fn request_digest(network: Network, bytes: &[u8]) -> B256 {
    prefixed_digest(network.request_prefix(), bytes)
}

/// Digest guardians sign over serialized response bytes.
pub fn response_digest(bytes: &[u8]) -> B256 {
    prefixed_digest(RESPONSE_PREFIX, bytes)
}
