//! Guardian signing keys.

use std::fmt;

use alloy_primitives::{keccak256, Address};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use zeroize::Zeroizing;

use super::{GuardianSignature, QuorumError};

/// EVM address of a secp256k1 public key: the last 20 bytes of the keccak256
/// of the uncompressed point without its `0x04` tag.
pub fn pubkey_to_address(pubkey: &PublicKey) -> Address {
    let uncompressed = pubkey.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// A guardian's signing key together with its index in the guardian set.
pub struct GuardianSigner {
    index: u8,
    key: SecretKey,
}

impl GuardianSigner {
    pub fn new(index: u8, key: SecretKey) -> Self {
        Self { index, key }
    }

    /// Parses a hex encoded 32-byte secret key, with or without `0x`.
    pub fn from_hex(index: u8, key_hex: &str) -> Result<Self, QuorumError> {
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let bytes = Zeroizing::new(hex::decode(key_hex)?);
        let key = SecretKey::from_slice(&bytes).map_err(|_| QuorumError::InvalidSecretKey)?;
        Ok(Self::new(index, key))
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &self.key)
    }

    pub fn address(&self) -> Address {
        pubkey_to_address(&self.public_key())
    }

    /// Signs a 32-byte digest, producing a signature tagged with this
    /// guardian's index.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> GuardianSignature {
        let message = Message::from_digest(*digest);
        let sig = SECP256K1.sign_ecdsa_recoverable(&message, &self.key);
        let (recovery_id, compact) = sig.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        GuardianSignature::new(r, s, recovery_id.to_i32() as u8, self.index)
    }
}

impl fmt::Debug for GuardianSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardianSigner")
            .field("index", &self.index)
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
