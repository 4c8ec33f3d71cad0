//! Guardian signature types.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::QuorumError;

/// Encoded length of a [`GuardianSignature`]: `r || s || recovery_id || index`.
pub const GUARDIAN_SIGNATURE_LEN: usize = 66;

/// A recoverable ECDSA signature with the index of the guardian that made it.
///
/// This is the shape the query proxy hands out, hex encoded. The recovery id
/// is the raw `0`/`1` value; EVM consumers expect it shifted by 27.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuardianSignature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: u8,
    guardian_index: u8,
}

impl GuardianSignature {
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: u8, guardian_index: u8) -> Self {
        Self {
            r,
            s,
            recovery_id,
            guardian_index,
        }
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    pub fn guardian_index(&self) -> u8 {
        self.guardian_index
    }

    /// Get the compact signature (r || s) without recovery ID.
    pub fn compact(&self) -> [u8; 64] {
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        compact
    }

    pub fn to_bytes(&self) -> [u8; GUARDIAN_SIGNATURE_LEN] {
        let mut out = [0u8; GUARDIAN_SIGNATURE_LEN];
        out[..64].copy_from_slice(&self.compact());
        out[64] = self.recovery_id;
        out[65] = self.guardian_index;
        out
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, QuorumError> {
        if bytes.len() != GUARDIAN_SIGNATURE_LEN {
            return Err(QuorumError::InvalidSignatureLength {
                expected: GUARDIAN_SIGNATURE_LEN,
                got: bytes.len(),
            });
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self::new(r, s, bytes[64], bytes[65]))
    }
}

impl fmt::Debug for GuardianSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardianSignature")
            .field("guardian_index", &self.guardian_index)
            .field("sig", &hex::encode(self.to_bytes()))
            .finish()
    }
}

impl fmt::Display for GuardianSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

impl FromStr for GuardianSignature {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self::from_slice(&hex::decode(s)?)
    }
}

impl Serialize for GuardianSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GuardianSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A set of guardian signatures in submission order.
///
/// Guardian indices must be strictly ascending, which also rules out a
/// guardian signing twice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureSet {
    signatures: Vec<GuardianSignature>,
}

impl SignatureSet {
    /// Validates the ordering of an already ordered list of signatures.
    pub fn new(signatures: Vec<GuardianSignature>) -> Result<Self, QuorumError> {
        for window in signatures.windows(2) {
            let (previous, index) = (window[0].guardian_index, window[1].guardian_index);
            if previous == index {
                return Err(QuorumError::DuplicateGuardianIndex(index));
            }
            if previous > index {
                return Err(QuorumError::SignaturesOutOfOrder { previous, index });
            }
        }

        Ok(Self { signatures })
    }

    /// Sorts by guardian index before validating.
    pub fn sorted(mut signatures: Vec<GuardianSignature>) -> Result<Self, QuorumError> {
        signatures.sort_by_key(|s| s.guardian_index);
        Self::new(signatures)
    }

    pub fn signatures(&self) -> &[GuardianSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Iterate over guardian indices.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.signatures.iter().map(|s| s.guardian_index)
    }

    pub fn into_inner(self) -> Vec<GuardianSignature> {
        self.signatures
    }
}
