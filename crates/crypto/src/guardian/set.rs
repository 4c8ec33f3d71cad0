//! Guardian set configuration.

use std::collections::HashSet;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::QuorumError;

/// Maximum number of guardians in a set.
///
/// Guardian indices are carried as a `u8`, so at most 256 members can be
/// addressed.
pub const MAX_GUARDIANS: usize = 256;

/// A versioned set of guardian addresses.
///
/// Defines who can attest (`keys`); the number of signatures needed is derived
/// from the set size by [`GuardianSet::quorum`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianSet {
    /// Index of this set, bumped on every guardian rotation.
    index: u32,
    /// Guardian addresses, in index order.
    keys: Vec<Address>,
    /// Unix time after which the set is no longer accepted. Zero means the set
    /// is current and never expires.
    #[serde(default)]
    expiration_time: u32,
}

impl GuardianSet {
    /// Create a new guardian set.
    ///
    /// # Errors
    ///
    /// - `EmptyGuardianSet` if `keys` is empty
    /// - `TooManyGuardians` if `keys` has more than [`MAX_GUARDIANS`] entries
    /// - `DuplicateGuardian` if an address appears twice
    pub fn try_new(index: u32, keys: Vec<Address>, expiration_time: u32) -> Result<Self, QuorumError> {
        if keys.is_empty() {
            return Err(QuorumError::EmptyGuardianSet);
        }

        if keys.len() > MAX_GUARDIANS {
            return Err(QuorumError::TooManyGuardians(keys.len()));
        }

        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !seen.insert(key) {
                return Err(QuorumError::DuplicateGuardian(*key));
            }
        }

        Ok(Self {
            index,
            keys,
            expiration_time,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn keys(&self) -> &[Address] {
        &self.keys
    }

    pub fn expiration_time(&self) -> u32 {
        self.expiration_time
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Minimum number of valid signatures: strictly more than two thirds.
    pub fn quorum(&self) -> usize {
        self.keys.len() * 2 / 3 + 1
    }

    /// Checks the set has not expired at `now` (unix seconds).
    pub fn ensure_active(&self, now: u64) -> Result<(), QuorumError> {
        if self.expiration_time != 0 && u64::from(self.expiration_time) < now {
            return Err(QuorumError::GuardianSetExpired {
                index: self.index,
                expiration_time: self.expiration_time,
                now,
            });
        }
        Ok(())
    }
}
