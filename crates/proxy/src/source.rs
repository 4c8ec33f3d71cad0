//! Chain state backing the proxy.

use std::{collections::HashMap, fs, path::Path};

use ccq_primitives::{Finality, Pubkey};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ProxyError;

/// Slot the state was read at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub slot: u64,
    /// Microseconds since the unix epoch.
    pub block_time_us: u64,
    #[serde(with = "hex::serde")]
    pub block_hash: [u8; 32],
}

/// Account contents as the chain reports them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub lamports: u64,
    #[serde(default)]
    pub rent_epoch: u64,
    #[serde(default)]
    pub executable: bool,
    pub owner: Pubkey,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

/// Read access to chain state at a commitment level.
pub trait AccountSource {
    /// The slot reads at `finality` are served from.
    fn slot_info(&self, finality: Finality) -> Result<SlotInfo, ProxyError>;

    /// Returns `None` if the account does not exist at `finality`.
    fn get_account(
        &self,
        address: &Pubkey,
        finality: Finality,
    ) -> Result<Option<AccountState>, ProxyError>;
}

/// All accounts visible at one commitment level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub slot: SlotInfo,
    #[serde(default)]
    pub accounts: HashMap<Pubkey, AccountState>,
}

impl Snapshot {
    pub fn new(slot: SlotInfo) -> Self {
        Self {
            slot,
            accounts: HashMap::new(),
        }
    }

    pub fn with_account(mut self, address: Pubkey, state: AccountState) -> Self {
        self.accounts.insert(address, state);
        self
    }
}

/// Chain state held in memory, one snapshot per commitment level.
///
/// A commitment without a snapshot behaves like an unreachable node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryAccountSource {
    snapshots: HashMap<Finality, Snapshot>,
}

impl InMemoryAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, finality: Finality, snapshot: Snapshot) -> Self {
        self.snapshots.insert(finality, snapshot);
        self
    }

    pub fn insert_account(
        &mut self,
        finality: Finality,
        address: Pubkey,
        state: AccountState,
    ) -> Result<(), ProxyError> {
        let snapshot = self
            .snapshots
            .get_mut(&finality)
            .ok_or_else(|| ProxyError::Fixture(format!("no {finality} snapshot")))?;
        snapshot.accounts.insert(address, state);
        Ok(())
    }

    /// Parses a fixture keyed by commitment level, e.g.
    /// `{"finalized": {"slot": .., "block_time_us": .., "block_hash": "..", "accounts": {..}}}`.
    pub fn from_json_str(json: &str) -> Result<Self, ProxyError> {
        serde_json::from_str(json).map_err(|e| ProxyError::Fixture(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ProxyError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ProxyError::Fixture(format!("{}: {e}", path.display())))?;
        let source = Self::from_json_str(&json)?;
        debug!(path = %path.display(), snapshots = source.snapshots.len(), "loaded account fixture");
        Ok(source)
    }

    fn snapshot(&self, finality: Finality) -> Result<&Snapshot, ProxyError> {
        self.snapshots
            .get(&finality)
            .ok_or_else(|| ProxyError::Unavailable(format!("no state at {finality} commitment")))
    }
}

impl AccountSource for InMemoryAccountSource {
    fn slot_info(&self, finality: Finality) -> Result<SlotInfo, ProxyError> {
        Ok(self.snapshot(finality)?.slot)
    }

    fn get_account(
        &self,
        address: &Pubkey,
        finality: Finality,
    ) -> Result<Option<AccountState>, ProxyError> {
        Ok(self.snapshot(finality)?.accounts.get(address).cloned())
    }
}
