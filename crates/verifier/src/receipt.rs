//! Receipts of verifier calls and the result decoded from them.

use alloy_primitives::{Log, B256};
use alloy_sol_types::SolEvent;
use ccq_primitives::Pubkey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abi::OwnerVerified;

/// Outcome of one accepted `verifyOwner` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Position of the call among the verifier's accepted calls.
    pub transaction_index: u64,
    pub logs: Vec<Log>,
}

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("no receipt")]
    MissingReceipt,

    #[error("receipt has no logs")]
    NoLogs,

    #[error("log is not an OwnerVerified event: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

/// Attested ownership, as recorded by the verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub slot_number: u64,
    /// Microseconds since the unix epoch.
    pub block_time_us: u64,
    pub owner: Pubkey,
    pub account: Pubkey,
}

impl VerificationResult {
    pub fn to_event(&self) -> OwnerVerified {
        OwnerVerified {
            slotNumber: self.slot_number,
            blockTime: self.block_time_us,
            owner: B256::from(self.owner.to_bytes()),
            account: B256::from(self.account.to_bytes()),
        }
    }

    pub fn from_event(event: &OwnerVerified) -> Self {
        Self {
            slot_number: event.slotNumber,
            block_time_us: event.blockTime,
            owner: Pubkey::new(event.owner.0),
            account: Pubkey::new(event.account.0),
        }
    }

    /// Decodes the first log of a receipt.
    pub fn from_receipt(receipt: Option<&Receipt>) -> Result<Self, ReceiptError> {
        let receipt = receipt.ok_or(ReceiptError::MissingReceipt)?;
        let log = receipt.logs.first().ok_or(ReceiptError::NoLogs)?;
        let event = OwnerVerified::decode_log_data(&log.data)?;
        Ok(Self::from_event(&event))
    }
}
