use std::{fmt, path::PathBuf};

use alloy_primitives::Address;
use ccq_primitives::{constants::TOKEN_PROGRAM_ID, Finality, Pubkey};
use ccq_verifier::{ReplayPolicy, DEFAULT_ALLOWED_STALENESS_SECS};
use serde::{Deserialize, Serialize};

/// Default value for `nonce` in [`QueryConfig`].
const DEFAULT_NONCE: u32 = 42;

fn default_token_program() -> Pubkey {
    TOKEN_PROGRAM_ID
}

fn default_nonce() -> u32 {
    DEFAULT_NONCE
}

fn default_allowed_staleness() -> u64 {
    DEFAULT_ALLOWED_STALENESS_SECS
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

/// The account to check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub owner: Pubkey,
    pub mint: Pubkey,

    #[serde(default = "default_token_program")]
    pub token_program: Pubkey,

    #[serde(default)]
    pub finality: Finality,

    #[serde(default = "default_nonce")]
    pub nonce: u32,
}

/// Mock query proxy.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// JSON account fixture served by the mock.
    pub fixture: PathBuf,

    /// Hex secp256k1 secret keys. Position in the list is the guardian index.
    pub guardian_keys: Vec<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("fixture", &self.fixture)
            .field("guardian_keys", &self.guardian_keys.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Address the verifier emits logs from.
    #[serde(default)]
    pub address: Address,

    #[serde(default)]
    pub guardian_set_index: u32,

    /// Guardian addresses, in index order.
    pub guardians: Vec<Address>,

    /// Zero means the guardian set never expires.
    #[serde(default)]
    pub guardian_set_expiration: u32,

    /// Mint the verifier accepts; the queried mint if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<Pubkey>,

    #[serde(default = "default_allowed_staleness")]
    pub allowed_staleness_secs: u64,

    #[serde(default)]
    pub replay_policy: ReplayPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub query: QueryConfig,
    pub proxy: ProxyConfig,
    pub verifier: VerifierConfig,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,
}
