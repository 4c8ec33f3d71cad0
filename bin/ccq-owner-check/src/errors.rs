//! Error types for initialization.

use std::io;

use ccq_common::logging::TryInitError;
use ccq_config::ConfigError;
use ccq_crypto::QuorumError;
use ccq_primitives::ParsePubkeyError;
use ccq_proxy::ProxyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum InitError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("no config file given, pass one with -c")]
    MissingConfig,

    #[error("config: {0}")]
    MalformedConfig(#[from] ConfigError),

    #[error("unparsable config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("guardian {index}: {source}")]
    GuardianKey { index: usize, source: QuorumError },

    #[error("guardian set: {0}")]
    GuardianSet(#[source] QuorumError),

    #[error("pubkey: {0}")]
    Pubkey(#[from] ParsePubkeyError),

    #[error("invalid seed '{0}'")]
    InvalidSeed(String),

    #[error("proxy: {0}")]
    Proxy(#[from] ProxyError),

    #[error("logging: {0}")]
    Logging(#[from] TryInitError),
}
