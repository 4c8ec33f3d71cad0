//! Configuration of the ownership check tooling.

mod config;
mod errors;
mod overrides;

pub use config::{Config, LoggingConfig, ProxyConfig, QueryConfig, VerifierConfig};
pub use errors::ConfigError;
pub use overrides::{apply_override, parse_override};
