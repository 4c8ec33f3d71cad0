//! Config loading and construction of the proxy and verifier.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ccq_common::logging::{init_logging_from_config, LoggingInitConfig};
use ccq_config::{apply_override, parse_override, Config, ConfigError, LoggingConfig};
use ccq_crypto::{GuardianSet, GuardianSigner, QuorumError};
use ccq_owner_check::OwnerCheckParams;
use ccq_proxy::{InMemoryAccountSource, MockQueryProxy};
use ccq_verifier::{FixedClock, OwnerVerifier, TokenAccountOwnership, VerifierConfig};
use tracing::debug;

use crate::{args::Args, errors::InitError};

const SERVICE_NAME: &str = "ccq-owner-check";
const DEFAULT_LOG_PREFIX: &str = "owner-check";

/// The verifier the CLI runs against.
pub(crate) type LocalVerifier = OwnerVerifier<TokenAccountOwnership, FixedClock>;

/// Loaded configuration and the directory relative paths resolve against.
#[derive(Debug)]
pub(crate) struct CmdContext {
    config: Option<Config>,
    config_dir: PathBuf,
}

impl CmdContext {
    pub(crate) fn new(config: Option<Config>, config_dir: PathBuf) -> Self {
        Self { config, config_dir }
    }

    /// Loads the config, if any, and initializes logging from it.
    pub(crate) fn from_args(args: &Args) -> Result<Self, InitError> {
        let Some(path) = &args.config else {
            if !args.overrides.is_empty() {
                return Err(InitError::MissingConfig);
            }
            init_logging(&LoggingConfig::default())?;
            return Ok(Self::new(None, PathBuf::from(".")));
        };

        let config = load_config(path, &args.overrides)?;
        init_logging(&config.logging)?;
        debug!(path = %path.display(), "loaded config");

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(Some(config), config_dir))
    }

    pub(crate) fn config(&self) -> Result<&Config, InitError> {
        self.config.as_ref().ok_or(InitError::MissingConfig)
    }

    pub(crate) fn params(&self) -> Result<OwnerCheckParams, InitError> {
        let query = &self.config()?.query;
        Ok(OwnerCheckParams {
            owner: query.owner,
            mint: query.mint,
            token_program: query.token_program,
            finality: query.finality,
            nonce: query.nonce,
        })
    }

    /// Mock proxy over the configured fixture, signing with every configured
    /// guardian key.
    pub(crate) fn proxy(&self) -> Result<MockQueryProxy<InMemoryAccountSource>, InitError> {
        let proxy = &self.config()?.proxy;

        let signers = proxy
            .guardian_keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let guardian = u8::try_from(index).map_err(|_| InitError::GuardianKey {
                    index,
                    source: QuorumError::TooManyGuardians(index + 1),
                })?;
                GuardianSigner::from_hex(guardian, key)
                    .map_err(|source| InitError::GuardianKey { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let source = InMemoryAccountSource::from_json_file(&self.resolve(&proxy.fixture))?;
        Ok(MockQueryProxy::new(source, signers)?)
    }

    /// Verifier for the configured guardian set, its clock fixed at `now`.
    pub(crate) fn verifier(&self, now: u64) -> Result<LocalVerifier, InitError> {
        let config = self.config()?;
        let v = &config.verifier;

        let guardian_set =
            GuardianSet::try_new(v.guardian_set_index, v.guardians.clone(), v.guardian_set_expiration)
                .map_err(InitError::GuardianSet)?;

        let mut verifier_config = VerifierConfig::new(v.address, guardian_set);
        verifier_config.allowed_staleness_secs = v.allowed_staleness_secs;
        verifier_config.replay_policy = v.replay_policy;

        let predicate = TokenAccountOwnership::new(v.mint.unwrap_or(config.query.mint))
            .with_token_program(config.query.token_program);

        Ok(OwnerVerifier::new(verifier_config, predicate, FixedClock(now)))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<(), InitError> {
    Ok(init_logging_from_config(LoggingInitConfig {
        service_base_name: SERVICE_NAME,
        service_label: None,
        log_dir: logging.log_dir.as_deref(),
        log_file_prefix: logging.log_file_prefix.as_deref(),
        json_format: logging.json_format,
        default_log_prefix: DEFAULT_LOG_PREFIX,
    })?)
}

/// Reads the TOML at `path` and applies `key=value` overrides before
/// deserializing.
pub(crate) fn load_config(path: &Path, overrides: &[String]) -> Result<Config, InitError> {
    let mut config_toml = load_config_from_path(path)?;

    let overrides = overrides
        .iter()
        .map(|o| parse_override(o))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let table = config_toml
        .as_table_mut()
        .ok_or(ConfigError::TraverseNonTableAt {
            key: "<root>".to_string(),
            path: "".to_string(),
        })?;

    for (path, val) in overrides {
        apply_override(&path, val, table)?;
    }

    Ok(config_toml.try_into::<Config>()?)
}

fn load_config_from_path(path: &Path) -> Result<toml::Value, InitError> {
    let config_str = fs::read_to_string(path)?;
    Ok(toml::from_str(&config_str)?)
}
