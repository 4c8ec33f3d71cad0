//! Logging setup from the binaries' config sections.

use std::path::Path;

use tracing::info;
use tracing_subscriber::util::TryInitError;

use super::{format_service_name, init, FileLoggingConfig, LoggerConfig};

/// Configuration parameters for logging initialization.
#[derive(Debug, Clone, Copy)]
pub struct LoggingInitConfig<'a> {
    pub service_base_name: &'a str,
    /// Optional label appended to the service name
    pub service_label: Option<&'a str>,
    /// Directory for file-based logging
    pub log_dir: Option<&'a Path>,
    pub log_file_prefix: Option<&'a str>,
    /// Use JSON format instead of compact
    pub json_format: Option<bool>,
    /// Used when `log_file_prefix` is unset
    pub default_log_prefix: &'a str,
}

/// Builds the [`LoggerConfig`] described by `config` without installing it.
pub fn logger_config_from(config: &LoggingInitConfig<'_>) -> LoggerConfig {
    let service_name = format_service_name(config.service_base_name, config.service_label);
    let mut lconfig = LoggerConfig::new(service_name);

    if let Some(dir) = config.log_dir {
        let prefix = config
            .log_file_prefix
            .unwrap_or(config.default_log_prefix)
            .to_string();
        let file_config = FileLoggingConfig::new(dir.to_path_buf(), prefix)
            .with_json_format(config.json_format.unwrap_or(false));
        lconfig = lconfig.with_file_logging(file_config);
    }

    if let Some(json_format) = config.json_format {
        lconfig = lconfig.with_json_logging(json_format);
    }

    lconfig
}

/// Initializes logging from configuration.
pub fn init_logging_from_config(config: LoggingInitConfig<'_>) -> Result<(), TryInitError> {
    let lconfig = logger_config_from(&config);
    let file_config = lconfig.file_logging_config.clone();

    init(lconfig)?;

    if let Some(file_config) = file_config {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }
    Ok(())
}
