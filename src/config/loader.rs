//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::lifecycle::signals::SignalKind;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = ?path, servers = config.http.len(), "Configuration loaded");
    Ok(config)
}

/// Apply command-line overrides, then validate the result again.
///
/// An empty `signals` keeps the configured set.
pub fn apply_overrides(
    mut config: AppConfig,
    signals: Vec<SignalKind>,
    log_level: Option<String>,
) -> Result<AppConfig, ConfigError> {
    if !signals.is_empty() {
        config.signals = signals;
    }
    if let Some(level) = log_level {
        config.logging.level = level;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
