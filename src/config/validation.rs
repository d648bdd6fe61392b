//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate bind addresses and log formats
//! - Detect duplicate server names and signals
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("signal {0} listed more than once")]
    DuplicateSignal(String),

    #[error("server name must not be empty")]
    EmptyServerName,

    #[error("server name {0:?} used more than once")]
    DuplicateServerName(String),

    #[error("server {name}: invalid bind address {address:?}")]
    InvalidBindAddress { name: String, address: String },

    #[error("unknown log format {0:?} (expected pretty, compact or json)")]
    UnknownLogFormat(String),
}

/// Check `config` and return every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen_signals = HashSet::new();
    for signal in &config.signals {
        if !seen_signals.insert(*signal) {
            errors.push(ValidationError::DuplicateSignal(signal.to_string()));
        }
    }

    let mut seen_names = HashSet::new();
    for server in &config.http {
        if server.name.trim().is_empty() {
            errors.push(ValidationError::EmptyServerName);
        } else if !seen_names.insert(server.name.as_str()) {
            errors.push(ValidationError::DuplicateServerName(server.name.clone()));
        }

        if server.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidBindAddress {
                name: server.name.clone(),
                address: server.bind_address.clone(),
            });
        }
    }

    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        errors.push(ValidationError::UnknownLogFormat(config.logging.format.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
