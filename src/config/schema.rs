//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::lifecycle::signals::{SignalKind, DEFAULT_SIGNALS};

/// Root configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name for logging.
    pub name: String,

    /// Termination signals that trigger shutdown.
    pub signals: Vec<SignalKind>,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// HTTP servers to run.
    pub http: Vec<HttpServerConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "lifecycle-app".to_string(),
            signals: DEFAULT_SIGNALS.to_vec(),
            logging: LoggingConfig::default(),
            http: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (e.g., "info", "lifecycle_app=debug").
    pub level: String,

    /// Output format: "pretty", "compact" or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// Server identifier for logging and errors.
    pub name: String,

    /// Bind address (e.g., "127.0.0.1:8080").
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.name, "lifecycle-app");
        assert_eq!(config.signals, DEFAULT_SIGNALS.to_vec());
        assert_eq!(config.logging.level, "info");
        assert!(config.http.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
            name = "edge"
            signals = ["SIGTERM", "hup"]

            [logging]
            level = "debug"
            format = "json"

            [[http]]
            name = "api"
            bind_address = "0.0.0.0:9000"

            [[http]]
            name = "admin"
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "edge");
        assert_eq!(config.signals, vec![SignalKind::Terminate, SignalKind::Hangup]);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.http.len(), 2);
        assert_eq!(config.http[1].bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_unknown_signal_rejected() {
        let res: Result<AppConfig, _> = toml::from_str(r#"signals = ["SIGKILL"]"#);
        assert!(res.is_err());
    }
}
