//! Transaction configuration and per-transaction options.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::isolation::{TransactionConcurrency, TransactionIsolation};

/// Errors loading a [`TransactionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Defaults applied to transactions started without explicit options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Default concurrency mode.
    pub default_concurrency: TransactionConcurrency,
    /// Default isolation level.
    pub default_isolation: TransactionIsolation,
    /// Default timeout in milliseconds; 0 means no timeout.
    pub default_timeout_ms: u64,
    /// Expected number of entries touched; 0 means unknown.
    pub default_tx_size: u32,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            default_concurrency: TransactionConcurrency::default(),
            default_isolation: TransactionIsolation::default(),
            default_timeout_ms: 0,
            default_tx_size: 0,
        }
    }
}

impl TransactionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Set the default concurrency mode.
    pub fn concurrency(mut self, value: TransactionConcurrency) -> Self {
        self.default_concurrency = value;
        self
    }

    /// Set the default isolation level.
    pub fn isolation(mut self, value: TransactionIsolation) -> Self {
        self.default_isolation = value;
        self
    }

    /// Set the default timeout.
    pub fn timeout(mut self, value: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the default expected transaction size.
    pub fn tx_size(mut self, value: u32) -> Self {
        self.default_tx_size = value;
        self
    }

    /// Options for a transaction started with these defaults.
    pub fn tx_options(&self) -> TxOptions {
        TxOptions {
            concurrency: self.default_concurrency,
            isolation: self.default_isolation,
            timeout: Duration::from_millis(self.default_timeout_ms),
            size: self.default_tx_size,
        }
    }
}

/// Parameters of a single transaction start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub concurrency: TransactionConcurrency,
    pub isolation: TransactionIsolation,
    /// Zero means no timeout.
    pub timeout: Duration,
    /// Expected number of entries touched; 0 means unknown.
    pub size: u32,
}

impl TxOptions {
    pub fn new(concurrency: TransactionConcurrency, isolation: TransactionIsolation) -> Self {
        Self {
            concurrency,
            isolation,
            ..Default::default()
        }
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn size(mut self, value: u32) -> Self {
        self.size = value;
        self
    }

    pub fn has_timeout(&self) -> bool {
        !self.timeout.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TransactionConfig::default();
        let options = config.tx_options();
        assert_eq!(options.concurrency, TransactionConcurrency::Pessimistic);
        assert_eq!(options.isolation, TransactionIsolation::RepeatableRead);
        assert!(!options.has_timeout());
        assert_eq!(options.size, 0);
    }

    #[test]
    fn test_builder() {
        let config = TransactionConfig::new()
            .concurrency(TransactionConcurrency::Optimistic)
            .isolation(TransactionIsolation::Serializable)
            .timeout(Duration::from_secs(2))
            .tx_size(16);

        let options = config.tx_options();
        assert_eq!(options.concurrency, TransactionConcurrency::Optimistic);
        assert_eq!(options.isolation, TransactionIsolation::Serializable);
        assert_eq!(options.timeout, Duration::from_millis(2000));
        assert_eq!(options.size, 16);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TransactionConfig::from_json_str(
            r#"{ "default_isolation": "READ_COMMITTED", "default_timeout_ms": 500 }"#,
        )
        .unwrap();
        assert_eq!(config.default_isolation, TransactionIsolation::ReadCommitted);
        assert_eq!(config.default_concurrency, TransactionConcurrency::Pessimistic);
        assert_eq!(config.default_timeout_ms, 500);
    }

    #[test]
    fn test_invalid_json() {
        let result = TransactionConfig::from_json_str(r#"{ "default_isolation": "SNAPSHOT" }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_concurrency": "OPTIMISTIC", "default_tx_size": 8 }}"#).unwrap();

        let config = TransactionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_concurrency, TransactionConcurrency::Optimistic);
        assert_eq!(config.default_tx_size, 8);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = TransactionConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
