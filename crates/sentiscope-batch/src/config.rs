//! Configuration for the analyzer
//!
//! Endpoint, per-request timeout, concurrency cap and payload ceiling.

use crate::error::ConfigError;
use sentiscope_scorer::http::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default payload ceiling: 2 MiB
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Configuration for batch and single-item analysis
///
/// # Examples
///
/// ```
/// use sentiscope_batch::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.max_payload_bytes, 2 * 1024 * 1024);
/// assert!(config.max_concurrency.is_none());
///
/// let config = AnalyzerConfig::conservative();
/// assert_eq!(config.max_concurrency, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Scoring service URL
    /// Default: http://127.0.0.1:5000/analyze
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds, 0 disables the timeout
    /// Default: 30
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum scoring requests in flight at once
    ///
    /// `None` issues every request of a batch at the same time. That is fine
    /// for small files but a large batch can overwhelm the scoring service,
    /// which runs model inference per request.
    /// Default: None (unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Largest accepted batch payload in bytes
    /// Default: 2 MiB
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_payload_bytes() -> u64 {
    DEFAULT_MAX_PAYLOAD_BYTES
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrency: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl AnalyzerConfig {
    /// Conservative preset: few concurrent requests, short timeout
    ///
    /// Suitable for a scoring service running on a laptop CPU.
    pub fn conservative() -> Self {
        Self {
            request_timeout_secs: 10,
            max_concurrency: Some(4),
            ..Self::default()
        }
    }

    /// Per-request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".to_string()));
        }
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.max_payload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_payload_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
