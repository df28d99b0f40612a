//! Error types for the CLI application.

use sentiscope_batch::{BatchError, ConfigError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analyzer configuration error
    #[error(transparent)]
    Analyzer(#[from] ConfigError),

    /// Analysis could not be started
    #[error("{0}")]
    Batch(#[from] BatchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Analysis was cancelled before it settled
    #[error("Analysis cancelled")]
    Cancelled,
}
