//! Error types for batch analysis

use sentiscope_domain::ErrorKind;
use thiserror::Error;

/// Session-level failures
///
/// Each of these stops a run before any scoring request is made and is shown
/// to the user as one message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    /// Nothing was submitted
    #[error("{0}")]
    MissingInput(String),

    /// Payload is not JSON
    #[error("Invalid file type '{0}'. Please upload a JSON file.")]
    UnsupportedType(String),

    /// Payload exceeds the configured ceiling
    #[error("File size of {size} bytes exceeds the {limit} byte limit. Please upload a smaller file.")]
    PayloadTooLarge {
        /// Size of the rejected payload
        size: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// Payload is not well-formed JSON
    #[error("Invalid JSON format: {0}")]
    Parse(String),

    /// Document does not have the expected shape
    #[error("Invalid file format: {0}")]
    Schema(String),

    /// Another run is in flight
    #[error("An analysis is already in progress")]
    Busy,
}

impl BatchError {
    /// The error kind for this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            BatchError::MissingInput(_) => ErrorKind::MissingInput,
            BatchError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            BatchError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            BatchError::Parse(_) => ErrorKind::ParseError,
            BatchError::Schema(_) => ErrorKind::SchemaError,
            BatchError::Busy => ErrorKind::Busy,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// TOML could not be parsed
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML could not be produced
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// Scorer could not be built from the configuration
    #[error("Scorer error: {0}")]
    Scorer(#[from] sentiscope_scorer::ScorerError),
}
