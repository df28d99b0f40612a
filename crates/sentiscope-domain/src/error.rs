//! Error kinds shared by every layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure kind the analyzer can report
///
/// Whole-batch kinds (`MissingInput` through `SchemaError`, plus `Busy`) surface
/// as a single session error. `SchemaError` for one element, `NetworkError`
/// and `MalformedResponse` are local to one outcome entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No payload or text was supplied
    MissingInput,
    /// Payload media type is not JSON
    UnsupportedType,
    /// Payload exceeds the configured size ceiling
    PayloadTooLarge,
    /// Payload is not well-formed JSON
    ParseError,
    /// Document or element does not have the expected shape
    SchemaError,
    /// Scoring request failed in transport, status or timeout
    NetworkError,
    /// Scoring service replied with an unusable body
    MalformedResponse,
    /// A run is already in flight
    Busy,
}

impl ErrorKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "missing_input",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::PayloadTooLarge => "payload_too_large",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::SchemaError => "schema_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Busy => "busy",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single outcome entry
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ItemError {
    /// Element could not be turned into a review text
    #[error("Invalid element: {0}")]
    Schema(String),

    /// Scoring request did not produce a reply
    #[error("Network error: {0}")]
    Network(String),

    /// Scoring reply was missing fields or out of range
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ItemError {
    /// The error kind for this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ItemError::Schema(_) => ErrorKind::SchemaError,
            ItemError::Network(_) => ErrorKind::NetworkError,
            ItemError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}
