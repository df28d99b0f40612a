//! Trait definitions for external interactions
//!
//! The scoring service is the only collaborator the domain reaches out to.
//! Implementations live in `sentiscope-scorer`.

use crate::error::ItemError;
use crate::score::RawScoreResponse;
use std::future::Future;
use thiserror::Error;

/// Errors a scorer can report for one request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// Transport failure (connection refused, reset, DNS, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error text reported by the service, if any
        message: String,
    },

    /// Request did not complete within the allotted time
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Reply body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<ScoreError> for ItemError {
    fn from(e: ScoreError) -> Self {
        match e {
            ScoreError::Decode(_) => ItemError::MalformedResponse(e.to_string()),
            ScoreError::Transport(_) | ScoreError::Status { .. } | ScoreError::Timeout(_) => {
                ItemError::Network(e.to_string())
            }
        }
    }
}

/// Trait for the remote sentiment scoring capability
///
/// One call scores one text with all three methods. Implementations must not
/// retry; the dispatcher treats every failure as final for that item.
pub trait SentimentScorer {
    /// Score a single review text
    fn score(&self, text: &str) -> impl Future<Output = Result<RawScoreResponse, ScoreError>> + Send;
}
