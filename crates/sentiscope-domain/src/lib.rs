//! Sentiscope Domain Layer
//!
//! Core types and pure functions for review sentiment analysis. Nothing in
//! this crate performs I/O; the scoring service is reached through the
//! [`traits::SentimentScorer`] trait, implemented in `sentiscope-scorer`.
//!
//! ## Key Concepts
//!
//! - **ReviewText**: A non-empty review, the unit of analysis
//! - **RawScoreResponse**: Unvalidated reply from the scoring service
//! - **NormalizedResult**: Validated, comparable view of the three scoring methods
//! - **Sentiment**: Positive / Negative / Neutral, always taken from the classifier label
//! - **BatchOutcome**: Order-stable per-item results and errors
//! - **AggregateTally**: Counts derived from the successful entries of an outcome
//!
//! ## Units
//!
//! Every confidence and proportion is a fraction in `[0, 1]`. Percentages are
//! produced only for display (see [`score::Proportions::as_percentages`]).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod outcome;
pub mod review;
pub mod score;
pub mod sentiment;
pub mod tally;
pub mod traits;

// Re-exports for convenience
pub use error::{ErrorKind, ItemError};
pub use outcome::{BatchOutcome, OutcomeEntry};
pub use review::ReviewText;
pub use score::{
    normalize, LabelScore, LexiconScores, NormalizedResult, Proportions, RawLabelScore,
    RawLexiconScores, RawProportions, RawScoreResponse,
};
pub use sentiment::Sentiment;
pub use tally::AggregateTally;
pub use traits::{ScoreError, SentimentScorer};
