//! Sentiscope Scorer Layer
//!
//! Implementations of the `SentimentScorer` trait from `sentiscope-domain`.
//!
//! # Scorers
//!
//! - `MockScorer`: Deterministic, scriptable scorer for testing
//! - `HttpScorer`: Client for the remote sentiment scoring service
//!
//! # Examples
//!
//! ```
//! use sentiscope_scorer::MockScorer;
//! use sentiscope_domain::SentimentScorer;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scorer = MockScorer::new("POSITIVE");
//! let raw = scorer.score("Great value").await.unwrap();
//! assert_eq!(raw.classifier.unwrap().label.as_deref(), Some("POSITIVE"));
//! # }
//! ```

#![warn(missing_docs)]

pub mod http;

use sentiscope_domain::{
    RawLabelScore, RawLexiconScores, RawProportions, RawScoreResponse, ScoreError, SentimentScorer,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use http::HttpScorer;

/// Errors that can occur while setting up a scorer
#[derive(Error, Debug)]
pub enum ScorerError {
    /// Endpoint is not a usable URL
    #[error("Invalid endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Build a complete, in-range reply with the given classifier label
///
/// Lexicon and contextual proportions are filled with plausible values.
pub fn sample_response(label: &str, confidence: f64) -> RawScoreResponse {
    RawScoreResponse {
        classifier: Some(RawLabelScore {
            label: Some(label.to_string()),
            score: Some(confidence),
        }),
        lexicon: Some(RawLexiconScores {
            proportions: RawProportions {
                pos: Some(0.35),
                neu: Some(0.55),
                neg: Some(0.1),
            },
            compound: Some(0.4),
        }),
        contextual: Some(RawProportions {
            pos: Some(0.6),
            neu: Some(0.3),
            neg: Some(0.1),
        }),
    }
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<String, Result<RawScoreResponse, ScoreError>>,
    delays: HashMap<String, Duration>,
    calls: Vec<String>,
    in_flight: usize,
    peak_in_flight: usize,
}

/// Mock scorer for deterministic testing
///
/// Returns pre-configured replies without making any network calls. Replies
/// and delays can be scripted per text, which makes it possible to reorder
/// completions or fail a single item.
///
/// # Examples
///
/// ```
/// use sentiscope_scorer::MockScorer;
/// use std::time::Duration;
///
/// let mut scorer = MockScorer::new("NEGATIVE");
/// scorer.add_label("Loved it", "POSITIVE");
/// scorer.add_network_error("Crashes daily");
/// scorer.add_delay("Loved it", Duration::from_millis(20));
/// assert_eq!(scorer.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockScorer {
    default_reply: RawScoreResponse,
    state: Arc<Mutex<MockState>>,
}

impl MockScorer {
    /// Create a mock that labels every text with `label`
    pub fn new(label: impl AsRef<str>) -> Self {
        Self::with_default(sample_response(label.as_ref(), 0.9))
    }

    /// Create a mock with an arbitrary default reply
    pub fn with_default(reply: RawScoreResponse) -> Self {
        Self {
            default_reply: reply,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Reply to `text` with a complete response carrying `label`
    pub fn add_label(&mut self, text: impl Into<String>, label: &str) {
        self.add_reply(text, Ok(sample_response(label, 0.9)));
    }

    /// Reply to `text` with an arbitrary result
    pub fn add_reply(
        &mut self,
        text: impl Into<String>,
        reply: Result<RawScoreResponse, ScoreError>,
    ) {
        self.lock().replies.insert(text.into(), reply);
    }

    /// Fail `text` as if the service were unreachable
    pub fn add_network_error(&mut self, text: impl Into<String>) {
        self.add_reply(
            text,
            Err(ScoreError::Transport("connection refused".to_string())),
        );
    }

    /// Delay the reply for `text`
    pub fn add_delay(&mut self, text: impl Into<String>, delay: Duration) {
        self.lock().delays.insert(text.into(), delay);
    }

    /// Get the number of times score was called
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Texts scored so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Highest number of requests that were pending at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.lock().peak_in_flight
    }

    /// Reset call history and concurrency tracking
    pub fn reset_calls(&self) {
        let mut state = self.lock();
        state.calls.clear();
        state.peak_in_flight = 0;
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new("NEUTRAL")
    }
}

/// Decrements the in-flight counter even if the scoring future is dropped
struct InFlight<'a>(&'a MockScorer);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.lock().in_flight -= 1;
    }
}

impl SentimentScorer for MockScorer {
    async fn score(&self, text: &str) -> Result<RawScoreResponse, ScoreError> {
        let (reply, delay) = {
            let mut state = self.lock();
            state.calls.push(text.to_string());
            state.in_flight += 1;
            state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
            let reply = state
                .replies
                .get(text)
                .cloned()
                .unwrap_or_else(|| Ok(self.default_reply.clone()));
            (reply, state.delays.get(text).copied())
        };
        let _guard = InFlight(self);

        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            // Yield so concurrently dispatched requests genuinely overlap
            None => tokio::task::yield_now().await,
        }

        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scorer_default() {
        let scorer = MockScorer::new("POSITIVE");
        let raw = scorer.score("anything").await.unwrap();
        assert_eq!(raw, sample_response("POSITIVE", 0.9));
    }

    #[tokio::test]
    async fn test_mock_scorer_specific_replies() {
        let mut scorer = MockScorer::default();
        scorer.add_label("good", "POSITIVE");
        scorer.add_network_error("bad");

        let good = scorer.score("good").await.unwrap();
        assert_eq!(good.classifier.unwrap().label.as_deref(), Some("POSITIVE"));
        assert!(matches!(
            scorer.score("bad").await,
            Err(ScoreError::Transport(_))
        ));
        let other = scorer.score("other").await.unwrap();
        assert_eq!(other.classifier.unwrap().label.as_deref(), Some("NEUTRAL"));
    }

    #[tokio::test]
    async fn test_mock_scorer_call_tracking() {
        let scorer = MockScorer::default();
        assert_eq!(scorer.call_count(), 0);

        scorer.score("one").await.unwrap();
        scorer.score("two").await.unwrap();
        assert_eq!(scorer.calls(), vec!["one", "two"]);
        assert_eq!(scorer.peak_in_flight(), 1);

        scorer.reset_calls();
        assert_eq!(scorer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_scorer_clone_shares_state() {
        let scorer1 = MockScorer::default();
        let scorer2 = scorer1.clone();

        scorer1.score("test").await.unwrap();

        assert_eq!(scorer1.call_count(), 1);
        assert_eq!(scorer2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_scorer_tracks_overlap() {
        let mut scorer = MockScorer::default();
        scorer.add_delay("a", Duration::from_millis(30));
        scorer.add_delay("b", Duration::from_millis(30));

        let (a, b) = tokio::join!(scorer.score("a"), scorer.score("b"));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(scorer.peak_in_flight(), 2);
    }
}
