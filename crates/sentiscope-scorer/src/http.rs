//! HTTP Scorer Implementation
//!
//! Client for the sentiment scoring service. One `POST` per review with a
//! JSON body `{"text": "..."}`; the reply carries the three method results:
//!
//! ```json
//! {
//!   "huggingface": {"label": "POSITIVE", "score": 0.998},
//!   "vader": {"pos": 0.42, "neu": 0.58, "neg": 0.0, "compound": 0.66},
//!   "roberta": {"roberta_pos": 0.97, "roberta_neu": 0.02, "roberta_neg": 0.01}
//! }
//! ```
//!
//! Failed requests are never retried; the caller decides what a failure means
//! for the batch.

use crate::ScorerError;
use sentiscope_domain::{
    RawLabelScore, RawLexiconScores, RawProportions, RawScoreResponse, ScoreError, SentimentScorer,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default scoring service endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/analyze";

/// Client for the remote sentiment scoring service
#[derive(Debug, Clone)]
pub struct HttpScorer {
    endpoint: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    huggingface: Option<ClassifierBody>,
    vader: Option<LexiconBody>,
    roberta: Option<ContextualBody>,
}

#[derive(Deserialize)]
struct ClassifierBody {
    label: Option<String>,
    score: Option<f64>,
}

#[derive(Deserialize)]
struct LexiconBody {
    pos: Option<f64>,
    neu: Option<f64>,
    neg: Option<f64>,
    compound: Option<f64>,
}

#[derive(Deserialize)]
struct ContextualBody {
    roberta_pos: Option<f64>,
    roberta_neu: Option<f64>,
    roberta_neg: Option<f64>,
}

/// Error body the service sends with non-success statuses
#[derive(Deserialize)]
struct ServiceError {
    error: String,
}

impl From<AnalyzeResponse> for RawScoreResponse {
    fn from(body: AnalyzeResponse) -> Self {
        RawScoreResponse {
            classifier: body.huggingface.map(|c| RawLabelScore {
                label: c.label,
                score: c.score,
            }),
            lexicon: body.vader.map(|v| RawLexiconScores {
                proportions: RawProportions {
                    pos: v.pos,
                    neu: v.neu,
                    neg: v.neg,
                },
                compound: v.compound,
            }),
            contextual: body.roberta.map(|r| RawProportions {
                pos: r.roberta_pos,
                neu: r.roberta_neu,
                neg: r.roberta_neg,
            }),
        }
    }
}

impl HttpScorer {
    /// Create a new scorer
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Full URL of the analyze route (e.g., "http://127.0.0.1:5000/analyze")
    /// - `timeout`: Per-request timeout, `None` to wait indefinitely
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an http(s) URL or the client
    /// cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ScorerError> {
        let endpoint = endpoint.into();
        let url = reqwest::Url::parse(&endpoint)
            .map_err(|e| ScorerError::InvalidEndpoint(endpoint.clone(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScorerError::InvalidEndpoint(
                endpoint,
                "scheme must be http or https".to_string(),
            ));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ScorerError::Client(e.to_string()))?;

        Ok(Self {
            endpoint,
            timeout,
            client,
        })
    }

    /// Create a scorer for [`DEFAULT_ENDPOINT`]
    pub fn default_endpoint(timeout: Option<Duration>) -> Result<Self, ScorerError> {
        Self::new(DEFAULT_ENDPOINT, timeout)
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_error(&self, e: reqwest::Error) -> ScoreError {
        if e.is_timeout() {
            let millis = self.timeout.map(|t| t.as_millis() as u64).unwrap_or_default();
            ScoreError::Timeout(millis)
        } else if e.is_decode() {
            ScoreError::Decode(e.to_string())
        } else {
            ScoreError::Transport(e.to_string())
        }
    }
}

impl SentimentScorer for HttpScorer {
    async fn score(&self, text: &str) -> Result<RawScoreResponse, ScoreError> {
        debug!(endpoint = %self.endpoint, bytes = text.len(), "Scoring review");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest { text })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ScoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;
        let body: AnalyzeResponse =
            serde_json::from_slice(&bytes).map_err(|e| ScoreError::Decode(e.to_string()))?;

        Ok(body.into())
    }
}
