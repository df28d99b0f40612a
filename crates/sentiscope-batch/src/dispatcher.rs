//! Request dispatcher - concurrent, isolated scoring of a decoded batch

use crate::config::AnalyzerConfig;
use crate::decoder::DecodedBatch;
use futures::stream::{self, StreamExt};
use sentiscope_domain::{
    normalize, BatchOutcome, ItemError, NormalizedResult, ReviewText, ScoreError, SentimentScorer,
};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The run was cancelled before every request settled
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Batch cancelled")]
pub struct Cancelled;

/// Issues one scoring request per review
///
/// Requests run concurrently on the calling task, at most `max_concurrency`
/// at a time. Every request settles on its own: a failure or a slow reply
/// never affects another item, and the dispatcher waits for all of them.
///
/// # Examples
///
/// ```
/// use sentiscope_batch::{decoder, BatchPayload, Dispatcher};
/// use sentiscope_scorer::MockScorer;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dispatcher = Dispatcher::new(MockScorer::new("POSITIVE")).with_max_concurrency(Some(2));
/// let payload = BatchPayload::json(r#"[{"text": "Nice"}, {"text": "Solid"}]"#);
/// let batch = decoder::decode(Some(&payload), 1024).unwrap();
///
/// let outcome = dispatcher.dispatch(batch, &CancellationToken::new()).await.unwrap();
/// assert_eq!(outcome.tally().positive, 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher<S> {
    scorer: S,
    max_concurrency: Option<usize>,
    request_timeout: Option<Duration>,
}

impl<S: SentimentScorer> Dispatcher<S> {
    /// Create an unbounded dispatcher without a timeout
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            max_concurrency: None,
            request_timeout: None,
        }
    }

    /// Create a dispatcher using the concurrency and timeout settings of `config`
    pub fn from_config(scorer: S, config: &AnalyzerConfig) -> Self {
        Self::new(scorer)
            .with_max_concurrency(config.max_concurrency)
            .with_request_timeout(config.request_timeout())
    }

    /// Set the maximum number of requests in flight (`None` = unbounded)
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The underlying scorer
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score every valid entry of `batch`
    ///
    /// Entries that failed validation pass through untouched and trigger no
    /// request. The returned outcome has one entry per batch entry, in input
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires first; outstanding requests
    /// are dropped and no outcome is produced.
    pub async fn dispatch(
        &self,
        batch: DecodedBatch,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let mut slots: Vec<Option<Result<NormalizedResult, ItemError>>> =
            Vec::with_capacity(batch.len());
        let mut pending = Vec::new();
        for (index, entry) in batch.into_entries().into_iter().enumerate() {
            match entry {
                Ok(text) => {
                    slots.push(None);
                    pending.push((index, text));
                }
                Err(e) => slots.push(Some(Err(e))),
            }
        }

        let limit = self.max_concurrency.unwrap_or(pending.len()).max(1);
        info!(
            "Dispatching {} scoring request(s) for {} item(s) (max in flight: {})",
            pending.len(),
            slots.len(),
            limit
        );

        let requests = stream::iter(pending)
            .map(|(index, text)| async move { (index, self.score_one(index, text).await) })
            .buffer_unordered(limit)
            .for_each(|(index, result)| {
                slots[index] = Some(result);
                futures::future::ready(())
            });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Dispatch cancelled, dropping outstanding requests");
                return Err(Cancelled);
            }
            _ = requests => {}
        }

        let results = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(ItemError::Network("request did not settle".to_string())))
            })
            .collect();

        Ok(BatchOutcome::from_results(results))
    }

    async fn score_one(&self, index: usize, text: ReviewText) -> Result<NormalizedResult, ItemError> {
        debug!(index, "Scoring item");

        let request = self.scorer.score(text.as_str());
        let reply = match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(reply) => reply,
                Err(_) => Err(ScoreError::Timeout(limit.as_millis() as u64)),
            },
            None => request.await,
        };

        let result = reply
            .map_err(ItemError::from)
            .and_then(|raw| normalize(text, raw));
        if let Err(e) = &result {
            warn!(index, "Item could not be scored: {}", e);
        }
        result
    }
}
