//! Session controller - the single owner of analysis state
//!
//! A session holds the draft review, the current run status, the most recent
//! outcome with its tally, and at most one session-level error. Every run
//! replaces that state wholesale; results are never merged across runs.
//!
//! ## Runs and epochs
//!
//! Each accepted run gets a fresh epoch and cancellation token. Results are
//! committed only if the session epoch still matches when the run finishes,
//! so a cancelled or reset run can never overwrite newer state. While a run
//! is in flight, new submissions are rejected with [`BatchError::Busy`].
//!
//! The controller is a cheap `Clone` handle; clones share the same session.

use crate::config::AnalyzerConfig;
use crate::decoder::{self, BatchPayload, DecodedBatch};
use crate::dispatcher::{Cancelled, Dispatcher};
use crate::error::{BatchError, ConfigError};
use sentiscope_domain::{
    AggregateTally, BatchOutcome, ErrorKind, ItemError, NormalizedResult, ReviewText,
    SentimentScorer,
};
use sentiscope_scorer::HttpScorer;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// Every entry succeeded (or there were none)
    Success,
    /// At least one entry succeeded and at least one failed
    PartialFailure,
    /// Nothing succeeded, or the run failed as a whole
    TotalFailure,
}

impl Settlement {
    /// Classify a finished run
    pub fn classify(outcome: &BatchOutcome, has_session_error: bool) -> Self {
        if has_session_error {
            return Settlement::TotalFailure;
        }
        match (outcome.success_count(), outcome.failure_count()) {
            (_, 0) => Settlement::Success,
            (0, _) => Settlement::TotalFailure,
            _ => Settlement::PartialFailure,
        }
    }
}

/// Run lifecycle: `Idle -> Validating -> InFlight -> Settled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "settlement", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing running, nothing to show
    Idle,
    /// Input is being checked
    Validating,
    /// Scoring requests are outstanding
    InFlight,
    /// The last run finished
    Settled(Settlement),
}

impl SessionStatus {
    /// Whether a run currently owns the session
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::Validating | SessionStatus::InFlight)
    }

    /// Coarse status for presentation
    pub fn display(&self) -> DisplayStatus {
        match self {
            SessionStatus::Idle => DisplayStatus::Idle,
            SessionStatus::Validating => DisplayStatus::Validating,
            SessionStatus::InFlight => DisplayStatus::InFlight,
            SessionStatus::Settled(Settlement::Success) => DisplayStatus::SettledOk,
            SessionStatus::Settled(_) => DisplayStatus::SettledWithErrors,
        }
    }
}

/// Status as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStatus {
    /// Waiting for input
    Idle,
    /// Checking input
    Validating,
    /// Scoring
    InFlight,
    /// Finished with at least one error
    SettledWithErrors,
    /// Finished cleanly
    SettledOk,
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DisplayStatus::Idle => "idle",
            DisplayStatus::Validating => "validating",
            DisplayStatus::InFlight => "in-flight",
            DisplayStatus::SettledWithErrors => "settled-with-errors",
            DisplayStatus::SettledOk => "settled-ok",
        };
        f.write_str(s)
    }
}

/// Which kind of submission produced the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// One review typed by the user
    Single,
    /// An uploaded file of reviews
    Batch,
}

/// The one user-visible error of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionError {
    /// Failure kind
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl From<&BatchError> for SessionError {
    fn from(err: &BatchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<&ItemError> for SessionError {
    fn from(err: &ItemError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Read-only copy of session state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Epoch of the run that produced this state
    pub epoch: u64,
    /// Submission kind, `None` before the first run
    pub mode: Option<AnalysisMode>,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Presentation status
    pub display_status: DisplayStatus,
    /// Current single-review draft
    pub draft: String,
    /// Per-item results of the last run
    pub outcome: BatchOutcome,
    /// Counts over the successful entries of `outcome`
    pub tally: AggregateTally,
    /// Session-level error, if any
    pub error: Option<SessionError>,
}

impl SessionSnapshot {
    /// Whether a run is in flight
    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    /// The result of a successful single-review run
    pub fn single_result(&self) -> Option<&NormalizedResult> {
        if self.mode != Some(AnalysisMode::Single) {
            return None;
        }
        self.outcome.successes().next()
    }
}

/// How a submitted run ended from the submitter's point of view
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The run committed its results
    Settled(SessionSnapshot),
    /// The run was cancelled or superseded; nothing was committed
    Cancelled,
}

impl RunOutcome {
    /// The committed snapshot, if the run settled
    pub fn settled(&self) -> Option<&SessionSnapshot> {
        match self {
            RunOutcome::Settled(snapshot) => Some(snapshot),
            RunOutcome::Cancelled => None,
        }
    }

    /// Consume into the committed snapshot
    pub fn into_settled(self) -> Option<SessionSnapshot> {
        match self {
            RunOutcome::Settled(snapshot) => Some(snapshot),
            RunOutcome::Cancelled => None,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    epoch: u64,
    mode: Option<AnalysisMode>,
    status: SessionStatus,
    draft: String,
    outcome: BatchOutcome,
    tally: AggregateTally,
    error: Option<SessionError>,
    cancel: Option<CancellationToken>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            epoch: 0,
            mode: None,
            status: SessionStatus::Idle,
            draft: String::new(),
            outcome: BatchOutcome::empty(),
            tally: AggregateTally::default(),
            error: None,
            cancel: None,
        }
    }
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            epoch: self.epoch,
            mode: self.mode,
            status: self.status,
            display_status: self.status.display(),
            draft: self.draft.clone(),
            outcome: self.outcome.clone(),
            tally: self.tally,
            error: self.error.clone(),
        }
    }

    /// Abandon the current run, if any, and clear results
    fn abandon(&mut self) -> bool {
        let was_busy = self.status.is_busy();
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.epoch += 1;
        self.status = SessionStatus::Idle;
        self.outcome = BatchOutcome::empty();
        self.tally = AggregateTally::default();
        self.error = None;
        was_busy
    }
}

/// Ownership of the session by one submitted run
///
/// Dropping the guard while its run still owns the session (the submitting
/// future was dropped before settling) cancels the run and returns the
/// session to `Idle`. Once the run has settled, or a newer epoch has taken
/// over, dropping it does nothing.
struct RunGuard<'a> {
    state: &'a Mutex<SessionState>,
    epoch: u64,
    token: CancellationToken,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.epoch == self.epoch && state.status.is_busy() {
            state.abandon();
            warn!(run = self.epoch, "Run dropped before settling, session released");
        }
    }
}

struct Inner<S> {
    dispatcher: Dispatcher<S>,
    max_payload_bytes: u64,
    state: Mutex<SessionState>,
}

/// Shared handle to an analysis session
///
/// # Examples
///
/// ```
/// use sentiscope_batch::{AnalyzerConfig, BatchPayload, SessionController};
/// use sentiscope_scorer::MockScorer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let session = SessionController::new(MockScorer::new("NEGATIVE"), &AnalyzerConfig::default());
///
/// let run = session
///     .analyze_batch(Some(BatchPayload::json(r#"[{"text": "Broke in a week"}]"#)))
///     .await
///     .unwrap();
///
/// let snapshot = run.settled().unwrap();
/// assert_eq!(snapshot.tally.negative, 1);
/// assert_eq!(snapshot.display_status.to_string(), "settled-ok");
/// # }
/// ```
pub struct SessionController<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for SessionController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SessionController<HttpScorer> {
    /// Build a session that talks to the configured scoring service
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scorer = HttpScorer::new(config.endpoint.clone(), config.request_timeout())?;
        Ok(Self::new(scorer, config))
    }
}

impl<S: SentimentScorer> SessionController<S> {
    /// Create a session around `scorer`
    pub fn new(scorer: S, config: &AnalyzerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                dispatcher: Dispatcher::from_config(scorer, config),
                max_payload_bytes: config.max_payload_bytes,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// The underlying scorer
    pub fn scorer(&self) -> &S {
        self.inner.dispatcher.scorer()
    }

    /// Largest batch payload this session accepts
    pub fn max_payload_bytes(&self) -> u64 {
        self.inner.max_payload_bytes
    }

    /// Replace the single-review draft
    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().draft = text.into();
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Current lifecycle status
    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    /// Cancel the run in flight, if any, and return to `Idle`
    ///
    /// Results of the cancelled run are discarded. Returns whether a run was
    /// actually cancelled.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        if !state.status.is_busy() {
            return false;
        }
        state.abandon();
        info!(epoch = state.epoch, "Analysis cancelled");
        true
    }

    /// Clear draft, results and error, cancelling any run in flight
    pub fn reset(&self) {
        let mut state = self.lock();
        let was_busy = state.abandon();
        state.mode = None;
        state.draft.clear();
        debug!(epoch = state.epoch, was_busy, "Session reset");
    }

    /// Analyze one review
    ///
    /// A blank review settles immediately with a `MissingInput` error and no
    /// request. A failed request settles the session with that error.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`] if a run is in flight; the session is left
    /// untouched.
    pub async fn analyze_single(&self, text: impl Into<String>) -> Result<RunOutcome, BatchError> {
        let text = text.into();
        let run = self.begin(AnalysisMode::Single, Some(text.clone()))?;

        let Some(review) = ReviewText::new(text) else {
            let err = BatchError::MissingInput("Please enter a review.".to_string());
            return Ok(self.fail(run.epoch, &err));
        };

        if !self.advance(run.epoch) {
            return Ok(RunOutcome::Cancelled);
        }

        let batch = DecodedBatch::from(vec![Ok(review)]);
        let outcome = match self.inner.dispatcher.dispatch(batch, &run.token).await {
            Ok(outcome) => outcome,
            Err(Cancelled) => return Ok(RunOutcome::Cancelled),
        };

        let error = outcome.failures().next().map(|(_, e)| SessionError::from(e));
        Ok(self.commit(run.epoch, outcome, error))
    }

    /// Analyze the current draft
    pub async fn analyze_draft(&self) -> Result<RunOutcome, BatchError> {
        let draft = self.lock().draft.clone();
        self.analyze_single(draft).await
    }

    /// Analyze an uploaded batch
    ///
    /// Whole-batch validation failures settle the session with one error and
    /// no requests. Otherwise every valid element is scored and the run
    /// settles once all requests have finished.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`] if a run is in flight; the session is left
    /// untouched.
    pub async fn analyze_batch(
        &self,
        payload: Option<BatchPayload>,
    ) -> Result<RunOutcome, BatchError> {
        let run = self.begin(AnalysisMode::Batch, None)?;
        let epoch = run.epoch;

        let batch = match decoder::decode(payload.as_ref(), self.inner.max_payload_bytes) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(epoch, "Batch rejected: {}", e);
                return Ok(self.fail(epoch, &e));
            }
        };

        if !self.advance(epoch) {
            return Ok(RunOutcome::Cancelled);
        }

        info!(
            epoch,
            items = batch.len(),
            valid = batch.valid_count(),
            "Batch accepted"
        );

        match self.inner.dispatcher.dispatch(batch, &run.token).await {
            Ok(outcome) => Ok(self.commit(epoch, outcome, None)),
            Err(Cancelled) => Ok(RunOutcome::Cancelled),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the session for a new run
    fn begin(&self, mode: AnalysisMode, draft: Option<String>) -> Result<RunGuard<'_>, BatchError> {
        let mut state = self.lock();
        if state.status.is_busy() {
            debug!(epoch = state.epoch, "Rejecting submission while busy");
            return Err(BatchError::Busy);
        }

        state.abandon();
        let token = CancellationToken::new();
        state.cancel = Some(token.clone());
        state.mode = Some(mode);
        state.status = SessionStatus::Validating;
        if let Some(draft) = draft {
            state.draft = draft;
        }

        Ok(RunGuard {
            state: &self.inner.state,
            epoch: state.epoch,
            token,
        })
    }

    /// Move a validated run to `InFlight`
    fn advance(&self, epoch: u64) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.status = SessionStatus::InFlight;
        true
    }

    fn fail(&self, epoch: u64, err: &BatchError) -> RunOutcome {
        self.commit(epoch, BatchOutcome::empty(), Some(SessionError::from(err)))
    }

    /// Settle the run with `epoch`, unless it has been superseded
    fn commit(
        &self,
        epoch: u64,
        outcome: BatchOutcome,
        error: Option<SessionError>,
    ) -> RunOutcome {
        let mut state = self.lock();
        if state.epoch != epoch {
            warn!(
                run = epoch,
                current = state.epoch,
                "Discarding results of a superseded run"
            );
            return RunOutcome::Cancelled;
        }

        let settlement = Settlement::classify(&outcome, error.is_some());
        state.tally = outcome.tally();
        state.outcome = outcome;
        state.error = error;
        state.status = SessionStatus::Settled(settlement);
        state.cancel = None;

        info!(
            epoch,
            ?settlement,
            positive = state.tally.positive,
            negative = state.tally.negative,
            neutral = state.tally.neutral,
            "Analysis settled"
        );

        RunOutcome::Settled(state.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentiscope_domain::Sentiment;
    use sentiscope_scorer::MockScorer;
    use std::time::Duration;

    fn session(scorer: MockScorer) -> SessionController<MockScorer> {
        SessionController::new(scorer, &AnalyzerConfig::default())
    }

    #[test]
    fn test_settlement_classification() {
        let ok = || -> Result<NormalizedResult, ItemError> {
            sentiscope_domain::normalize(
                ReviewText::new("x").unwrap(),
                sentiscope_scorer::sample_response("POSITIVE", 0.9),
            )
        };
        let err = || -> Result<NormalizedResult, ItemError> { Err(ItemError::Network("down".into())) };

        assert_eq!(
            Settlement::classify(&BatchOutcome::empty(), false),
            Settlement::Success
        );
        assert_eq!(
            Settlement::classify(&BatchOutcome::from_results(vec![ok(), ok()]), false),
            Settlement::Success
        );
        assert_eq!(
            Settlement::classify(&BatchOutcome::from_results(vec![ok(), err()]), false),
            Settlement::PartialFailure
        );
        assert_eq!(
            Settlement::classify(&BatchOutcome::from_results(vec![err(), err()]), false),
            Settlement::TotalFailure
        );
        assert_eq!(
            Settlement::classify(&BatchOutcome::empty(), true),
            Settlement::TotalFailure
        );
    }

    #[test]
    fn test_display_status() {
        assert_eq!(SessionStatus::Idle.display().to_string(), "idle");
        assert_eq!(SessionStatus::InFlight.display().to_string(), "in-flight");
        assert_eq!(
            SessionStatus::Settled(Settlement::Success).display(),
            DisplayStatus::SettledOk
        );
        assert_eq!(
            SessionStatus::Settled(Settlement::PartialFailure).display(),
            DisplayStatus::SettledWithErrors
        );
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(SessionStatus::Settled(Settlement::PartialFailure)).unwrap();
        assert_eq!(json["state"], "settled");
        assert_eq!(json["settlement"], "partial_failure");
    }

    #[tokio::test]
    async fn test_single_review() {
        let controller = session(MockScorer::new("POSITIVE"));
        let run = controller.analyze_single("Love it").await.unwrap();
        let snapshot = run.settled().unwrap();

        assert_eq!(snapshot.status, SessionStatus::Settled(Settlement::Success));
        assert_eq!(snapshot.draft, "Love it");
        assert_eq!(
            snapshot.single_result().unwrap().sentiment(),
            Sentiment::Positive
        );
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_blank_single_review_sends_nothing() {
        let scorer = MockScorer::default();
        let controller = session(scorer.clone());

        let run = controller.analyze_single("   ").await.unwrap();
        let snapshot = run.settled().unwrap();

        assert_eq!(scorer.call_count(), 0);
        assert_eq!(snapshot.error.as_ref().unwrap().kind, ErrorKind::MissingInput);
        assert_eq!(snapshot.error.as_ref().unwrap().message, "Please enter a review.");
        assert_eq!(snapshot.display_status, DisplayStatus::SettledWithErrors);
    }

    #[tokio::test]
    async fn test_single_review_network_failure() {
        let mut scorer = MockScorer::default();
        scorer.add_network_error("unlucky");
        let controller = session(scorer);

        let snapshot = controller
            .analyze_single("unlucky")
            .await
            .unwrap()
            .into_settled()
            .unwrap();

        assert_eq!(snapshot.error.as_ref().unwrap().kind, ErrorKind::NetworkError);
        assert!(snapshot.single_result().is_none());
        assert_eq!(snapshot.status, SessionStatus::Settled(Settlement::TotalFailure));
    }

    #[tokio::test]
    async fn test_analyze_draft() {
        let controller = session(MockScorer::new("NEUTRAL"));
        controller.set_draft("It is a chair");

        let snapshot = controller.analyze_draft().await.unwrap().into_settled().unwrap();
        assert_eq!(snapshot.tally.neutral, 1);
        assert_eq!(snapshot.draft, "It is a chair");
    }

    #[tokio::test]
    async fn test_busy_rejection_leaves_state_untouched() {
        let mut scorer = MockScorer::new("POSITIVE");
        scorer.add_delay("slow", Duration::from_millis(100));
        let controller = session(scorer.clone());
        let other = controller.clone();

        let second = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let before = other.snapshot();
            let rejected = other.analyze_single("intruder").await;
            (before, rejected, other.snapshot())
        };
        let (first, (before, rejected, after)) =
            tokio::join!(controller.analyze_single("slow"), second);

        assert_eq!(rejected, Err(BatchError::Busy));
        assert_eq!(before, after);
        assert_eq!(before.status, SessionStatus::InFlight);
        assert!(first.unwrap().settled().is_some());
        assert_eq!(scorer.calls(), vec!["slow".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_discards_run() {
        let mut scorer = MockScorer::new("POSITIVE");
        scorer.add_delay("slow", Duration::from_secs(5));
        let controller = session(scorer);
        let other = controller.clone();

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            other.cancel()
        };
        let (run, cancelled) = tokio::join!(controller.analyze_single("slow"), canceller);

        assert!(cancelled);
        assert_eq!(run.unwrap(), RunOutcome::Cancelled);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.outcome.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let controller = session(MockScorer::default());
        let epoch = controller.snapshot().epoch;
        assert!(!controller.cancel());
        assert_eq!(controller.snapshot().epoch, epoch);
    }

    #[tokio::test]
    async fn test_stale_commit_is_dropped() {
        let controller = session(MockScorer::default());
        let run = controller.begin(AnalysisMode::Batch, None).unwrap();
        controller.reset();

        let outcome = controller.commit(run.epoch, BatchOutcome::empty(), None);
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let controller = session(MockScorer::new("NEGATIVE"));
        controller.analyze_single("Bad").await.unwrap();
        controller.reset();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.draft.is_empty());
        assert!(snapshot.outcome.is_empty());
        assert_eq!(snapshot.tally, AggregateTally::default());
        assert!(snapshot.mode.is_none());
    }

    #[tokio::test]
    async fn test_new_run_replaces_previous_state() {
        let controller = session(MockScorer::new("POSITIVE"));
        controller
            .analyze_batch(Some(BatchPayload::json("not json")))
            .await
            .unwrap();
        assert!(controller.snapshot().error.is_some());

        let snapshot = controller
            .analyze_batch(Some(BatchPayload::json(r#"[{"text": "a"}]"#)))
            .await
            .unwrap()
            .into_settled()
            .unwrap();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.outcome.len(), 1);
    }

    #[test]
    fn test_from_config_rejects_bad_endpoint() {
        let config = AnalyzerConfig {
            endpoint: "localhost:5000".to_string(),
            ..AnalyzerConfig::default()
        };
        assert!(SessionController::from_config(&config).is_err());
    }
}
