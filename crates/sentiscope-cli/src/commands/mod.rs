//! Command implementations.

pub mod analyze;
pub mod batch;

pub use self::analyze::execute_analyze;
pub use self::batch::execute_batch;

use crate::error::{CliError, Result};
use sentiscope_batch::{BatchError, RunOutcome, SessionController, SessionSnapshot};
use sentiscope_domain::SentimentScorer;
use std::future::Future;

/// Drive a run to completion, cancelling the session on Ctrl+C.
async fn settle<S, F>(session: &SessionController<S>, run: F) -> Result<SessionSnapshot>
where
    S: SentimentScorer,
    F: Future<Output = std::result::Result<RunOutcome, BatchError>>,
{
    tokio::select! {
        outcome = run => match outcome? {
            RunOutcome::Settled(snapshot) => Ok(snapshot),
            RunOutcome::Cancelled => Err(CliError::Cancelled),
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            session.cancel();
            Err(CliError::Cancelled)
        }
    }
}
