//! Sentiscope Batch Analysis
//!
//! Orchestrates review analysis end to end: decoding an uploaded batch,
//! fanning out one scoring request per review, and settling the results into
//! a session that a front end can render.
//!
//! # Pipeline
//!
//! 1. **Decode** ([`decoder`]): check presence, media type, size and shape of
//!    the payload; flag unusable elements without dropping them
//! 2. **Dispatch** ([`dispatcher`]): score valid elements concurrently, each
//!    request settling independently, results kept in input order
//! 3. **Settle** ([`session`]): commit outcome and tally atomically, unless
//!    the run was cancelled or superseded
//!
//! # Examples
//!
//! ```
//! use sentiscope_batch::{AnalyzerConfig, BatchPayload, SessionController, Settlement, SessionStatus};
//! use sentiscope_scorer::MockScorer;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut scorer = MockScorer::new("POSITIVE");
//! scorer.add_network_error("flaky");
//!
//! let session = SessionController::new(scorer, &AnalyzerConfig::default());
//! let payload = BatchPayload::json(r#"[{"text": "Great"}, {"text": "flaky"}]"#);
//! let snapshot = session.analyze_batch(Some(payload)).await.unwrap().into_settled().unwrap();
//!
//! assert_eq!(snapshot.status, SessionStatus::Settled(Settlement::PartialFailure));
//! assert_eq!(snapshot.tally.positive, 1);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decoder;
pub mod dispatcher;
pub mod error;
pub mod session;

pub use config::{AnalyzerConfig, DEFAULT_MAX_PAYLOAD_BYTES};
pub use decoder::{decode, is_json_media_type, BatchPayload, DecodedBatch};
pub use dispatcher::{Cancelled, Dispatcher};
pub use error::{BatchError, ConfigError};
pub use session::{
    AnalysisMode, DisplayStatus, RunOutcome, SessionController, SessionError, SessionSnapshot,
    SessionStatus, Settlement,
};
