//! Batch command implementation.

use crate::cli::BatchArgs;
use crate::error::Result;
use crate::output::Formatter;
use sentiscope_batch::{BatchPayload, SessionController, SessionSnapshot};
use sentiscope_domain::SentimentScorer;
use std::io;
use std::path::Path;
use tracing::debug;

/// Execute the batch command.
pub async fn execute_batch<S: SentimentScorer>(
    args: BatchArgs,
    session: &SessionController<S>,
    formatter: &Formatter,
) -> Result<SessionSnapshot> {
    let payload = read_payload(&args.file, session.max_payload_bytes()).await?;
    let snapshot = super::settle(session, session.analyze_batch(payload)).await?;

    println!("{}", formatter.format_snapshot(&snapshot)?);

    Ok(snapshot)
}

/// Read a batch file, skipping the content if it is over the ceiling.
///
/// A file that does not exist is no payload at all, so the session reports
/// it the same way as an empty selection.
async fn read_payload(path: &Path, max_bytes: u64) -> Result<Option<BatchPayload>> {
    let declared = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Batch file not found");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let media_type = BatchPayload::media_type_for_path(path).map(str::to_string);

    let content = if declared > max_bytes {
        debug!(declared, max_bytes, "Not reading oversized file");
        Vec::new()
    } else {
        tokio::fs::read(path).await?
    };

    Ok(Some(
        BatchPayload::new(media_type, content).with_declared_size(declared),
    ))
}
