//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::error::Result;
use crate::output::Formatter;
use sentiscope_batch::{SessionController, SessionSnapshot};
use sentiscope_domain::SentimentScorer;

/// Execute the analyze command.
pub async fn execute_analyze<S: SentimentScorer>(
    args: AnalyzeArgs,
    session: &SessionController<S>,
    formatter: &Formatter,
) -> Result<SessionSnapshot> {
    session.set_draft(args.text);
    let snapshot = super::settle(session, session.analyze_draft()).await?;

    println!("{}", formatter.format_snapshot(&snapshot)?);

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use sentiscope_batch::AnalyzerConfig;
    use sentiscope_domain::{ErrorKind, Sentiment};
    use sentiscope_scorer::MockScorer;

    #[tokio::test]
    async fn test_analyze_review() {
        let session = SessionController::new(MockScorer::new("POSITIVE"), &AnalyzerConfig::default());
        let formatter = Formatter::new(OutputFormat::Table, false);

        let snapshot = execute_analyze(
            AnalyzeArgs {
                text: "Best purchase this year".to_string(),
            },
            &session,
            &formatter,
        )
        .await
        .unwrap();

        assert_eq!(
            snapshot.single_result().unwrap().sentiment(),
            Sentiment::Positive
        );
    }

    #[tokio::test]
    async fn test_blank_review_is_session_error() {
        let scorer = MockScorer::default();
        let session = SessionController::new(scorer.clone(), &AnalyzerConfig::default());
        let formatter = Formatter::new(OutputFormat::Json, false);

        let snapshot = execute_analyze(
            AnalyzeArgs {
                text: " \t ".to_string(),
            },
            &session,
            &formatter,
        )
        .await
        .unwrap();

        assert_eq!(snapshot.error.unwrap().kind, ErrorKind::MissingInput);
        assert_eq!(scorer.call_count(), 0);
    }
}
