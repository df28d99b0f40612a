//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use sentiscope_batch::{AnalysisMode, SessionSnapshot};
use sentiscope_domain::{AggregateTally, NormalizedResult, Proportions, Sentiment};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const REVIEW_WIDTH: usize = 40;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a settled session.
    pub fn format_snapshot(&self, snapshot: &SessionSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
            OutputFormat::Table => Ok(self.format_snapshot_table(snapshot)),
        }
    }

    fn format_snapshot_table(&self, snapshot: &SessionSnapshot) -> String {
        if let Some(error) = &snapshot.error {
            return self.error(&error.message);
        }

        match snapshot.mode {
            Some(AnalysisMode::Single) => snapshot
                .single_result()
                .map(|result| self.format_result(result))
                .unwrap_or_else(|| self.warning("No result.")),
            _ => {
                let mut out = self.format_outcome_table(snapshot);
                out.push('\n');
                out.push_str(&self.format_tally(&snapshot.tally, snapshot.outcome.failure_count()));
                out
            }
        }
    }

    /// Format one result as a per-method table.
    pub fn format_result(&self, result: &NormalizedResult) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Method", "Result"]);
        builder.push_record([
            "Classifier".to_string(),
            format!(
                "{} ({:.1}%)",
                self.sentiment_label(result.sentiment(), &result.classifier.raw_label),
                result.classifier.confidence_percent()
            ),
        ]);

        let mut lexicon = proportions(&result.lexicon.proportions);
        if let Some(compound) = result.lexicon.compound {
            lexicon.push_str(&format!("  compound {:+.2}", compound));
        }
        builder.push_record(["Lexicon".to_string(), lexicon]);
        builder.push_record(["Contextual".to_string(), proportions(&result.contextual)]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a batch outcome with one row per entry.
    fn format_outcome_table(&self, snapshot: &SessionSnapshot) -> String {
        if snapshot.outcome.is_empty() {
            return self.colorize("No reviews found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Review", "Sentiment", "Confidence", "Lexicon", "Contextual"]);

        for entry in snapshot.outcome.entries() {
            let index = (entry.index + 1).to_string();
            match &entry.result {
                Ok(result) => builder.push_record([
                    index,
                    truncate(result.text.as_str(), REVIEW_WIDTH),
                    self.sentiment_label(result.sentiment(), &result.classifier.raw_label),
                    format!("{:.1}%", result.classifier.confidence_percent()),
                    proportions(&result.lexicon.proportions),
                    proportions(&result.contextual),
                ]),
                Err(e) => builder.push_record([
                    index,
                    self.error(&truncate(&e.to_string(), REVIEW_WIDTH)),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]),
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format tally counts.
    pub fn format_tally(&self, tally: &AggregateTally, failed: usize) -> String {
        let mut line = format!(
            "{}  {}  {}",
            self.colorize(&format!("Positive: {}", tally.positive), "green"),
            self.colorize(&format!("Negative: {}", tally.negative), "red"),
            self.colorize(&format!("Neutral: {}", tally.neutral), "blue"),
        );
        if failed > 0 {
            line.push_str(&format!(
                "  {}",
                self.colorize(&format!("Failed: {}", failed), "yellow")
            ));
        }
        line
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn sentiment_label(&self, sentiment: Sentiment, raw_label: &str) -> String {
        let color = match sentiment {
            Sentiment::Positive => "green",
            Sentiment::Negative => "red",
            Sentiment::Neutral => "blue",
        };
        let name = match sentiment {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        let text = if raw_label.trim().eq_ignore_ascii_case(name) {
            name.to_string()
        } else {
            format!("{} ({})", name, raw_label)
        };
        self.colorize(&text, color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn proportions(shares: &Proportions) -> String {
    let (pos, neu, neg) = shares.as_percentages();
    format!("+{:.1}% ={:.1}% -{:.1}%", pos, neu, neg)
}

fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentiscope_batch::{AnalyzerConfig, BatchPayload, SessionController};
    use sentiscope_scorer::MockScorer;

    async fn batch_snapshot() -> SessionSnapshot {
        let mut scorer = MockScorer::new("POSITIVE");
        scorer.add_label("awful", "NEGATIVE");
        scorer.add_label("odd", "mixed");
        scorer.add_network_error("lost");
        let session = SessionController::new(scorer, &AnalyzerConfig::default());
        session
            .analyze_batch(Some(BatchPayload::json(
                r#"[{"text": "great"}, {"text": "awful"}, {"text": "odd"}, {"text": "lost"}]"#,
            )))
            .await
            .unwrap()
            .into_settled()
            .unwrap()
    }

    #[tokio::test]
    async fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_snapshot(&batch_snapshot().await).unwrap();

        assert!(output.contains("Sentiment"));
        assert!(output.contains("90.0%"));
        assert!(output.contains("+35.0% =55.0% -10.0%"));
        assert!(output.contains("Neutral (mixed)"));
        assert!(output.contains("✗ Network error"));
        assert!(output.contains("Positive: 1  Negative: 1  Neutral: 1  Failed: 1"));
    }

    #[tokio::test]
    async fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_snapshot(&batch_snapshot().await).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["display_status"], "settled-with-errors");
        assert_eq!(value["tally"]["neutral"], 1);
        // Fractions, not percentages
        assert_eq!(
            value["outcome"]["entries"][0]["result"]["ok"]["classifier"]["confidence"],
            0.9
        );
    }

    #[tokio::test]
    async fn test_single_result_table() {
        let session = SessionController::new(MockScorer::new("NEGATIVE"), &AnalyzerConfig::default());
        let snapshot = session
            .analyze_single("Stopped working")
            .await
            .unwrap()
            .into_settled()
            .unwrap();

        let output = Formatter::new(OutputFormat::Table, false)
            .format_snapshot(&snapshot)
            .unwrap();
        assert!(output.contains("Classifier"));
        assert!(output.contains("Negative (90.0%)"));
        assert!(output.contains("compound +0.40"));
    }

    #[tokio::test]
    async fn test_session_error_is_shown_alone() {
        let session = SessionController::new(MockScorer::default(), &AnalyzerConfig::default());
        let snapshot = session
            .analyze_batch(None)
            .await
            .unwrap()
            .into_settled()
            .unwrap();

        let output = Formatter::new(OutputFormat::Table, false)
            .format_snapshot(&snapshot)
            .unwrap();
        assert_eq!(output, "✗ No file selected. Please choose a JSON file.");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let session = SessionController::new(MockScorer::default(), &AnalyzerConfig::default());
        let snapshot = session
            .analyze_batch(Some(BatchPayload::json("[]")))
            .await
            .unwrap()
            .into_settled()
            .unwrap();

        let output = Formatter::new(OutputFormat::Table, false)
            .format_snapshot(&snapshot)
            .unwrap();
        assert!(output.contains("No reviews found."));
        assert!(output.contains("Positive: 0  Negative: 0  Neutral: 0"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer review", 8), "a much …");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.error("test"), "✗ test");
    }
}
