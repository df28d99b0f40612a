//! Sentiment module - the three tally buckets

use serde::{Deserialize, Serialize};

/// Sentiment classification of a single review
///
/// Every place that needs to turn a classifier label into a bucket goes
/// through [`Sentiment::classify`], so single-item and batch paths agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Favourable review
    Positive,

    /// Unfavourable review
    Negative,

    /// Anything that is neither positive nor negative
    Neutral,
}

impl Sentiment {
    /// Classify a classifier label
    ///
    /// Case-insensitive and tolerant of surrounding whitespace. Any value
    /// other than "positive" or "negative" falls back to `Neutral`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentiscope_domain::Sentiment;
    ///
    /// assert_eq!(Sentiment::classify("POSITIVE"), Sentiment::Positive);
    /// assert_eq!(Sentiment::classify("Negative"), Sentiment::Negative);
    /// assert_eq!(Sentiment::classify("LABEL_1"), Sentiment::Neutral);
    /// ```
    pub fn classify(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("positive") {
            Sentiment::Positive
        } else if label.eq_ignore_ascii_case("negative") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Get the sentiment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(Sentiment::classify("positive"), Sentiment::Positive);
        assert_eq!(Sentiment::classify("Positive"), Sentiment::Positive);
        assert_eq!(Sentiment::classify("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::classify("  negative "), Sentiment::Negative);
    }

    #[test]
    fn test_classify_unknown_defaults_to_neutral() {
        assert_eq!(Sentiment::classify("unknown-token"), Sentiment::Neutral);
        assert_eq!(Sentiment::classify("neutral"), Sentiment::Neutral);
        assert_eq!(Sentiment::classify(""), Sentiment::Neutral);
        assert_eq!(Sentiment::classify("positively"), Sentiment::Neutral);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }
}
