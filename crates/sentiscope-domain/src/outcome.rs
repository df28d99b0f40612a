//! Batch outcome - per-item results in input order

use crate::error::ItemError;
use crate::score::NormalizedResult;
use crate::tally::AggregateTally;
use serde::{Deserialize, Serialize};

/// One entry of a [`BatchOutcome`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEntry {
    /// Position of the element in the submitted payload
    pub index: usize,
    /// Scored result, or why this element has none
    #[serde(with = "entry_result")]
    pub result: Result<NormalizedResult, ItemError>,
}

impl OutcomeEntry {
    /// Whether this entry was scored successfully
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-item results of one submission
///
/// Always one entry per submitted element, ordered by `index`, whatever order
/// the underlying requests completed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    entries: Vec<OutcomeEntry>,
}

impl BatchOutcome {
    /// Build an outcome from per-position results
    ///
    /// The position in `results` becomes the entry index.
    pub fn from_results(results: Vec<Result<NormalizedResult, ItemError>>) -> Self {
        let entries = results
            .into_iter()
            .enumerate()
            .map(|(index, result)| OutcomeEntry { index, result })
            .collect();
        Self { entries }
    }

    /// Outcome with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// All entries in input order
    pub fn entries(&self) -> &[OutcomeEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successfully scored results, in input order
    pub fn successes(&self) -> impl Iterator<Item = &NormalizedResult> {
        self.entries.iter().filter_map(|e| e.result.as_ref().ok())
    }

    /// Failed entries as `(index, error)`, in input order
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ItemError)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().err().map(|err| (e.index, err)))
    }

    /// Number of successful entries
    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    /// Number of failed entries
    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// Aggregate tally of this outcome
    pub fn tally(&self) -> AggregateTally {
        AggregateTally::from_outcome(self)
    }
}

/// Serializes `Result` as `{"ok": ...}` / `{"error": ...}`
mod entry_result {
    use super::{ItemError, NormalizedResult};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Repr<T, E> {
        Ok(T),
        Error(E),
    }

    pub fn serialize<S: Serializer>(
        value: &Result<NormalizedResult, ItemError>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Ok(result) => Repr::<&NormalizedResult, &ItemError>::Ok(result).serialize(serializer),
            Err(err) => Repr::<&NormalizedResult, &ItemError>::Error(err).serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Result<NormalizedResult, ItemError>, D::Error> {
        Ok(match Repr::<NormalizedResult, ItemError>::deserialize(deserializer)? {
            Repr::Ok(result) => Ok(result),
            Repr::Error(err) => Err(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{LabelScore, LexiconScores, Proportions};
    use crate::{ReviewText, Sentiment};

    fn result(text: &str, label: Sentiment) -> NormalizedResult {
        let shares = Proportions {
            positive: 0.3,
            neutral: 0.4,
            negative: 0.3,
        };
        NormalizedResult {
            text: ReviewText::new(text).unwrap(),
            classifier: LabelScore {
                label,
                raw_label: label.as_str().to_uppercase(),
                confidence: 0.9,
            },
            lexicon: LexiconScores {
                proportions: shares,
                compound: None,
            },
            contextual: shares,
        }
    }

    #[test]
    fn test_indices_follow_positions() {
        let outcome = BatchOutcome::from_results(vec![
            Ok(result("a", Sentiment::Positive)),
            Err(ItemError::Network("down".into())),
            Ok(result("c", Sentiment::Negative)),
        ]);

        let indices: Vec<usize> = outcome.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.failure_count(), 1);
        assert_eq!(outcome.failures().next().unwrap().0, 1);
    }

    #[test]
    fn test_json_shape() {
        let outcome = BatchOutcome::from_results(vec![
            Ok(result("a", Sentiment::Positive)),
            Err(ItemError::Schema("missing 'text'".into())),
        ]);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["entries"][0]["result"]["ok"]["classifier"]["label"], "positive");
        assert_eq!(json["entries"][1]["result"]["error"]["kind"], "schema");

        let back: BatchOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }
}
