//! Aggregate tally - a pure fold over a batch outcome

use crate::outcome::BatchOutcome;
use crate::sentiment::Sentiment;
use serde::{Deserialize, Serialize};

/// Positive / negative / neutral counts of a batch
///
/// Only obtainable by folding an outcome (or a sentiment sequence), so it can
/// never drift from the detailed results it summarizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateTally {
    /// Reviews classified positive
    pub positive: usize,
    /// Reviews classified negative
    pub negative: usize,
    /// Everything else that was scored
    pub neutral: usize,
}

impl AggregateTally {
    /// Fold the successful entries of an outcome
    ///
    /// Failed entries (validation, network or malformed) count toward no bucket.
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        outcome.successes().map(|r| r.sentiment()).collect()
    }

    /// Sum of all three buckets
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Count for one bucket
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    fn with(mut self, sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
        self
    }
}

impl FromIterator<Sentiment> for AggregateTally {
    fn from_iter<I: IntoIterator<Item = Sentiment>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemError;
    use crate::score::{normalize, RawLabelScore, RawLexiconScores, RawProportions, RawScoreResponse};
    use crate::{NormalizedResult, ReviewText};
    use proptest::prelude::*;

    fn scored(label: &str) -> NormalizedResult {
        let shares = RawProportions {
            pos: Some(0.2),
            neu: Some(0.6),
            neg: Some(0.2),
        };
        let raw = RawScoreResponse {
            classifier: Some(RawLabelScore {
                label: Some(label.to_string()),
                score: Some(0.75),
            }),
            lexicon: Some(RawLexiconScores {
                proportions: shares.clone(),
                compound: None,
            }),
            contextual: Some(shares),
        };
        normalize(ReviewText::new(format!("review {}", label)).unwrap(), raw).unwrap()
    }

    #[test]
    fn test_mixed_case_labels() {
        let outcome = BatchOutcome::from_results(vec![
            Ok(scored("Positive")),
            Ok(scored("NEGATIVE")),
            Ok(scored("unknown-token")),
        ]);
        assert_eq!(
            outcome.tally(),
            AggregateTally {
                positive: 1,
                negative: 1,
                neutral: 1
            }
        );
    }

    #[test]
    fn test_failures_excluded() {
        let outcome = BatchOutcome::from_results(vec![
            Ok(scored("positive")),
            Err(ItemError::Network("HTTP 503".into())),
            Err(ItemError::Schema("blank text".into())),
            Ok(scored("positive")),
        ]);
        let tally = outcome.tally();
        assert_eq!(tally.positive, 2);
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn test_empty_outcome() {
        assert_eq!(BatchOutcome::empty().tally(), AggregateTally::default());
    }

    fn entry() -> impl Strategy<Value = Result<NormalizedResult, ItemError>> {
        prop_oneof![
            prop::sample::select(vec!["positive", "POSITIVE", "Negative", "neutral", "LABEL_0", ""])
                .prop_map(|label| -> Result<NormalizedResult, ItemError> { Ok(scored(label)) }),
            Just(Err(ItemError::Network("connection refused".into()))),
            Just(Err(ItemError::MalformedResponse("missing field 'lexicon'".into()))),
            Just(Err(ItemError::Schema("not an object".into()))),
        ]
    }

    proptest! {
        #[test]
        fn prop_total_equals_successes(entries in prop::collection::vec(entry(), 0..40)) {
            let outcome = BatchOutcome::from_results(entries);
            prop_assert_eq!(outcome.tally().total(), outcome.success_count());
        }

        #[test]
        fn prop_fold_is_idempotent(entries in prop::collection::vec(entry(), 0..40)) {
            let outcome = BatchOutcome::from_results(entries);
            prop_assert_eq!(outcome.tally(), outcome.tally());
            prop_assert_eq!(AggregateTally::from_outcome(&outcome), outcome.clone().tally());
        }
    }
}
