//! Score normalization
//!
//! The scoring service applies three independent methods to each text:
//!
//! | Method | Shape | Used for tally |
//! |--------|-------|----------------|
//! | Classifier (A) | label + confidence | yes |
//! | Lexicon (B) | pos / neu / neg proportions, compound polarity | no |
//! | Contextual (C) | pos / neu / neg proportions | no |
//!
//! [`normalize`] validates a [`RawScoreResponse`] into a [`NormalizedResult`].
//! Values are passed through unchanged; all of them are fractions.

use crate::error::ItemError;
use crate::review::ReviewText;
use crate::sentiment::Sentiment;
use serde::{Deserialize, Serialize};

/// Unvalidated classifier reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLabelScore {
    /// Label as emitted by the service (e.g. "POSITIVE")
    pub label: Option<String>,
    /// Confidence of the label
    pub score: Option<f64>,
}

/// Unvalidated positive / neutral / negative proportions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProportions {
    /// Positive share
    pub pos: Option<f64>,
    /// Neutral share
    pub neu: Option<f64>,
    /// Negative share
    pub neg: Option<f64>,
}

/// Unvalidated lexicon reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLexiconScores {
    /// Positive / neutral / negative proportions
    pub proportions: RawProportions,
    /// Normalized polarity in `[-1, 1]`, optional
    pub compound: Option<f64>,
}

/// Unprocessed reply from the scoring service for one review
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScoreResponse {
    /// Method A
    pub classifier: Option<RawLabelScore>,
    /// Method B
    pub lexicon: Option<RawLexiconScores>,
    /// Method C
    pub contextual: Option<RawProportions>,
}

/// Validated classifier result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    /// Canonical sentiment derived from the label
    pub label: Sentiment,
    /// Label exactly as the service emitted it
    pub raw_label: String,
    /// Confidence as a fraction in `[0, 1]`
    pub confidence: f64,
}

impl LabelScore {
    /// Confidence as a percentage, for display
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Validated proportions, each a fraction in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proportions {
    /// Positive share
    pub positive: f64,
    /// Neutral share
    pub neutral: f64,
    /// Negative share
    pub negative: f64,
}

impl Proportions {
    /// `(positive, neutral, negative)` as percentages, for display
    pub fn as_percentages(&self) -> (f64, f64, f64) {
        (
            self.positive * 100.0,
            self.neutral * 100.0,
            self.negative * 100.0,
        )
    }
}

/// Validated lexicon result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LexiconScores {
    /// Positive / neutral / negative proportions
    #[serde(flatten)]
    pub proportions: Proportions,
    /// Normalized polarity in `[-1, 1]`, when the service reported it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compound: Option<f64>,
}

/// Canonical per-item result
///
/// Immutable once created; only [`normalize`] builds one from service data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Review that was scored
    pub text: ReviewText,
    /// Method A
    pub classifier: LabelScore,
    /// Method B
    pub lexicon: LexiconScores,
    /// Method C
    pub contextual: Proportions,
}

impl NormalizedResult {
    /// Sentiment used for tallying (Method A)
    pub fn sentiment(&self) -> Sentiment {
        self.classifier.label
    }
}

/// Validate a raw reply into a [`NormalizedResult`]
///
/// # Errors
///
/// Returns [`ItemError::MalformedResponse`] if any sub-record or required
/// field is absent, non-finite, or outside its range. An unrecognized label
/// is not an error; it classifies as [`Sentiment::Neutral`].
///
/// # Examples
///
/// ```
/// use sentiscope_domain::{normalize, RawScoreResponse, RawLabelScore, RawLexiconScores,
///     RawProportions, ReviewText, Sentiment};
///
/// let shares = RawProportions { pos: Some(0.7), neu: Some(0.2), neg: Some(0.1) };
/// let raw = RawScoreResponse {
///     classifier: Some(RawLabelScore { label: Some("POSITIVE".into()), score: Some(0.98) }),
///     lexicon: Some(RawLexiconScores { proportions: shares.clone(), compound: Some(0.8) }),
///     contextual: Some(shares),
/// };
///
/// let result = normalize(ReviewText::new("Loved it").unwrap(), raw).unwrap();
/// assert_eq!(result.sentiment(), Sentiment::Positive);
/// ```
pub fn normalize(text: ReviewText, raw: RawScoreResponse) -> Result<NormalizedResult, ItemError> {
    let classifier = raw.classifier.ok_or_else(|| missing("classifier"))?;
    let raw_label = classifier.label.ok_or_else(|| missing("classifier.label"))?;
    let confidence = fraction("classifier.score", classifier.score)?;

    let lexicon = raw.lexicon.ok_or_else(|| missing("lexicon"))?;
    let compound = match lexicon.compound {
        Some(value) if !value.is_finite() || !(-1.0..=1.0).contains(&value) => {
            return Err(ItemError::MalformedResponse(format!(
                "lexicon.compound out of range [-1, 1]: {}",
                value
            )));
        }
        other => other,
    };

    let contextual = raw.contextual.ok_or_else(|| missing("contextual"))?;

    Ok(NormalizedResult {
        text,
        classifier: LabelScore {
            label: Sentiment::classify(&raw_label),
            raw_label,
            confidence,
        },
        lexicon: LexiconScores {
            proportions: proportions("lexicon", &lexicon.proportions)?,
            compound,
        },
        contextual: proportions("contextual", &contextual)?,
    })
}

fn proportions(method: &str, raw: &RawProportions) -> Result<Proportions, ItemError> {
    Ok(Proportions {
        positive: fraction(&format!("{}.pos", method), raw.pos)?,
        neutral: fraction(&format!("{}.neu", method), raw.neu)?,
        negative: fraction(&format!("{}.neg", method), raw.neg)?,
    })
}

fn fraction(field: &str, value: Option<f64>) -> Result<f64, ItemError> {
    let value = value.ok_or_else(|| missing(field))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ItemError::MalformedResponse(format!(
            "{} out of range [0, 1]: {}",
            field, value
        )));
    }
    Ok(value)
}

fn missing(field: &str) -> ItemError {
    ItemError::MalformedResponse(format!("missing field '{}'", field))
}
