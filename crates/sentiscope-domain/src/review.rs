//! Review text module

use serde::{Deserialize, Serialize};

/// A review submitted for analysis
///
/// Guaranteed to contain at least one non-whitespace character. The original
/// text is kept verbatim (no trimming) so it is sent to the scoring service
/// exactly as the user wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewText(String);

impl ReviewText {
    /// Create a review text, returning `None` for blank input
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    /// Borrow the review as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ReviewText {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "review text must not be blank".to_string())
    }
}

impl From<ReviewText> for String {
    fn from(value: ReviewText) -> Self {
        value.0
    }
}

impl AsRef<str> for ReviewText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReviewText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank() {
        assert!(ReviewText::new("").is_none());
        assert!(ReviewText::new("   \n\t").is_none());
    }

    #[test]
    fn test_keeps_text_verbatim() {
        let review = ReviewText::new("  Great product! ").unwrap();
        assert_eq!(review.as_str(), "  Great product! ");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<ReviewText>("\"fine\"").is_ok());
        assert!(serde_json::from_str::<ReviewText>("\"  \"").is_err());
    }
}
