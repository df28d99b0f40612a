//! Batch payload decoding and validation
//!
//! Turns an uploaded file into an ordered list of review texts. Checks run in
//! a fixed order and stop at the first whole-batch failure:
//!
//! 1. payload present
//! 2. media type is JSON
//! 3. size within the ceiling
//! 4. content is well-formed JSON
//! 5. top level is an array
//!
//! Elements that lack a usable `text` field are flagged individually and keep
//! their position, so indices stay stable for the rest of the pipeline.

use crate::error::BatchError;
use sentiscope_domain::{ItemError, ReviewText};
use serde_json::Value;
use std::path::Path;

/// A submitted batch file
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPayload {
    /// Declared media type (e.g. "application/json")
    pub media_type: Option<String>,
    /// Size reported by the source before reading, if known
    pub declared_size: Option<u64>,
    /// Raw file content
    pub content: Vec<u8>,
}

impl BatchPayload {
    /// Create a payload with an explicit media type
    pub fn new(media_type: Option<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            media_type,
            declared_size: None,
            content: content.into(),
        }
    }

    /// Create an `application/json` payload
    pub fn json(content: impl Into<Vec<u8>>) -> Self {
        Self::new(Some("application/json".to_string()), content)
    }

    /// Record the size reported by the source
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Size checked against the ceiling: the larger of declared and actual
    pub fn size(&self) -> u64 {
        let actual = self.content.len() as u64;
        self.declared_size.map_or(actual, |declared| declared.max(actual))
    }

    /// Guess a media type from a file extension
    pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some("application/json"),
            "txt" => Some("text/plain"),
            "csv" => Some("text/csv"),
            _ => None,
        }
    }
}

/// Whether a media type denotes JSON
///
/// Accepts `application/json`, `text/json` and any `+json` structured
/// syntax suffix; parameters are ignored.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || essence == "text/json"
        || (essence.ends_with("+json") && essence.contains('/'))
}

/// Validated batch: one entry per element of the submitted array
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    entries: Vec<Result<ReviewText, ItemError>>,
}

impl DecodedBatch {
    /// Entries in input order
    pub fn entries(&self) -> &[Result<ReviewText, ItemError>] {
        &self.entries
    }

    /// Consume into the entries
    pub fn into_entries(self) -> Vec<Result<ReviewText, ItemError>> {
        self.entries
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the array was empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of elements that will be scored
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ok()).count()
    }
}

impl From<Vec<Result<ReviewText, ItemError>>> for DecodedBatch {
    fn from(entries: Vec<Result<ReviewText, ItemError>>) -> Self {
        Self { entries }
    }
}

/// Decode and validate a batch payload
///
/// # Errors
///
/// Returns the first whole-batch failure in validation order. Per-element
/// problems are reported inside the returned [`DecodedBatch`].
pub fn decode(payload: Option<&BatchPayload>, max_bytes: u64) -> Result<DecodedBatch, BatchError> {
    let payload = payload.ok_or_else(|| {
        BatchError::MissingInput("No file selected. Please choose a JSON file.".to_string())
    })?;

    match payload.media_type.as_deref() {
        Some(media_type) if is_json_media_type(media_type) => {}
        Some(other) => return Err(BatchError::UnsupportedType(other.to_string())),
        None => return Err(BatchError::UnsupportedType("unknown".to_string())),
    }

    let size = payload.size();
    if size > max_bytes {
        return Err(BatchError::PayloadTooLarge {
            size,
            limit: max_bytes,
        });
    }

    let document: Value =
        serde_json::from_slice(&payload.content).map_err(|e| BatchError::Parse(e.to_string()))?;

    let Value::Array(elements) = document else {
        return Err(BatchError::Schema(
            "Expected an array of objects.".to_string(),
        ));
    };

    let entries = elements
        .iter()
        .enumerate()
        .map(|(index, element)| element_text(index, element))
        .collect();

    Ok(DecodedBatch { entries })
}

fn element_text(index: usize, element: &Value) -> Result<ReviewText, ItemError> {
    let Value::Object(fields) = element else {
        return Err(ItemError::Schema(format!(
            "element {} is not an object",
            index
        )));
    };

    let text = match fields.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => {
            return Err(ItemError::Schema(format!(
                "element {} has a 'text' field that is not a string",
                index
            )))
        }
        None => {
            return Err(ItemError::Schema(format!(
                "element {} has no 'text' field",
                index
            )))
        }
    };

    ReviewText::new(text)
        .ok_or_else(|| ItemError::Schema(format!("element {} has a blank 'text' field", index)))
}
