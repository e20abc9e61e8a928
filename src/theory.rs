//! # Theory Results
//!
//! The structured answer of the external theory resolver and the boundary to it.
//!
//! The resolver is a hosted language model, so its answer arrives as free text that
//! should contain one JSON object:
//!
//! ```json
//! {
//!   "root": "F#",
//!   "type": "Dominant 7th",
//!   "category": "chord",
//!   "notes": ["F#", "A#", "C#", "E"],
//!   "intervals": ["R", "M3", "P5", "m7"],
//!   "description": "A major triad with a minor seventh.",
//!   "keySignature": { "accidental": "sharp", "count": 6, "notes": ["F#", "C#", "G#", "D#", "A#", "E#"] }
//! }
//! ```
//!
//! Only `notes` and `root` drive the keyboard. The other fields pass through untouched
//! for display.

use crate::error::KeyglowError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAccidental {
    #[serde(rename = "sharp", alias = "sharps")]
    Sharp,
    #[serde(rename = "flat", alias = "flats")]
    Flat,
    #[serde(rename = "none", alias = "natural")]
    Natural,
}

/// Display-only key signature descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySignature {
    pub accidental: SignatureAccidental,
    pub count: u8,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheoryResult {
    pub root: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    pub notes: Vec<String>,
    /// Parallel to `notes` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<Vec<String>>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_signature: Option<KeySignature>,
}

impl TheoryResult {
    /// Parse and validate the resolver's raw answer.
    ///
    /// The object is taken from the first `{` to the last `}`, inside a fenced code
    /// block when there is one, so prose and language tags around it are tolerated.
    ///
    /// # Example
    /// ```
    /// use keyglow::TheoryResult;
    ///
    /// let text = "Here you go:\n```json\n{\"root\":\"C\",\"type\":\"Major\",\"notes\":[\"C\",\"E\",\"G\"]}\n```";
    /// let result = TheoryResult::from_json(text).unwrap();
    /// assert_eq!(result.notes, vec!["C", "E", "G"]);
    /// ```
    pub fn from_json(text: &str) -> Result<Self, KeyglowError> {
        let payload = extract_payload(text)
            .ok_or_else(|| KeyglowError::MalformedPayload("no JSON object found".to_string()))?;
        let result: TheoryResult = serde_json::from_str(payload)
            .map_err(|e| KeyglowError::MalformedPayload(e.to_string()))?;
        result.validated()
    }

    pub fn to_json(&self) -> Result<String, KeyglowError> {
        serde_json::to_string(self).map_err(|e| KeyglowError::Serialization(e.to_string()))
    }

    /// "F# Dominant 7th"
    pub fn title(&self) -> String {
        format!("{} {}", self.root.trim(), self.kind.trim()).trim().to_string()
    }

    fn validated(self) -> Result<Self, KeyglowError> {
        if self.root.trim().is_empty() {
            return Err(KeyglowError::MalformedPayload("root must not be empty".to_string()));
        }
        if self.notes.is_empty() {
            return Err(KeyglowError::MalformedPayload("notes must not be empty".to_string()));
        }

        if let Some(signature) = &self.key_signature {
            if signature.count > 7 {
                return Err(KeyglowError::MalformedPayload(format!(
                    "key signature count {} is above 7",
                    signature.count
                )));
            }
            if signature.accidental == SignatureAccidental::Natural && signature.count != 0 {
                return Err(KeyglowError::MalformedPayload(
                    "a key signature without accidentals must have count 0".to_string(),
                ));
            }
            if !signature.notes.is_empty() && signature.notes.len() != signature.count as usize {
                return Err(KeyglowError::MalformedPayload(format!(
                    "key signature count {} does not match {} altered notes",
                    signature.count,
                    signature.notes.len()
                )));
            }
        }

        if let Some(intervals) = &self.intervals {
            if intervals.len() != self.notes.len() {
                log::warn!(
                    target: "resolver",
                    "{} intervals for {} notes, passing them through as given",
                    intervals.len(),
                    self.notes.len()
                );
            }
        }

        Ok(self)
    }
}

fn extract_payload(text: &str) -> Option<&str> {
    if let Some(open) = text.find("```") {
        let body = &text[open + 3..];
        let body = match body.find("```") {
            Some(close) => &body[..close],
            None => body,
        };
        // The language tag may share a line with the object
        if let Some(object) = brace_span(body) {
            return Some(object);
        }
    }
    brace_span(text)
}

/// Everything from the first `{` to the last `}`
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// The external service turning a free-text request into a TheoryResult
pub trait TheoryResolver {
    fn resolve(&mut self, query: &str) -> Result<TheoryResult, KeyglowError>;
}

/// Lowercase, `#` spelled out, separators and repeated whitespace collapsed
pub fn normalize_query(query: &str) -> String {
    let spelled = query
        .trim()
        .trim_end_matches(".json")
        .to_lowercase()
        .replace(['#', '♯'], " sharp ")
        .replace(['-', '_'], " ");
    spelled.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Answers from a fixed table; used offline and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, TheoryResult>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: &str, result: TheoryResult) {
        self.entries.insert(normalize_query(query), result);
    }

    /// Register a result under its own title ("C Major")
    pub fn insert_result(&mut self, result: TheoryResult) {
        let title = result.title();
        self.insert(&title, result);
    }

    pub fn with_entry(mut self, query: &str, result: TheoryResult) -> Self {
        self.insert(query, result);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TheoryResolver for StaticResolver {
    fn resolve(&mut self, query: &str) -> Result<TheoryResult, KeyglowError> {
        self.entries
            .get(&normalize_query(query))
            .cloned()
            .ok_or_else(|| KeyglowError::Resolver(format!("nothing known about '{}'", query.trim())))
    }
}
