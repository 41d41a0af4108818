//! Subject and keyword records owned by the external object store.
//!
//! These are read-only inputs to the proposal pipeline. Required fields are
//! not defaulted: a record missing `id`, `topic` or `keywords` fails to
//! deserialize and is treated as unresolved by the caller.

use serde::{Deserialize, Serialize};

/// Label used for a past subject that has neither an id nor a description.
pub const UNKNOWN_SUBJECT_NAME: &str = "Unknown subject";

/// Normalize a keyword term (trimmed, lowercased).
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// A normalized term referenced by one or more subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    /// Opaque store identifier
    pub id: String,
    /// Normalized term
    pub term: String,
}

impl Keyword {
    /// Create a keyword, normalizing the term.
    pub fn new(id: impl Into<String>, term: &str) -> Self {
        Self {
            id: id.into(),
            term: normalize_term(term),
        }
    }
}

/// A span of activity on a subject, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// A topical thread inside a topic (conversation container).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Stable identifier, unique within its topic
    pub id: String,
    /// Topic this subject belongs to
    pub topic: String,
    /// Keyword identifiers, in extraction order
    pub keywords: Vec<String>,
    /// Activity spans; the first entry's start is the creation time
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl Subject {
    /// Create a subject with no activity spans.
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            time_ranges: Vec::new(),
            message_count: 0,
            confidence: None,
            description: None,
            archived: false,
        }
    }

    /// Builder-style helper to attach an activity span.
    pub fn with_time_range(mut self, start: i64, end: i64) -> Self {
        self.time_ranges.push(TimeRange::new(start, end));
        self
    }

    /// Builder-style helper to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Creation time: the start of the first activity span, or 0 when undated.
    ///
    /// Later spans are ignored even if they carry more recent activity.
    pub fn created_at(&self) -> i64 {
        self.time_ranges.first().map(|r| r.start).unwrap_or(0)
    }

    /// Human-readable label: id, then description, then a placeholder.
    pub fn display_name(&self) -> String {
        if !self.id.trim().is_empty() {
            return self.id.clone();
        }
        match self.description.as_deref().map(str::trim) {
            Some(desc) if !desc.is_empty() => desc.to_string(),
            _ => UNKNOWN_SUBJECT_NAME.to_string(),
        }
    }
}
