//! Proposal records and the per-request scoring configuration.

use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;

/// A scored link from a past subject in another topic to a current subject.
///
/// Proposals are value objects built fresh for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Unique token (ULID)
    pub id: String,
    /// Content identifier of the past subject
    pub past_subject: String,
    /// Content identifier of the current subject
    pub current_subject: String,
    /// Shared terms, ordered by first appearance in the current subject
    pub matched_keywords: Vec<String>,
    /// Combined similarity and recency score
    pub relevance_score: f64,
    /// Topic the past subject belongs to
    pub source_topic_id: String,
    /// Human-readable label of the past subject
    pub past_subject_name: String,
    /// Creation time of the past subject (epoch ms, 0 when undated)
    pub created_at: i64,
}

impl Proposal {
    /// Generate a fresh proposal identifier.
    pub fn new_id() -> String {
        ulid::Ulid::new().to_string()
    }
}

/// Caller-supplied scoring configuration, immutable for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalConfig {
    /// Weight applied to keyword similarity
    #[serde(default = "default_match_weight")]
    pub match_weight: f64,

    /// Weight applied to the recency boost
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    /// Decay horizon for the recency boost, in milliseconds
    #[serde(default = "default_recency_window_ms")]
    pub recency_window_ms: i64,

    /// Similarity floor in [0, 1]
    #[serde(default = "default_min_jaccard")]
    pub min_jaccard: f64,

    /// Maximum proposals returned per request
    #[serde(default = "default_max_proposals")]
    pub max_proposals: usize,

    /// Informational passthrough
    #[serde(default)]
    pub user_email: Option<String>,

    /// Informational passthrough (epoch ms)
    #[serde(default)]
    pub updated_at: Option<i64>,
}

fn default_match_weight() -> f64 {
    0.7
}

fn default_recency_weight() -> f64 {
    0.3
}

fn default_recency_window_ms() -> i64 {
    30 * DAY_MS
}

fn default_min_jaccard() -> f64 {
    0.2
}

fn default_max_proposals() -> usize {
    10
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            match_weight: default_match_weight(),
            recency_weight: default_recency_weight(),
            recency_window_ms: default_recency_window_ms(),
            min_jaccard: default_min_jaccard(),
            max_proposals: default_max_proposals(),
            user_email: None,
            updated_at: None,
        }
    }
}

impl ProposalConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("match_weight", self.match_weight),
            ("recency_weight", self.recency_weight),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
            if value < 0.0 {
                return Err(format!("{name} must be >= 0, got {value}"));
            }
        }
        if !self.min_jaccard.is_finite() || !(0.0..=1.0).contains(&self.min_jaccard) {
            return Err(format!(
                "min_jaccard must be 0.0-1.0, got {}",
                self.min_jaccard
            ));
        }
        if self.recency_window_ms <= 0 {
            return Err(format!(
                "recency_window_ms must be > 0, got {}",
                self.recency_window_ms
            ));
        }
        Ok(())
    }
}
