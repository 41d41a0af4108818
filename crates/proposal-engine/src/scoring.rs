//! Relevance scoring for proposals.
//!
//! The matcher and the ranker helpers share these functions so a recomputed
//! score is bit-for-bit the one the matcher emitted.
//!
//! - `recency_boost = clamp(1 - age / window, 0, 1)` (linear decay)
//! - `relevance = similarity * match_weight + recency_boost * recency_weight`

use proposal_types::{now_millis, ProposalConfig};

/// Combine similarity and recency boost into a relevance score.
///
/// # Example
/// ```
/// use proposal_engine::scoring::relevance_score;
/// use proposal_types::ProposalConfig;
///
/// let config = ProposalConfig {
///     match_weight: 1.0,
///     recency_weight: 0.5,
///     ..Default::default()
/// };
/// let score = relevance_score(0.5, 2.0 / 3.0, &config);
/// assert!((score - 0.8333).abs() < 0.001);
/// ```
pub fn relevance_score(similarity: f64, recency_boost: f64, config: &ProposalConfig) -> f64 {
    similarity * config.match_weight + recency_boost * config.recency_weight
}

/// Recency boost of a subject created at `created_at`, measured now.
pub fn recency_boost(created_at: i64, recency_window_ms: i64) -> f64 {
    recency_boost_at(created_at, recency_window_ms, now_millis())
}

/// Recency boost of a subject created at `created_at`, measured at `now`.
///
/// Decays linearly from 1.0 at creation to 0.0 once `recency_window_ms` has
/// elapsed. Undated subjects (`created_at == 0`) are as old as the epoch.
/// A non-positive window yields 0.0.
pub fn recency_boost_at(created_at: i64, recency_window_ms: i64, now: i64) -> f64 {
    if recency_window_ms <= 0 {
        return 0.0;
    }
    let age = now.saturating_sub(created_at) as f64;
    (1.0 - age / recency_window_ms as f64).clamp(0.0, 1.0)
}
