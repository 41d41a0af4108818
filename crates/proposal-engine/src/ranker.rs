//! Proposal ranking.
//!
//! Pure sort-and-slice over matcher output. The scoring helpers are
//! re-exported here so a score can be recomputed without running a match.

use std::collections::HashSet;

use proposal_types::{Proposal, ProposalConfig};

pub use crate::scoring::{recency_boost, recency_boost_at, relevance_score};

/// Sort by relevance (descending) and keep the first `max_proposals`.
///
/// The sort is stable: equal scores keep matcher emission order.
pub fn rank(mut proposals: Vec<Proposal>, config: &ProposalConfig) -> Vec<Proposal> {
    if config.max_proposals == 0 || proposals.is_empty() {
        return Vec::new();
    }

    proposals.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    proposals.truncate(config.max_proposals);
    proposals
}

/// Keep only the first proposal for each past subject.
///
/// Run after `rank` to keep the best-scoring link per past subject.
pub fn dedupe_by_past_subject(proposals: Vec<Proposal>) -> Vec<Proposal> {
    let mut seen = HashSet::new();
    proposals
        .into_iter()
        .filter(|p| seen.insert(p.past_subject.clone()))
        .collect()
}
