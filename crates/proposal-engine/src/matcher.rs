//! Candidate generation.
//!
//! For every subject active in the current topic, the matcher compares its
//! keyword terms with every subject recorded in other topics and emits a
//! proposal for each pair whose Jaccard similarity reaches the configured
//! floor. Output is unranked and unbounded; see `ranker::rank`.
//!
//! Identifiers that do not resolve are skipped. Store failures abort the
//! request.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use proposal_types::{now_millis, Proposal, ProposalConfig, Subject};

use crate::content::content_id;
use crate::error::{EngineError, StoreError};
use crate::scoring::{recency_boost_at, relevance_score};
use crate::similarity::{jaccard, matched_terms};
use crate::store::SubjectStore;

/// Counters for one `generate` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatcherStats {
    /// Current subject identifiers that resolved
    pub current_resolved: usize,
    /// Candidates from other topics
    pub candidates: usize,
    /// (current, candidate) pairs compared
    pub pairs_compared: usize,
    /// Pairs discarded by the similarity floor
    pub below_threshold: usize,
    /// Proposals emitted
    pub emitted: usize,
}

/// A subject with its terms and content identifier resolved once per request.
struct PreparedSubject<'a> {
    subject: &'a Subject,
    terms: Vec<String>,
    term_set: HashSet<String>,
    content_id: String,
}

/// Request-scoped keyword term lookups.
struct TermResolver<'s, S: SubjectStore + ?Sized> {
    store: &'s S,
    terms: HashMap<String, Option<String>>,
}

impl<'s, S: SubjectStore + ?Sized> TermResolver<'s, S> {
    fn new(store: &'s S) -> Self {
        Self {
            store,
            terms: HashMap::new(),
        }
    }

    /// Resolve a subject's keyword ids to normalized terms, deduplicated in
    /// keyword order. Unresolved ids are skipped.
    async fn resolve_terms(&mut self, subject: &Subject) -> Result<Vec<String>, StoreError> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(subject.keywords.len());

        for keyword_id in &subject.keywords {
            let term = match self.terms.get(keyword_id) {
                Some(cached) => cached.clone(),
                None => {
                    let resolved = self
                        .store
                        .get_keyword(keyword_id)
                        .await?
                        .map(|k| proposal_types::normalize_term(&k.term))
                        .filter(|t| !t.is_empty());
                    if resolved.is_none() {
                        debug!(
                            keyword_id = %keyword_id,
                            subject_id = %subject.id,
                            "Keyword did not resolve, skipping"
                        );
                    }
                    self.terms.insert(keyword_id.clone(), resolved.clone());
                    resolved
                }
            };

            if let Some(term) = term {
                if seen.insert(term.clone()) {
                    out.push(term);
                }
            }
        }

        Ok(out)
    }

    async fn prepare<'a>(
        &mut self,
        subject: &'a Subject,
    ) -> Result<PreparedSubject<'a>, StoreError> {
        let terms = self.resolve_terms(subject).await?;
        let term_set = terms.iter().cloned().collect();
        Ok(PreparedSubject {
            subject,
            terms,
            term_set,
            content_id: content_id(subject),
        })
    }
}

/// Generates candidate proposals from keyword overlap.
pub struct ProposalMatcher<S: SubjectStore + ?Sized> {
    store: Arc<S>,
}

impl<S: SubjectStore + ?Sized> ProposalMatcher<S> {
    /// Create a matcher reading from `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Generate proposals for `topic_id`, measuring recency against the wall clock.
    ///
    /// `all_subjects` is an optional pre-fetched snapshot of every subject;
    /// without it the matcher scans the store.
    pub async fn generate(
        &self,
        topic_id: &str,
        current_subject_ids: &[String],
        config: &ProposalConfig,
        all_subjects: Option<&[Subject]>,
    ) -> Result<Vec<Proposal>, EngineError> {
        self.generate_at(
            topic_id,
            current_subject_ids,
            config,
            all_subjects,
            now_millis(),
        )
        .await
    }

    /// Generate proposals, measuring recency at `now` (epoch ms).
    #[instrument(
        skip(self, current_subject_ids, config, all_subjects),
        fields(current = current_subject_ids.len())
    )]
    pub async fn generate_at(
        &self,
        topic_id: &str,
        current_subject_ids: &[String],
        config: &ProposalConfig,
        all_subjects: Option<&[Subject]>,
        now: i64,
    ) -> Result<Vec<Proposal>, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;

        if current_subject_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stats = MatcherStats::default();

        let mut requested = HashSet::new();
        let mut current_subjects = Vec::with_capacity(current_subject_ids.len());
        for subject_id in current_subject_ids {
            if !requested.insert(subject_id.as_str()) {
                continue;
            }
            match self.store.get_subject(topic_id, subject_id).await? {
                Some(subject) => current_subjects.push(subject),
                None => warn!(subject_id = %subject_id, "Current subject did not resolve, skipping"),
            }
        }
        stats.current_resolved = current_subjects.len();

        if current_subjects.is_empty() {
            debug!("No current subjects resolved");
            return Ok(Vec::new());
        }

        let fetched;
        let snapshot: &[Subject] = match all_subjects {
            Some(subjects) => subjects,
            None => {
                fetched = self.store.list_all_subjects().await?;
                &fetched
            }
        };

        let mut resolver = TermResolver::new(self.store.as_ref());

        let mut current = Vec::with_capacity(current_subjects.len());
        for subject in &current_subjects {
            current.push(resolver.prepare(subject).await?);
        }

        let mut candidates = Vec::new();
        for subject in snapshot.iter().filter(|s| s.topic != topic_id) {
            candidates.push(resolver.prepare(subject).await?);
        }
        stats.candidates = candidates.len();

        let mut proposals = Vec::new();
        for cur in &current {
            for candidate in &candidates {
                stats.pairs_compared += 1;
                if let Some(proposal) = match_pair(cur, candidate, config, now) {
                    proposals.push(proposal);
                } else {
                    stats.below_threshold += 1;
                }
            }
        }
        stats.emitted = proposals.len();

        debug!(?stats, "Generated candidate proposals");
        Ok(proposals)
    }
}

/// Score one (current, candidate) pair; `None` when it does not qualify.
///
/// A subject without terms never qualifies, whatever the floor.
fn match_pair(
    current: &PreparedSubject<'_>,
    candidate: &PreparedSubject<'_>,
    config: &ProposalConfig,
    now: i64,
) -> Option<Proposal> {
    if current.term_set.is_empty() || candidate.term_set.is_empty() {
        return None;
    }
    let similarity = jaccard(&current.term_set, &candidate.term_set);
    if similarity < config.min_jaccard {
        return None;
    }

    let created_at = candidate.subject.created_at();
    let boost = recency_boost_at(created_at, config.recency_window_ms, now);

    Some(Proposal {
        id: Proposal::new_id(),
        past_subject: candidate.content_id.clone(),
        current_subject: current.content_id.clone(),
        matched_keywords: matched_terms(&current.terms, &candidate.term_set),
        relevance_score: relevance_score(similarity, boost, config),
        source_topic_id: candidate.subject.topic.clone(),
        past_subject_name: candidate.subject.display_name(),
        created_at,
    })
}
