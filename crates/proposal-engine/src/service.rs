//! Cached proposal pipeline.
//!
//! Wires the result cache around the matcher and the ranker:
//! cache hit -> return; miss -> generate -> rank -> store -> return.
//!
//! Concurrent misses for the same key both compute; the last `set` wins.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use proposal_types::{now_millis, CacheSettings, Proposal, ProposalConfig, Subject};

use crate::cache::{CacheStats, ProposalCache};
use crate::error::EngineError;
use crate::matcher::ProposalMatcher;
use crate::ranker::rank;
use crate::store::SubjectStore;

/// Proposal service combining matcher, ranker and result cache.
pub struct ProposalService<S: SubjectStore + ?Sized> {
    matcher: ProposalMatcher<S>,
    cache: ProposalCache,
}

impl<S: SubjectStore + ?Sized> ProposalService<S> {
    /// Create a service with the given cache.
    pub fn new(store: Arc<S>, cache: ProposalCache) -> Self {
        Self {
            matcher: ProposalMatcher::new(store),
            cache,
        }
    }

    /// Create a service with a cache sized from settings.
    pub fn with_cache_settings(store: Arc<S>, settings: &CacheSettings) -> Self {
        Self::new(store, ProposalCache::from_settings(settings))
    }

    /// Get the result cache.
    pub fn cache(&self) -> &ProposalCache {
        &self.cache
    }

    /// Ranked proposals for the current subjects of `topic_id`.
    pub async fn get_proposals(
        &self,
        topic_id: &str,
        current_subject_ids: &[String],
        config: &ProposalConfig,
        all_subjects: Option<&[Subject]>,
    ) -> Result<Vec<Proposal>, EngineError> {
        self.get_proposals_at(
            topic_id,
            current_subject_ids,
            config,
            all_subjects,
            now_millis(),
        )
        .await
    }

    /// Ranked proposals, with cache expiry and recency measured at `now`.
    ///
    /// The configuration is validated before the cache is consulted.
    #[instrument(
        skip(self, current_subject_ids, config, all_subjects),
        fields(current = current_subject_ids.len())
    )]
    pub async fn get_proposals_at(
        &self,
        topic_id: &str,
        current_subject_ids: &[String],
        config: &ProposalConfig,
        all_subjects: Option<&[Subject]>,
        now: i64,
    ) -> Result<Vec<Proposal>, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;

        if let Some(cached) = self.cache.get_at(topic_id, current_subject_ids, now) {
            debug!(count = cached.len(), "Serving proposals from cache");
            return Ok(cached);
        }

        let candidates = self
            .matcher
            .generate_at(topic_id, current_subject_ids, config, all_subjects, now)
            .await?;
        let candidate_count = candidates.len();
        let ranked = rank(candidates, config);

        info!(
            candidates = candidate_count,
            returned = ranked.len(),
            "Computed proposals"
        );

        self.cache
            .set_at(topic_id, current_subject_ids, ranked.clone(), now);
        Ok(ranked)
    }

    /// Drop cached results for a topic, e.g. after its subjects change.
    pub fn invalidate_topic(&self, topic_id: &str) -> usize {
        self.cache.invalidate(topic_id)
    }

    /// Drop all cached results.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use proposal_types::proposal::DAY_MS;
    use proposal_types::Keyword;

    const NOW: i64 = 1_760_000_000_000;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert_keyword(Keyword::new("k1", "rust"));
        store.insert_keyword(Keyword::new("k2", "async"));
        store.insert_subject(Subject::new("a", "chat", ["k1", "k2"]));
        store.insert_subject(Subject::new("b", "chat", ["k1"]));
        store.insert_subject(
            Subject::new("old", "archive", ["k1", "k2"]).with_time_range(NOW - DAY_MS, NOW),
        );
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let store = store();
        let service = ProposalService::new(store.clone(), ProposalCache::default());
        let config = ProposalConfig::default();

        let first = service
            .get_proposals_at("chat", &ids(&["a", "b"]), &config, None, NOW)
            .await
            .unwrap();
        assert_eq!(first.len(), 2);

        // A new subject would change the result if the matcher ran again
        store.insert_subject(Subject::new("new", "elsewhere", ["k1", "k2"]));

        let second = service
            .get_proposals_at("chat", &ids(&["b", "a"]), &config, None, NOW + 10)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(service.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let store = store();
        let service = ProposalService::new(store.clone(), ProposalCache::default());
        let config = ProposalConfig::default();

        service
            .get_proposals_at("chat", &ids(&["a"]), &config, None, NOW)
            .await
            .unwrap();
        store.insert_subject(Subject::new("new", "elsewhere", ["k1", "k2"]));
        assert_eq!(service.invalidate_topic("chat"), 1);

        let refreshed = service
            .get_proposals_at("chat", &ids(&["a"]), &config, None, NOW)
            .await
            .unwrap();
        assert_eq!(refreshed.len(), 2);
    }

    #[tokio::test]
    async fn test_results_ranked_and_bounded() {
        let service = ProposalService::new(store(), ProposalCache::default());
        let config = ProposalConfig {
            max_proposals: 1,
            ..Default::default()
        };
        let proposals = service
            .get_proposals_at("chat", &ids(&["a", "b"]), &config, None, NOW)
            .await
            .unwrap();
        assert_eq!(proposals.len(), 1);
        // Full overlap beats partial overlap
        assert_eq!(proposals[0].matched_keywords, vec!["rust", "async"]);
    }

    #[tokio::test]
    async fn test_invalid_config_not_served_from_cache() {
        let service = ProposalService::new(store(), ProposalCache::default());
        service
            .get_proposals_at("chat", &ids(&["a"]), &ProposalConfig::default(), None, NOW)
            .await
            .unwrap();

        let bad = ProposalConfig {
            min_jaccard: 2.0,
            ..Default::default()
        };
        let result = service
            .get_proposals_at("chat", &ids(&["a"]), &bad, None, NOW)
            .await;
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let service =
            ProposalService::with_cache_settings(store(), &CacheSettings::default());
        service
            .get_proposals_at("chat", &ids(&["a"]), &ProposalConfig::default(), None, NOW)
            .await
            .unwrap();
        assert_eq!(service.cache().size(), 1);
        service.clear_cache();
        assert_eq!(service.cache().size(), 0);
    }
}
