//! End-to-end proposal pipeline tests.
//!
//! Store -> matcher -> ranker -> cache, driven through `ProposalService`
//! with a fixed clock.

use pretty_assertions::assert_eq;

use e2e_tests::{ids, TestHarness, NOW};
use proposal_engine::{
    rank, recency_boost_at, relevance_score, ProposalCache, ProposalMatcher, ProposalService,
};
use proposal_types::proposal::DAY_MS;
use proposal_types::ProposalConfig;

fn config(min_jaccard: f64) -> ProposalConfig {
    ProposalConfig {
        match_weight: 1.0,
        recency_weight: 0.5,
        recency_window_ms: 30 * DAY_MS,
        min_jaccard,
        max_proposals: 10,
        ..Default::default()
    }
}

/// {rust, concurrency} vs {rust, memory}: Jaccard 1/3 passes 0.3, fails 0.5.
#[tokio::test]
async fn test_threshold_scenario() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "threads", &["rust", "concurrency"], 0);
    harness.add_subject("archive", "ownership", &["Rust", "memory"], 10);

    let matcher = ProposalMatcher::new(harness.store.clone());

    let included = matcher
        .generate_at("chat", &ids(&["threads"]), &config(0.3), None, NOW)
        .await
        .unwrap();
    assert_eq!(included.len(), 1);
    assert_eq!(included[0].matched_keywords, vec!["rust".to_string()]);
    assert_eq!(included[0].source_topic_id, "archive");
    assert_eq!(included[0].past_subject_name, "ownership");

    let excluded = matcher
        .generate_at("chat", &ids(&["threads"]), &config(0.5), None, NOW)
        .await
        .unwrap();
    assert!(excluded.is_empty());
}

/// Candidate 10 days old in a 30-day window: boost 2/3, score 0.5 + 2/3 * 0.5.
#[tokio::test]
async fn test_score_scenario() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "current", &["a", "b"], 0);
    harness.add_subject("other", "past", &["a", "b", "c", "d"], 10);

    let matcher = ProposalMatcher::new(harness.store.clone());
    let proposals = matcher
        .generate_at("chat", &ids(&["current"]), &config(0.0), None, NOW)
        .await
        .unwrap();
    assert_eq!(proposals.len(), 1);

    let boost = recency_boost_at(NOW - 10 * DAY_MS, 30 * DAY_MS, NOW);
    assert!((boost - 0.6667).abs() < 0.001);

    let expected = relevance_score(0.5, boost, &config(0.0));
    assert_eq!(proposals[0].relevance_score, expected);
    assert!((proposals[0].relevance_score - 0.8333).abs() < 0.001);
}

/// 60 candidates, max 10: exactly the ten best survive.
#[tokio::test]
async fn test_sixty_candidates_truncated_to_ten() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "current", &["rust", "tokio"], 0);
    for i in 0..60 {
        // Same similarity; age decides the order
        harness.add_subject(&format!("topic-{i:02}"), "past", &["rust", "tokio"], i);
    }

    let service = ProposalService::new(harness.store.clone(), ProposalCache::default());
    let proposals = service
        .get_proposals_at("chat", &ids(&["current"]), &config(0.2), None, NOW)
        .await
        .unwrap();

    assert_eq!(proposals.len(), 10);
    let topics: Vec<&str> = proposals.iter().map(|p| p.source_topic_id.as_str()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("topic-{i:02}")).collect();
    assert_eq!(topics, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

/// Ranked output equals matcher output ranked separately.
#[tokio::test]
async fn test_service_matches_manual_pipeline() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "s1", &["rust", "async", "tokio"], 0);
    harness.add_subject("chat", "s2", &["serde", "json"], 0);
    harness.add_subject("forum", "p1", &["rust", "async"], 3);
    harness.add_subject("forum", "p2", &["json", "yaml"], 20);
    harness.add_subject("blog", "p3", &["tokio", "rust", "async", "mio"], 40);
    harness.add_undated_subject("blog", "p4", &["serde", "json"]);

    let cfg = config(0.1);
    let matcher = ProposalMatcher::new(harness.store.clone());
    let raw = matcher
        .generate_at("chat", &ids(&["s1", "s2"]), &cfg, None, NOW)
        .await
        .unwrap();
    let manual: Vec<(String, f64)> = rank(raw, &cfg)
        .into_iter()
        .map(|p| (p.past_subject, p.relevance_score))
        .collect();

    let service = ProposalService::new(harness.store.clone(), ProposalCache::default());
    let via_service: Vec<(String, f64)> = service
        .get_proposals_at("chat", &ids(&["s1", "s2"]), &cfg, None, NOW)
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.past_subject, p.relevance_score))
        .collect();

    assert_eq!(manual, via_service);
    assert_eq!(via_service.len(), 4);
}

/// Subjects in the requesting topic are never proposed back to it.
#[tokio::test]
async fn test_same_topic_excluded() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "current", &["rust"], 0);
    harness.add_subject("chat", "twin", &["rust"], 0);
    harness.add_subject("forum", "cousin", &["rust"], 0);

    let service = ProposalService::new(harness.store.clone(), ProposalCache::default());
    let proposals = service
        .get_proposals_at("chat", &ids(&["current"]), &config(0.0), None, NOW)
        .await
        .unwrap();

    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].past_subject_name, "cousin");
    assert!(proposals.iter().all(|p| p.source_topic_id != "chat"));
}

/// A pre-fetched snapshot replaces the store scan.
#[tokio::test]
async fn test_prefetched_snapshot_limits_candidates() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "current", &["rust"], 0);
    let kept = harness.add_subject("forum", "kept", &["rust"], 1);
    harness.add_subject("forum", "hidden", &["rust"], 1);

    let snapshot = vec![kept];
    let matcher = ProposalMatcher::new(harness.store.clone());
    let proposals = matcher
        .generate_at("chat", &ids(&["current"]), &config(0.0), Some(&snapshot), NOW)
        .await
        .unwrap();

    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].past_subject_name, "kept");
}

/// No current subjects, or nothing above the floor, is an empty success.
#[tokio::test]
async fn test_empty_outcomes_are_ok() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "current", &["rust"], 0);
    harness.add_subject("forum", "unrelated", &["gardening"], 0);

    let service = ProposalService::new(harness.store.clone(), ProposalCache::default());

    let none = service
        .get_proposals_at("chat", &[], &config(0.0), None, NOW)
        .await
        .unwrap();
    assert!(none.is_empty());

    let unrelated = service
        .get_proposals_at("chat", &ids(&["current"]), &config(0.1), None, NOW)
        .await
        .unwrap();
    assert!(unrelated.is_empty());
}

/// A zero floor keeps disjoint pairs; only recency contributes to their score.
#[tokio::test]
async fn test_zero_floor_keeps_disjoint_pairs() {
    let harness = TestHarness::new();
    harness.add_subject("chat", "current", &["rust"], 0);
    harness.add_subject("forum", "unrelated", &["gardening"], 0);
    harness.add_undated_subject("forum", "silent", &[]);

    let matcher = ProposalMatcher::new(harness.store.clone());
    let proposals = matcher
        .generate_at("chat", &ids(&["current"]), &config(0.0), None, NOW)
        .await
        .unwrap();

    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].past_subject_name, "unrelated");
    assert!(proposals[0].matched_keywords.is_empty());
    assert_eq!(proposals[0].relevance_score, relevance_score(0.0, 1.0, &config(0.0)));
}
