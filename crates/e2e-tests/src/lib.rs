//! End-to-end test infrastructure for the proposal engine.
//!
//! Provides a shared TestHarness that seeds an in-memory store, plus store
//! wrappers that count lookups or simulate outages.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use proposal_engine::{MemoryStore, StoreError, SubjectStore};
use proposal_types::proposal::DAY_MS;
use proposal_types::{Keyword, Subject};

/// Fixed "now" for deterministic recency (2025-10-09T08:53:20Z).
pub const NOW: i64 = 1_760_000_000_000;

/// Shared test harness for E2E tests.
///
/// Every keyword added gets a fresh record id, so two subjects using the same
/// term never share a keyword id.
pub struct TestHarness {
    /// Shared store instance
    pub store: Arc<MemoryStore>,
    next_keyword: AtomicUsize,
}

impl TestHarness {
    /// Create a harness with an empty store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            next_keyword: AtomicUsize::new(0),
        }
    }

    /// Create keyword records for `terms` and return their ids.
    pub fn keywords(&self, terms: &[&str]) -> Vec<String> {
        terms
            .iter()
            .map(|term| {
                let n = self.next_keyword.fetch_add(1, Ordering::Relaxed);
                let id = format!("kw-{n:04}");
                self.store.insert_keyword(Keyword::new(id.clone(), term));
                id
            })
            .collect()
    }

    /// Add a subject created `days_ago` days before [`NOW`].
    pub fn add_subject(&self, topic: &str, id: &str, terms: &[&str], days_ago: i64) -> Subject {
        let created = NOW - days_ago * DAY_MS;
        let subject =
            Subject::new(id, topic, self.keywords(terms)).with_time_range(created, created + 1);
        self.store.insert_subject(subject.clone());
        subject
    }

    /// Add a subject with no activity spans.
    pub fn add_undated_subject(&self, topic: &str, id: &str, terms: &[&str]) -> Subject {
        let subject = Subject::new(id, topic, self.keywords(terms));
        self.store.insert_subject(subject.clone());
        subject
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert string literals to owned ids.
pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Store wrapper counting every lookup.
pub struct CountingStore {
    inner: Arc<MemoryStore>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubjectStore for CountingStore {
    async fn get_subject(
        &self,
        topic_id: &str,
        subject_id: &str,
    ) -> Result<Option<Subject>, StoreError> {
        self.hit();
        self.inner.get_subject(topic_id, subject_id).await
    }

    async fn get_keyword(&self, keyword_id: &str) -> Result<Option<Keyword>, StoreError> {
        self.hit();
        self.inner.get_keyword(keyword_id).await
    }

    async fn list_topics(&self) -> Result<Vec<String>, StoreError> {
        self.hit();
        self.inner.list_topics().await
    }

    async fn list_subjects(&self, topic_id: &str) -> Result<Vec<Subject>, StoreError> {
        self.hit();
        self.inner.list_subjects(topic_id).await
    }
}

/// Which lookups an [`OutageStore`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outage {
    /// Every call fails
    Total,
    /// Subjects resolve, keyword lookups fail
    Keywords,
    /// Lookups work, listing topics fails
    Listing,
}

/// Store wrapper simulating a transport failure.
pub struct OutageStore {
    inner: Arc<MemoryStore>,
    outage: Outage,
}

impl OutageStore {
    pub fn new(inner: Arc<MemoryStore>, outage: Outage) -> Self {
        Self { inner, outage }
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("connection refused".to_string())
    }
}

#[async_trait]
impl SubjectStore for OutageStore {
    async fn get_subject(
        &self,
        topic_id: &str,
        subject_id: &str,
    ) -> Result<Option<Subject>, StoreError> {
        if self.outage == Outage::Total {
            return Err(Self::unavailable());
        }
        self.inner.get_subject(topic_id, subject_id).await
    }

    async fn get_keyword(&self, keyword_id: &str) -> Result<Option<Keyword>, StoreError> {
        if matches!(self.outage, Outage::Total | Outage::Keywords) {
            return Err(Self::unavailable());
        }
        self.inner.get_keyword(keyword_id).await
    }

    async fn list_topics(&self) -> Result<Vec<String>, StoreError> {
        if matches!(self.outage, Outage::Total | Outage::Listing) {
            return Err(Self::unavailable());
        }
        self.inner.list_topics().await
    }

    async fn list_subjects(&self, topic_id: &str) -> Result<Vec<Subject>, StoreError> {
        if self.outage == Outage::Total {
            return Err(Self::unavailable());
        }
        self.inner.list_subjects(topic_id).await
    }
}
