//! Access to the external object store.
//!
//! The engine only reads subjects and keywords. `SubjectStore` is the seam
//! between the engine and whatever persists them; `MemoryStore` is an
//! in-process implementation that backs the CLI and the tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use proposal_types::{Keyword, Subject};

use crate::error::StoreError;

/// Read access to subjects and keywords.
///
/// Lookups return `Ok(None)` when an identifier does not resolve and
/// `Err` only when the store itself fails.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// Resolve a subject within a topic.
    async fn get_subject(
        &self,
        topic_id: &str,
        subject_id: &str,
    ) -> Result<Option<Subject>, StoreError>;

    /// Resolve a keyword record.
    async fn get_keyword(&self, keyword_id: &str) -> Result<Option<Keyword>, StoreError>;

    /// Enumerate topic identifiers.
    async fn list_topics(&self) -> Result<Vec<String>, StoreError>;

    /// All subjects recorded in one topic.
    async fn list_subjects(&self, topic_id: &str) -> Result<Vec<Subject>, StoreError>;

    /// Snapshot of every subject across every topic.
    ///
    /// Topics are scanned concurrently; any failure fails the whole scan.
    async fn list_all_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let topics = self.list_topics().await?;
        let batches =
            futures::future::try_join_all(topics.iter().map(|t| self.list_subjects(t))).await?;
        Ok(batches.into_iter().flatten().collect())
    }
}

/// JSON snapshot of a store: `{ "keywords": [...], "subjects": [...] }`.
///
/// Records are kept as raw JSON so a malformed entry can be skipped on its
/// own without rejecting the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub keywords: Vec<serde_json::Value>,
    #[serde(default)]
    pub subjects: Vec<serde_json::Value>,
}

impl StoreSnapshot {
    /// Build a snapshot from typed records.
    pub fn from_records(keywords: &[Keyword], subjects: &[Subject]) -> Result<Self, StoreError> {
        Ok(Self {
            keywords: keywords
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            subjects: subjects
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Default)]
struct MemoryState {
    /// (topic, subject id) -> subject
    subjects: BTreeMap<(String, String), Subject>,
    keywords: HashMap<String, Keyword>,
}

/// In-memory store.
///
/// ## Thread Safety
///
/// A single `RwLock` guards both maps; lookups take the read lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a subject.
    pub fn insert_subject(&self, subject: Subject) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .subjects
            .insert((subject.topic.clone(), subject.id.clone()), subject);
    }

    /// Insert or replace a keyword.
    pub fn insert_keyword(&self, keyword: Keyword) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.keywords.insert(keyword.id.clone(), keyword);
    }

    /// Number of subjects held.
    pub fn subject_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subjects
            .len()
    }

    /// Number of keywords held.
    pub fn keyword_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keywords
            .len()
    }

    /// Populate a store from a snapshot, skipping malformed records.
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        let store = Self::new();
        let mut skipped = 0usize;

        for (index, value) in snapshot.keywords.iter().enumerate() {
            match serde_json::from_value::<Keyword>(value.clone()) {
                Ok(keyword) => store.insert_keyword(Keyword::new(keyword.id, &keyword.term)),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed keyword record");
                    skipped += 1;
                }
            }
        }

        for (index, value) in snapshot.subjects.iter().enumerate() {
            match serde_json::from_value::<Subject>(value.clone()) {
                Ok(subject) => store.insert_subject(subject),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed subject record");
                    skipped += 1;
                }
            }
        }

        info!(
            subjects = store.subject_count(),
            keywords = store.keyword_count(),
            skipped,
            "Loaded store snapshot"
        );
        store
    }

    /// Load a JSON snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = ?path, "Reading store snapshot");
        let bytes = std::fs::read(path)?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Self::from_snapshot(&snapshot))
    }
}

#[async_trait]
impl SubjectStore for MemoryStore {
    async fn get_subject(
        &self,
        topic_id: &str,
        subject_id: &str,
    ) -> Result<Option<Subject>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .subjects
            .get(&(topic_id.to_string(), subject_id.to_string()))
            .cloned())
    }

    async fn get_keyword(&self, keyword_id: &str) -> Result<Option<Keyword>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.keywords.get(keyword_id).cloned())
    }

    async fn list_topics(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let topics: BTreeSet<&String> = state.subjects.keys().map(|(topic, _)| topic).collect();
        Ok(topics.into_iter().cloned().collect())
    }

    async fn list_subjects(&self, topic_id: &str) -> Result<Vec<Subject>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .subjects
            .values()
            .filter(|s| s.topic == topic_id)
            .cloned()
            .collect())
    }
}
