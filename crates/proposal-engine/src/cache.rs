//! Result cache for proposal requests.
//!
//! Maps `(topic, sorted subject ids)` to a ranked proposal list.
//!
//! ## Key Design Principles
//!
//! - **Order-insensitive keys**: subject ids are sorted before lookup
//! - **Lazy expiry**: an entry older than the TTL is dropped by the `get`
//!   that finds it; there is no sweeper
//! - **FIFO under pressure**: inserting a new key into a full cache evicts the
//!   oldest-inserted entry, regardless of how recently it was read
//!
//! ## Thread Safety
//!
//! One `Mutex` guards the LRU map and the counters. Reads use `peek` and
//! overwrites use `peek_mut`, so recency order stays insertion order.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use proposal_types::{now_millis, CacheSettings, Proposal};

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default entry lifetime in milliseconds.
pub const DEFAULT_TTL_MS: i64 = 60_000;

/// Human-readable key for a topic and subject set, used in logs.
///
/// Subject ids are sorted lexicographically so any ordering of the same set
/// yields the same key. Entries are stored under the structured
/// `(topic, ids)` pair, never under this string.
pub fn cache_key(topic_id: &str, subject_ids: &[String]) -> String {
    let mut sorted: Vec<&str> = subject_ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("{}:{}", topic_id, sorted.join(","))
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    topic_id: String,
    /// Sorted
    subject_ids: Vec<String>,
}

impl EntryKey {
    fn new(topic_id: &str, subject_ids: &[String]) -> Self {
        let mut subject_ids = subject_ids.to_vec();
        subject_ids.sort_unstable();
        Self {
            topic_id: topic_id.to_string(),
            subject_ids,
        }
    }
}

struct CacheEntry {
    proposals: Vec<Proposal>,
    inserted_at: i64,
}

struct CacheState {
    entries: LruCache<EntryKey, CacheEntry>,
    stats: CacheStats,
}

/// Bounded, time-expiring proposal cache.
pub struct ProposalCache {
    capacity: usize,
    ttl_ms: i64,
    state: Mutex<CacheState>,
}

impl ProposalCache {
    /// Create a cache holding at most `capacity` entries for `ttl_ms` each.
    ///
    /// A capacity of 0 gives a cache that stores nothing.
    pub fn new(capacity: usize, ttl_ms: i64) -> Self {
        let bound = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            capacity,
            ttl_ms,
            state: Mutex::new(CacheState {
                entries: LruCache::new(bound),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Create a cache from loaded settings.
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.capacity, settings.ttl_ms)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Look up cached proposals; `None` on a miss.
    pub fn get(&self, topic_id: &str, subject_ids: &[String]) -> Option<Vec<Proposal>> {
        self.get_at(topic_id, subject_ids, now_millis())
    }

    /// Look up cached proposals as of `now` (epoch ms).
    ///
    /// An entry older than the TTL is evicted and reported as a miss.
    pub fn get_at(&self, topic_id: &str, subject_ids: &[String], now: i64) -> Option<Vec<Proposal>> {
        let key = EntryKey::new(topic_id, subject_ids);
        let mut guard = self.lock();
        let state = &mut *guard;

        let Some(inserted_at) = state.entries.peek(&key).map(|e| e.inserted_at) else {
            state.stats.misses += 1;
            return None;
        };

        if now - inserted_at > self.ttl_ms {
            state.entries.pop(&key);
            state.stats.expirations += 1;
            state.stats.misses += 1;
            debug!(key = %cache_key(topic_id, subject_ids), "Cache entry expired");
            return None;
        }

        state.stats.hits += 1;
        state.entries.peek(&key).map(|e| e.proposals.clone())
    }

    /// Store proposals for a topic and subject set.
    pub fn set(&self, topic_id: &str, subject_ids: &[String], proposals: Vec<Proposal>) {
        self.set_at(topic_id, subject_ids, proposals, now_millis());
    }

    /// Store proposals as of `now` (epoch ms).
    ///
    /// Replacing an existing key refreshes its timestamp but keeps its place
    /// in the eviction order.
    pub fn set_at(
        &self,
        topic_id: &str,
        subject_ids: &[String],
        proposals: Vec<Proposal>,
        now: i64,
    ) {
        if self.capacity == 0 {
            return;
        }

        let key = EntryKey::new(topic_id, subject_ids);
        let mut guard = self.lock();
        let state = &mut *guard;

        if let Some(entry) = state.entries.peek_mut(&key) {
            entry.proposals = proposals;
            entry.inserted_at = now;
            return;
        }

        let entry = CacheEntry {
            proposals,
            inserted_at: now,
        };
        if let Some((evicted, _)) = state.entries.push(key, entry) {
            state.stats.evictions += 1;
            debug!(
                key = %cache_key(&evicted.topic_id, &evicted.subject_ids),
                "Evicted oldest cache entry"
            );
        }
    }

    /// Drop every entry built for `topic_id`, whatever its subject set.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, topic_id: &str) -> usize {
        let mut state = self.lock();
        let stale: Vec<EntryKey> = state
            .entries
            .iter()
            .filter(|(key, _)| key.topic_id == topic_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            state.entries.pop(key);
        }
        debug!(topic_id = %topic_id, removed = stale.len(), "Invalidated cache entries");
        stale.len()
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Entries currently held, expired or not. Does not prune.
    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProposalCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL_MS)
    }
}
