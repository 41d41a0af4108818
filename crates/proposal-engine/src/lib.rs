//! # proposal-engine
//!
//! Knowledge-sharing proposals for an active conversation.
//!
//! Given the subjects active in a topic, the engine finds subjects discussed
//! in other topics that share keywords with them, scores each link by keyword
//! overlap and recency, ranks the links and caches the result per
//! (topic, subject set).
//!
//! ## Pipeline
//!
//! ```text
//! ProposalService::get_proposals
//!      │
//!      ▼
//! ProposalCache::get ── hit ──────────────────────────► proposals
//!      │ miss
//!      ▼
//! ProposalMatcher::generate  (SubjectStore lookups)
//!      │
//!      ▼
//! ranker::rank  (sort by relevance, truncate)
//!      │
//!      ▼
//! ProposalCache::set ─────────────────────────────────► proposals
//! ```
//!
//! ## Features
//! - Jaccard similarity over normalized keyword terms
//! - Linear recency boost over a configurable window
//! - Bounded result cache with lazy TTL expiry and FIFO eviction
//! - Store access through the `SubjectStore` trait, with an in-memory
//!   implementation that loads JSON snapshots

pub mod cache;
pub mod content;
pub mod error;
pub mod matcher;
pub mod ranker;
pub mod scoring;
pub mod service;
pub mod similarity;
pub mod store;

pub use cache::{cache_key, CacheStats, ProposalCache};
pub use content::content_id;
pub use error::{EngineError, StoreError};
pub use matcher::{MatcherStats, ProposalMatcher};
pub use ranker::{dedupe_by_past_subject, rank};
pub use scoring::{recency_boost, recency_boost_at, relevance_score};
pub use service::ProposalService;
pub use similarity::{jaccard, matched_terms, term_list};
pub use store::{MemoryStore, StoreSnapshot, SubjectStore};
