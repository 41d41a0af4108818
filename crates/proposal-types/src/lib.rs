//! # proposal-types
//!
//! Shared domain records for the knowledge-sharing proposal engine.
//!
//! This crate defines the data that flows through the proposal pipeline:
//! - Subjects: topical threads read from the external object store
//! - Keywords: normalized terms referenced by subjects
//! - Proposals: scored links from a past subject to the current conversation
//! - Settings: layered configuration for the engine and the CLI
//!
//! ## Usage
//!
//! ```rust
//! use proposal_types::{Keyword, ProposalConfig};
//!
//! let keyword = Keyword::new("kw-1", "  Rust ");
//! assert_eq!(keyword.term, "rust");
//! assert!(ProposalConfig::default().validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod proposal;
pub mod subject;

pub use config::{CacheSettings, Settings};
pub use error::ProposalError;
pub use proposal::{Proposal, ProposalConfig};
pub use subject::{normalize_term, Keyword, Subject, TimeRange, UNKNOWN_SUBJECT_NAME};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
