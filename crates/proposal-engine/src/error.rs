//! Engine error types.

use thiserror::Error;

/// Failures of the external object store itself.
///
/// An identifier that simply does not resolve is not an error; stores
/// report that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store unreachable or refused the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that abort a proposal request.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The store failed; no proposals could be computed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
