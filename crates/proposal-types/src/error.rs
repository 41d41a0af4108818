//! Error types shared across the proposal crates.

use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ProposalError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
