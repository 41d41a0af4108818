//! Proposals CLI library exports.
//!
//! This crate provides the `proposals` binary for the knowledge-sharing
//! proposal engine.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (propose, topics, score)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ProposeArgs};
pub use commands::{
    handle_propose, handle_score, handle_topics, init_logging, load_settings, run_propose,
    run_score, run_topics, TopicSummary,
};
