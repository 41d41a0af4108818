//! CLI argument parsing for the proposals tool.
//!
//! CLI flags override every other config source.

use clap::{Args, Parser, Subcommand};

/// Knowledge-sharing proposals
///
/// Finds subjects discussed in other topics that relate to the current one.
#[derive(Parser, Debug)]
#[command(name = "proposals")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/knowledge-proposals/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Propose related subjects from other topics
    Propose(ProposeArgs),

    /// List topics in the store snapshot
    Topics {
        /// Store snapshot (JSON); overrides snapshot_path from config
        #[arg(short, long)]
        snapshot: Option<String>,
    },

    /// Compute a relevance score with the configured weights
    Score {
        /// Keyword similarity in [0, 1]
        #[arg(long)]
        similarity: f64,

        /// Creation time of the past subject (Unix ms)
        #[arg(long)]
        created_at: i64,
    },
}

/// Arguments for `propose`
#[derive(Args, Debug, Clone)]
pub struct ProposeArgs {
    /// Topic being viewed
    #[arg(short, long)]
    pub topic: String,

    /// Current subject id (repeatable); defaults to every subject in the topic
    #[arg(short, long = "subject")]
    pub subjects: Vec<String>,

    /// Store snapshot (JSON); overrides snapshot_path from config
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Override max_proposals
    #[arg(short, long)]
    pub max: Option<usize>,

    /// Override min_jaccard
    #[arg(long)]
    pub min_jaccard: Option<f64>,

    /// Drop archived subjects from the candidates
    #[arg(long)]
    pub exclude_archived: bool,

    /// Keep only the best proposal per past subject
    #[arg(long)]
    pub dedupe: bool,
}
