//! Knowledge-sharing proposals CLI
//!
//! Suggests subjects from other topics that relate to the current one.
//!
//! # Usage
//!
//! ```bash
//! proposals propose --topic TOPIC [--subject ID]... [--snapshot FILE]
//! proposals topics [--snapshot FILE]
//! proposals score --similarity 0.5 --created-at 1700000000000
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/knowledge-proposals/config.toml)
//! 3. Environment variables (PROPOSALS__*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use proposal_cli::{
    handle_propose, handle_score, handle_topics, init_logging, load_settings, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings.log_level)?;

    match cli.command {
        Commands::Propose(args) => {
            handle_propose(&settings, &args).await?;
        }
        Commands::Topics { snapshot } => {
            handle_topics(&settings, snapshot.as_deref()).await?;
        }
        Commands::Score {
            similarity,
            created_at,
        } => {
            handle_score(&settings, similarity, created_at)?;
        }
    }

    Ok(())
}
