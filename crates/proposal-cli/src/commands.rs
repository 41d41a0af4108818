//! Command implementations for the proposals tool.
//!
//! Handles:
//! - propose: Load settings and snapshot, run the cached pipeline, print JSON
//! - topics: List topics and their subject counts
//! - score: Recompute a relevance score under the loaded weights

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use proposal_engine::{
    dedupe_by_past_subject, recency_boost, relevance_score, MemoryStore, ProposalService,
    SubjectStore,
};
use proposal_types::{Proposal, Settings};

use crate::cli::ProposeArgs;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so stdout
/// stays machine-readable.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Load settings and apply the global CLI overrides.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

fn open_store(settings: &Settings, snapshot_override: Option<&str>) -> Result<Arc<MemoryStore>> {
    let path = snapshot_override
        .or(settings.snapshot_path.as_deref())
        .ok_or_else(|| anyhow!("No store snapshot given (use --snapshot or snapshot_path)"))?;
    let store = MemoryStore::load(path)
        .with_context(|| format!("Failed to load store snapshot {path}"))?;
    Ok(Arc::new(store))
}

/// Compute ranked proposals for `args`.
pub async fn run_propose(settings: &Settings, args: &ProposeArgs) -> Result<Vec<Proposal>> {
    let mut config = settings.proposals.clone();
    if let Some(max) = args.max {
        config.max_proposals = max;
    }
    if let Some(min_jaccard) = args.min_jaccard {
        config.min_jaccard = min_jaccard;
    }

    let store = open_store(settings, args.snapshot.as_deref())?;

    let current_ids: Vec<String> = if args.subjects.is_empty() {
        store
            .list_subjects(&args.topic)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect()
    } else {
        args.subjects.clone()
    };
    debug!(topic = %args.topic, current = current_ids.len(), "Resolved current subjects");

    let mut all_subjects = store.list_all_subjects().await?;
    if args.exclude_archived || !settings.include_archived {
        all_subjects.retain(|s| !s.archived);
    }

    let service = ProposalService::with_cache_settings(store, &settings.cache);
    let mut proposals = service
        .get_proposals(&args.topic, &current_ids, &config, Some(&all_subjects))
        .await?;

    if args.dedupe {
        proposals = dedupe_by_past_subject(proposals);
    }

    info!(topic = %args.topic, count = proposals.len(), "Proposals ready");
    Ok(proposals)
}

/// Print proposals for a topic as pretty JSON.
pub async fn handle_propose(settings: &Settings, args: &ProposeArgs) -> Result<()> {
    let proposals = run_propose(settings, args).await?;
    println!("{}", serde_json::to_string_pretty(&proposals)?);
    Ok(())
}

/// One row of `topics` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    pub topic: String,
    pub subjects: usize,
    pub archived: usize,
}

/// Summarize the topics in a snapshot.
pub async fn run_topics(settings: &Settings, snapshot: Option<&str>) -> Result<Vec<TopicSummary>> {
    let store = open_store(settings, snapshot)?;
    let mut summaries = Vec::new();
    for topic in store.list_topics().await? {
        let subjects = store.list_subjects(&topic).await?;
        summaries.push(TopicSummary {
            archived: subjects.iter().filter(|s| s.archived).count(),
            subjects: subjects.len(),
            topic,
        });
    }
    Ok(summaries)
}

/// Print topic summaries.
pub async fn handle_topics(settings: &Settings, snapshot: Option<&str>) -> Result<()> {
    let summaries = run_topics(settings, snapshot).await?;
    if summaries.is_empty() {
        println!("No topics found");
        return Ok(());
    }
    println!("{:<40} {:>8} {:>8}", "TOPIC", "SUBJECTS", "ARCHIVED");
    for summary in summaries {
        println!(
            "{:<40} {:>8} {:>8}",
            summary.topic, summary.subjects, summary.archived
        );
    }
    Ok(())
}

/// Relevance score for a similarity and creation time under `settings`.
pub fn run_score(settings: &Settings, similarity: f64, created_at: i64) -> Result<f64> {
    if !(0.0..=1.0).contains(&similarity) {
        return Err(anyhow!("similarity must be 0.0-1.0, got {similarity}"));
    }
    let config = &settings.proposals;
    let boost = recency_boost(created_at, config.recency_window_ms);
    Ok(relevance_score(similarity, boost, config))
}

/// Print a relevance score.
pub fn handle_score(settings: &Settings, similarity: f64, created_at: i64) -> Result<()> {
    let score = run_score(settings, similarity, created_at)?;
    println!("{score:.4}");
    Ok(())
}
