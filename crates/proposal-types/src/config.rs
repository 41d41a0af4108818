//! Configuration loading for the proposal engine.
//!
//! Layered config: defaults -> user config file -> CLI config file -> env vars.
//! CLI flags are applied by the caller after `Settings::load` returns.
//! The user config file lives at ~/.config/knowledge-proposals/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ProposalError;
use crate::proposal::ProposalConfig;

/// Application name used for config directories.
pub const APP_NAME: &str = "knowledge-proposals";

/// Environment variable prefix, e.g. `PROPOSALS__CACHE__TTL_MS=5000`.
pub const ENV_PREFIX: &str = "PROPOSALS";

/// Result cache sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of cached requests
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry lifetime in milliseconds
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: i64,
}

fn default_cache_capacity() -> usize {
    50
}

fn default_cache_ttl_ms() -> i64 {
    60_000
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_ms: default_cache_ttl_ms(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON snapshot of the object store used by the CLI
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Keep archived subjects as candidates
    #[serde(default = "default_include_archived")]
    pub include_archived: bool,

    /// Result cache settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// Scoring configuration
    #[serde(default)]
    pub proposals: ProposalConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_include_archived() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            snapshot_path: None,
            include_archived: default_include_archived(),
            cache: CacheSettings::default(),
            proposals: ProposalConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/knowledge-proposals/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (PROPOSALS__*)
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ProposalError> {
        let config_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self::load_from(&config_dir.join("config"), cli_config_path)
    }

    fn load_from(
        default_config_path: &std::path::Path,
        cli_config_path: Option<&str>,
    ) -> Result<Self, ProposalError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("log_level", defaults.log_level)
            .map_err(config_err)?
            .set_default("include_archived", defaults.include_archived)
            .map_err(config_err)?
            .set_default("cache.capacity", defaults.cache.capacity as i64)
            .map_err(config_err)?
            .set_default("cache.ttl_ms", defaults.cache.ttl_ms)
            .map_err(config_err)?
            .set_default("proposals.match_weight", defaults.proposals.match_weight)
            .map_err(config_err)?
            .set_default("proposals.recency_weight", defaults.proposals.recency_weight)
            .map_err(config_err)?
            .set_default(
                "proposals.recency_window_ms",
                defaults.proposals.recency_window_ms,
            )
            .map_err(config_err)?
            .set_default("proposals.min_jaccard", defaults.proposals.min_jaccard)
            .map_err(config_err)?
            .set_default(
                "proposals.max_proposals",
                defaults.proposals.max_proposals as i64,
            )
            .map_err(config_err)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Double underscore keeps snake_case keys intact: PROPOSALS__CACHE__TTL_MS
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the loaded settings.
    pub fn validate(&self) -> Result<(), ProposalError> {
        self.proposals.validate().map_err(ProposalError::Config)?;
        if self.cache.ttl_ms < 0 {
            return Err(ProposalError::Config(format!(
                "cache.ttl_ms must be >= 0, got {}",
                self.cache.ttl_ms
            )));
        }
        Ok(())
    }
}

fn config_err(e: config::ConfigError) -> ProposalError {
    ProposalError::Config(e.to_string())
}
