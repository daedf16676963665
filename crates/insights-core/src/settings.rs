use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

// ── Hard-coded fallbacks ───────────────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "https://issues.apache.org/jira";
pub const DEFAULT_PROJECT: &str = "KAFKA";
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Issue-tracker analytics report generator
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jira-insights",
    about = "Fetch resolved issues from a tracker and emit chart-ready analytics",
    version
)]
pub struct Settings {
    /// Project key to analyze
    #[arg(long)]
    pub project: Option<String>,

    /// Base URL of the tracker instance
    #[arg(long)]
    pub base_url: Option<String>,

    /// Search page size
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Contributors kept in the activity ranking
    #[arg(long, default_value_t = 30)]
    pub top_contributors: usize,

    /// Restrict the daily series to the last N days
    #[arg(long)]
    pub since_days: Option<i64>,

    /// Path to the settings file
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// The log level to initialise tracing with; `--debug` overrides it.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── FileConfig ─────────────────────────────────────────────────────────────────

/// Optional settings file (`config.json` by default) with the keys
/// `jira_url`, `default_project`, `max_results` and `timeout`. Every key is
/// optional; whatever is absent falls back to the hard-coded defaults.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct FileConfig {
    pub jira_url: Option<String>,
    pub default_project: Option<String>,
    pub max_results: Option<usize>,
    pub timeout: Option<u64>,
}

impl FileConfig {
    /// Load settings from `path`.
    ///
    /// A missing or unparsable file degrades to `Default` with a warning; a
    /// settings file is a convenience, never a requirement.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            warn!("Settings file {} not found, using defaults", path.display());
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(
                "Settings file {} is not valid JSON ({}), using defaults",
                path.display(),
                e
            );
            Self::default()
        })
    }
}

// ── FetchConfig ────────────────────────────────────────────────────────────────

/// Resolved fetch parameters, constructed once by the driver and passed by
/// parameter into the fetcher. No ambient configuration state.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub project: String,
    pub page_size: usize,
    pub timeout: Duration,
}

impl FetchConfig {
    /// Merge hard-coded defaults, the settings file, and explicit CLI flags.
    /// CLI wins over the file, the file wins over the defaults.
    pub fn resolve(settings: &Settings, file: &FileConfig) -> Self {
        let base_url = settings
            .base_url
            .clone()
            .or_else(|| file.jira_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let project = settings
            .project
            .clone()
            .or_else(|| file.default_project.clone())
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string());
        let page_size = settings
            .page_size
            .or(file.max_results)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let timeout_secs = settings
            .timeout
            .or(file.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url,
            project,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
