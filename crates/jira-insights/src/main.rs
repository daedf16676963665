mod bootstrap;

use anyhow::Result;
use clap::Parser;
use insights_core::settings::{FetchConfig, FileConfig, Settings};
use insights_data::fetcher::IssueFetcher;
use insights_data::report::build_report;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("jira-insights v{} starting", env!("CARGO_PKG_VERSION"));

    let file_config = FileConfig::load_from(&settings.config);
    let config = FetchConfig::resolve(&settings, &file_config);
    tracing::info!(
        "Project: {}, endpoint: {}, page size: {}",
        config.project,
        config.base_url,
        config.page_size
    );

    let fetcher = IssueFetcher::new(config);
    let outcome = fetcher.fetch().await;

    if outcome.is_empty() {
        // Distinguishable "no data" outcome: nothing to chart, not a crash.
        tracing::warn!("No issues retrieved; nothing to report");
        return Ok(());
    }
    if !outcome.is_complete() {
        tracing::warn!("Fetch was interrupted; the report covers a partial collection");
    }

    let since = settings
        .since_days
        .map(|days| (chrono::Utc::now() - chrono::Duration::days(days)).date_naive());

    let report = build_report(
        &outcome.issues,
        outcome.is_complete(),
        settings.top_contributors,
        since,
    );

    if report
        .effort_days
        .as_ref()
        .is_some_and(|samples| samples.is_empty())
    {
        tracing::warn!("No effort data available for the effort histogram");
    }

    let json = serde_json::to_string_pretty(&report)?;
    match &settings.output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
