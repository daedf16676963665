//! Report assembly for jira-insights.
//!
//! Runs every aggregation transform over the fetched collection and bundles
//! the results, chart-ready, for the downstream renderer. Transforms are
//! independent: one aborting on malformed source data leaves its dataset
//! empty and the rest of the report intact.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use insights_core::error::Result;
use insights_core::models::Issue;

use crate::aggregate::{ContributorCount, DailyActivitySeries, IssueAggregator};

// ── Public types ───────────────────────────────────────────────────────────────

/// Metadata produced alongside the datasets.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of issues the transforms ran over.
    pub issues_analyzed: usize,
    /// `false` when the fetch was cut short and the collection is partial.
    pub fetch_complete: bool,
}

/// The chart-ready output of one pipeline run.
///
/// A dataset is `None` when its transform aborted; the cause is recorded in
/// `transform_errors`. The infallible datasets are always present.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub metadata: ReportMetadata,
    pub resolution_days: Option<Vec<i64>>,
    pub resolution_days_by_status: Option<BTreeMap<String, Vec<i64>>>,
    pub daily_activity: Option<DailyActivitySeries>,
    pub top_contributors: Vec<ContributorCount>,
    pub effort_days: Option<Vec<f64>>,
    pub priority_counts: BTreeMap<String, u64>,
    pub transform_errors: Vec<String>,
}

// ── Public function ────────────────────────────────────────────────────────────

/// Run all six transforms over the immutable issue collection.
///
/// `top_contributors` bounds the activity ranking; `since` optionally
/// restricts the daily series to recent activity.
pub fn build_report(
    issues: &[Issue],
    fetch_complete: bool,
    top_contributors: usize,
    since: Option<NaiveDate>,
) -> InsightsReport {
    let mut transform_errors: Vec<String> = Vec::new();

    let resolution_days = keep(
        "resolution_time_histogram",
        IssueAggregator::resolution_time_histogram(issues),
        &mut transform_errors,
    );
    let resolution_days_by_status = keep(
        "per_status_resolution_time",
        IssueAggregator::per_status_resolution_time(issues),
        &mut transform_errors,
    );
    let daily_activity = keep(
        "daily_created_vs_closed",
        IssueAggregator::daily_created_vs_closed(issues, since),
        &mut transform_errors,
    );
    let effort_days = keep(
        "effort_histogram",
        IssueAggregator::effort_histogram(issues),
        &mut transform_errors,
    );

    InsightsReport {
        metadata: ReportMetadata {
            generated_at: Utc::now().to_rfc3339(),
            issues_analyzed: issues.len(),
            fetch_complete,
        },
        resolution_days,
        resolution_days_by_status,
        daily_activity,
        top_contributors: IssueAggregator::contributor_activity(issues, top_contributors),
        effort_days,
        priority_counts: IssueAggregator::priority_distribution(issues),
        transform_errors,
    }
}

// ── Private helpers ────────────────────────────────────────────────────────────

/// Keep a transform's dataset, or record its failure and move on.
fn keep<T>(name: &str, result: Result<T>, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            warn!("Transform {} aborted: {}", name, e);
            errors.push(format!("{}: {}", name, e));
            None
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
