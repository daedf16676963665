//! Chart-ready aggregations over a fetched issue collection.
//!
//! Six independent, stateless transforms. Each reads the full collection
//! and emits one dataset; none mutates anything, so callers may run them in
//! any order or in parallel over the same snapshot. Transforms that parse
//! timestamps return `Result` so that malformed source data aborts only the
//! transform that touched it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use insights_core::duration::{date_of, elapsed_days};
use insights_core::error::Result;
use insights_core::models::Issue;

/// Label under which issues with no priority are counted.
pub const UNSPECIFIED_PRIORITY: &str = "Unspecified";

/// Documented presentation default for the contributor ranking.
pub const DEFAULT_TOP_CONTRIBUTORS: usize = 30;

const SECONDS_PER_DAY: f64 = 86_400.0;

// ── Output types ───────────────────────────────────────────────────────────────

/// Aligned created-vs-closed counts over a sorted calendar-date domain.
///
/// The domain is the sorted union of every date with at least one creation
/// or closure; dates with no activity in either counter are absent, not
/// zero-filled. The cumulative series are running sums over that sorted
/// domain and are monotonically non-decreasing by construction.
#[derive(Debug, Clone, Serialize)]
pub struct DailyActivitySeries {
    pub dates: Vec<NaiveDate>,
    pub created: Vec<u64>,
    pub closed: Vec<u64>,
    pub created_cumulative: Vec<u64>,
    pub closed_cumulative: Vec<u64>,
}

impl DailyActivitySeries {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// One row of the contributor activity ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorCount {
    pub name: String,
    pub count: u64,
}

// ── IssueAggregator ────────────────────────────────────────────────────────────

/// Stateless transforms turning an issue collection into chart-ready series.
///
/// Duplicate keys in the collection are counted as many times as they
/// appear; the fetcher deliberately does not deduplicate, so the ranking
/// and distribution transforms inherit that double-counting.
pub struct IssueAggregator;

impl IssueAggregator {
    /// Days from creation to resolution, one sample per resolved issue.
    ///
    /// Unresolved issues contribute nothing. Binning and range policy belong
    /// to the renderer; this emits raw samples only.
    pub fn resolution_time_histogram(issues: &[Issue]) -> Result<Vec<i64>> {
        let mut samples = Vec::new();
        for issue in issues {
            if let Some(resolved) = &issue.resolved {
                samples.push(elapsed_days(&issue.created, resolved)?);
            }
        }
        Ok(samples)
    }

    /// The same elapsed-day samples grouped by status label.
    ///
    /// Every distinct status gets a group; any "top N statuses" cut happens
    /// downstream.
    pub fn per_status_resolution_time(issues: &[Issue]) -> Result<BTreeMap<String, Vec<i64>>> {
        let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
        for issue in issues {
            if let Some(resolved) = &issue.resolved {
                let days = elapsed_days(&issue.created, resolved)?;
                groups.entry(issue.status.clone()).or_default().push(days);
            }
        }
        Ok(groups)
    }

    /// Created-vs-closed counts per calendar day plus running cumulative
    /// sums over the sorted date domain.
    ///
    /// `since` drops activity before the given date; `None` keeps the full
    /// domain.
    pub fn daily_created_vs_closed(
        issues: &[Issue],
        since: Option<NaiveDate>,
    ) -> Result<DailyActivitySeries> {
        let mut created_by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        let mut closed_by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();

        let in_range = |date: NaiveDate| since.map_or(true, |cutoff| date >= cutoff);

        for issue in issues {
            let created = date_of(&issue.created)?;
            if in_range(created) {
                *created_by_day.entry(created).or_insert(0) += 1;
            }
            if let Some(resolved) = &issue.resolved {
                let closed = date_of(resolved)?;
                if in_range(closed) {
                    *closed_by_day.entry(closed).or_insert(0) += 1;
                }
            }
        }

        let mut domain: BTreeSet<NaiveDate> = BTreeSet::new();
        domain.extend(created_by_day.keys().copied());
        domain.extend(closed_by_day.keys().copied());

        let dates: Vec<NaiveDate> = domain.into_iter().collect();
        let created: Vec<u64> = dates
            .iter()
            .map(|d| created_by_day.get(d).copied().unwrap_or(0))
            .collect();
        let closed: Vec<u64> = dates
            .iter()
            .map(|d| closed_by_day.get(d).copied().unwrap_or(0))
            .collect();

        Ok(DailyActivitySeries {
            created_cumulative: running_total(&created),
            closed_cumulative: running_total(&closed),
            dates,
            created,
            closed,
        })
    }

    /// Issues handled per contributor, assignee and reporter roles counted
    /// independently.
    ///
    /// One issue can bump two different contributors, or the same
    /// contributor twice when they reported and were assigned the same
    /// issue. Ranked descending by count; ties keep first-seen order.
    /// Truncated to `top_n` rows.
    pub fn contributor_activity(issues: &[Issue], top_n: usize) -> Vec<ContributorCount> {
        fn bump(name: &str, order: &mut Vec<String>, counts: &mut HashMap<String, u64>) {
            if !counts.contains_key(name) {
                order.push(name.to_string());
            }
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, u64> = HashMap::new();

        for issue in issues {
            if let Some(assignee) = &issue.assignee {
                bump(assignee, &mut order, &mut counts);
            }
            if let Some(reporter) = &issue.reporter {
                bump(reporter, &mut order, &mut counts);
            }
        }

        let mut ranked: Vec<ContributorCount> = order
            .into_iter()
            .map(|name| {
                let count = counts[&name];
                ContributorCount { name, count }
            })
            .collect();
        // sort_by is stable, so equal counts keep their first-seen order.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(top_n);
        ranked
    }

    /// Day-valued effort samples: logged time when present, otherwise the
    /// creation-to-resolution delta, otherwise nothing for that issue.
    ///
    /// May be empty; callers should surface "no data" rather than chart a
    /// degenerate dataset.
    pub fn effort_histogram(issues: &[Issue]) -> Result<Vec<f64>> {
        let mut samples = Vec::new();
        for issue in issues {
            if let Some(spent) = issue.time_spent_seconds {
                samples.push(spent as f64 / SECONDS_PER_DAY);
            } else if let Some(resolved) = &issue.resolved {
                samples.push(elapsed_days(&issue.created, resolved)? as f64);
            }
        }
        Ok(samples)
    }

    /// Issue counts per priority label; a missing priority is counted under
    /// [`UNSPECIFIED_PRIORITY`] rather than dropped. Map order is not part
    /// of the contract.
    pub fn priority_distribution(issues: &[Issue]) -> BTreeMap<String, u64> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for issue in issues {
            let label = issue.priority.as_deref().unwrap_or(UNSPECIFIED_PRIORITY);
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Running left-to-right sum of a count series.
fn running_total(counts: &[u64]) -> Vec<u64> {
    let mut total = 0u64;
    counts
        .iter()
        .map(|c| {
            total += c;
            total
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn issue(key: &str) -> Issue {
        Issue {
            key: key.to_string(),
            created: "2024-01-01T10:00:00.000+0000".to_string(),
            resolved: None,
            status: "Closed".to_string(),
            reporter: None,
            assignee: None,
            priority: None,
            time_spent_seconds: None,
            summary: String::new(),
        }
    }

    fn resolved_issue(key: &str, created: &str, resolved: &str) -> Issue {
        Issue {
            created: created.to_string(),
            resolved: Some(resolved.to_string()),
            ..issue(key)
        }
    }

    // ── resolution_time_histogram ─────────────────────────────────────────────

    #[test]
    fn test_histogram_unresolved_issues_contribute_nothing() {
        let issues = vec![issue("A-1"), issue("A-2")];
        let samples = IssueAggregator::resolution_time_histogram(&issues).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_histogram_two_day_resolution_yields_single_sample_of_two() {
        let issues = vec![resolved_issue(
            "A-1",
            "2024-01-01T10:00:00.000+0000",
            "2024-01-03T10:00:00.000+0000",
        )];
        let samples = IssueAggregator::resolution_time_histogram(&issues).unwrap();
        assert_eq!(samples, vec![2]);
    }

    #[test]
    fn test_histogram_mixed_collection() {
        let issues = vec![
            resolved_issue("A-1", "2023-01-01T00:00:00", "2023-01-03T00:00:00"),
            issue("A-2"),
            resolved_issue("A-3", "2023-01-10T00:00:00", "2023-01-20T00:00:00"),
        ];
        let samples = IssueAggregator::resolution_time_histogram(&issues).unwrap();
        assert_eq!(samples, vec![2, 10]);
    }

    #[test]
    fn test_histogram_malformed_timestamp_is_error() {
        let issues = vec![resolved_issue("A-1", "garbage", "2023-01-03T00:00:00")];
        assert!(IssueAggregator::resolution_time_histogram(&issues).is_err());
    }

    #[test]
    fn test_histogram_empty_collection() {
        let samples = IssueAggregator::resolution_time_histogram(&[]).unwrap();
        assert!(samples.is_empty());
    }

    // ── per_status_resolution_time ────────────────────────────────────────────

    #[test]
    fn test_per_status_groups_by_label() {
        let mut closed = resolved_issue("A-1", "2023-01-01T00:00:00", "2023-01-03T00:00:00");
        closed.status = "Closed".to_string();
        let mut resolved = resolved_issue("A-2", "2023-01-01T00:00:00", "2023-01-06T00:00:00");
        resolved.status = "Resolved".to_string();
        let mut closed_again = resolved_issue("A-3", "2023-01-01T00:00:00", "2023-01-02T00:00:00");
        closed_again.status = "Closed".to_string();

        let groups =
            IssueAggregator::per_status_resolution_time(&[closed, resolved, closed_again]).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Closed"], vec![2, 1]);
        assert_eq!(groups["Resolved"], vec![5]);
    }

    #[test]
    fn test_per_status_skips_unresolved() {
        let mut open = issue("A-1");
        open.status = "Reopened".to_string();
        let groups = IssueAggregator::per_status_resolution_time(&[open]).unwrap();
        assert!(groups.is_empty());
    }

    // ── daily_created_vs_closed ───────────────────────────────────────────────

    #[test]
    fn test_daily_series_domain_is_union_of_active_dates() {
        let issues = vec![
            resolved_issue("A-1", "2024-01-01T08:00:00", "2024-01-05T08:00:00"),
            resolved_issue("A-2", "2024-01-01T09:00:00", "2024-01-03T08:00:00"),
        ];
        let series = IssueAggregator::daily_created_vs_closed(&issues, None).unwrap();

        let expected: Vec<NaiveDate> = [(1, 1), (1, 3), (1, 5)]
            .iter()
            .map(|&(m, d)| NaiveDate::from_ymd_opt(2024, m, d).unwrap())
            .collect();
        assert_eq!(series.dates, expected);
        assert_eq!(series.created, vec![2, 0, 0]);
        assert_eq!(series.closed, vec![0, 1, 1]);
    }

    #[test]
    fn test_daily_series_cumulative_monotone_and_totals() {
        let issues = vec![
            resolved_issue("A-1", "2024-01-01T08:00:00", "2024-01-02T08:00:00"),
            resolved_issue("A-2", "2024-01-02T08:00:00", "2024-01-04T08:00:00"),
            issue("A-3"),
        ];
        let series = IssueAggregator::daily_created_vs_closed(&issues, None).unwrap();

        for pair in series.created_cumulative.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        for pair in series.closed_cumulative.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        // Final cumulative created equals the total number of issues with a
        // creation date in the domain.
        assert_eq!(*series.created_cumulative.last().unwrap(), 3);
        assert_eq!(*series.closed_cumulative.last().unwrap(), 2);
    }

    #[test]
    fn test_daily_series_cumulative_follows_sorted_domain_not_input_order() {
        // Later-created issue listed first; cumulative sums must follow the
        // sorted date domain.
        let issues = vec![
            resolved_issue("A-2", "2024-02-01T08:00:00", "2024-02-02T08:00:00"),
            resolved_issue("A-1", "2024-01-01T08:00:00", "2024-01-02T08:00:00"),
        ];
        let series = IssueAggregator::daily_created_vs_closed(&issues, None).unwrap();
        assert_eq!(series.created_cumulative, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_daily_series_since_filters_older_activity() {
        let issues = vec![
            resolved_issue("A-1", "2023-06-01T08:00:00", "2024-01-03T08:00:00"),
            resolved_issue("A-2", "2024-01-02T08:00:00", "2024-01-04T08:00:00"),
        ];
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = IssueAggregator::daily_created_vs_closed(&issues, Some(cutoff)).unwrap();

        // The 2023 creation is outside the window; its closure is inside.
        assert_eq!(series.created.iter().sum::<u64>(), 1);
        assert_eq!(series.closed.iter().sum::<u64>(), 2);
        assert!(series.dates.iter().all(|d| *d >= cutoff));
    }

    #[test]
    fn test_daily_series_empty_collection() {
        let series = IssueAggregator::daily_created_vs_closed(&[], None).unwrap();
        assert!(series.is_empty());
        assert!(series.created.is_empty());
        assert!(series.created_cumulative.is_empty());
    }

    #[test]
    fn test_daily_series_malformed_created_is_error() {
        let mut bad = issue("A-1");
        bad.created = "yesterday".to_string();
        assert!(IssueAggregator::daily_created_vs_closed(&[bad], None).is_err());
    }

    // ── contributor_activity ──────────────────────────────────────────────────

    #[test]
    fn test_contributors_assignee_and_reporter_counted_independently() {
        let mut first = issue("A-1");
        first.assignee = Some("A".to_string());
        first.reporter = Some("B".to_string());
        let mut second = issue("A-2");
        second.assignee = Some("A".to_string());
        second.reporter = Some("A".to_string());

        let ranked = IssueAggregator::contributor_activity(&[first, second], 30);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "A");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[1].name, "B");
        assert_eq!(ranked[1].count, 1);
    }

    #[test]
    fn test_contributors_missing_roles_contribute_nothing() {
        let mut only_reporter = issue("A-1");
        only_reporter.reporter = Some("C".to_string());
        let nobody = issue("A-2");

        let ranked = IssueAggregator::contributor_activity(&[only_reporter, nobody], 30);

        assert_eq!(ranked, vec![ContributorCount { name: "C".to_string(), count: 1 }]);
    }

    #[test]
    fn test_contributors_ties_keep_first_seen_order() {
        let mut first = issue("A-1");
        first.assignee = Some("Zoe".to_string());
        let mut second = issue("A-2");
        second.assignee = Some("Ann".to_string());

        let ranked = IssueAggregator::contributor_activity(&[first, second], 30);

        // Both have count 1; Zoe was seen first and must stay first.
        assert_eq!(ranked[0].name, "Zoe");
        assert_eq!(ranked[1].name, "Ann");
    }

    #[test]
    fn test_contributors_truncates_to_top_n() {
        let issues: Vec<Issue> = (0..10)
            .map(|i| {
                let mut it = issue(&format!("A-{}", i));
                it.assignee = Some(format!("user{}", i));
                it
            })
            .collect();

        let ranked = IssueAggregator::contributor_activity(&issues, 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_contributors_empty_collection() {
        assert!(IssueAggregator::contributor_activity(&[], 30).is_empty());
    }

    // ── effort_histogram ──────────────────────────────────────────────────────

    #[test]
    fn test_effort_prefers_logged_time_over_resolution_delta() {
        // Logged 2 days even though the created/resolved delta is 9 days.
        let mut it = resolved_issue("A-1", "2024-01-01T00:00:00", "2024-01-10T00:00:00");
        it.time_spent_seconds = Some(172_800);

        let samples = IssueAggregator::effort_histogram(&[it]).unwrap();
        assert_eq!(samples, vec![2.0]);
    }

    #[test]
    fn test_effort_falls_back_to_resolution_delta() {
        let it = resolved_issue("A-1", "2024-01-01T00:00:00", "2024-01-04T00:00:00");
        let samples = IssueAggregator::effort_histogram(&[it]).unwrap();
        assert_eq!(samples, vec![3.0]);
    }

    #[test]
    fn test_effort_no_data_issue_contributes_nothing() {
        let samples = IssueAggregator::effort_histogram(&[issue("A-1")]).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_effort_fractional_days() {
        let mut it = issue("A-1");
        it.time_spent_seconds = Some(43_200); // half a day
        let samples = IssueAggregator::effort_histogram(&[it]).unwrap();
        assert_eq!(samples, vec![0.5]);
    }

    // ── priority_distribution ─────────────────────────────────────────────────

    #[test]
    fn test_priority_missing_counts_as_unspecified() {
        let mut major = issue("A-1");
        major.priority = Some("Major".to_string());
        let issues = vec![issue("A-2"), issue("A-3"), major];

        let counts = IssueAggregator::priority_distribution(&issues);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[UNSPECIFIED_PRIORITY], 2);
        assert_eq!(counts["Major"], 1);
    }

    #[test]
    fn test_priority_empty_collection() {
        assert!(IssueAggregator::priority_distribution(&[]).is_empty());
    }

    // ── running_total ─────────────────────────────────────────────────────────

    #[test]
    fn test_running_total() {
        assert_eq!(running_total(&[1, 0, 2, 1]), vec![1, 1, 3, 4]);
        assert!(running_total(&[]).is_empty());
    }
}
