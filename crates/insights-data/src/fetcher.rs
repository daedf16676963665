//! Remote search boundary for jira-insights.
//!
//! Pages through the tracker's search endpoint one request at a time and
//! converts the raw response records into [`Issue`] structs. This module is
//! the only point of contact with the remote service; everything downstream
//! works on the in-memory collection it returns.

use insights_core::models::Issue;
use insights_core::settings::FetchConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

/// Field projection requested from the search endpoint: only what the
/// aggregators consume, plus the summary for display.
const FIELD_PROJECTION: &str =
    "key,created,resolutiondate,status,reporter,assignee,priority,timespent,summary";

// ── Wire model ─────────────────────────────────────────────────────────────────

/// The search response body. Extraction into [`Issue`] happens here, at the
/// boundary, so optional nested members are unwrapped exactly once.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    fields: RawFields,
}

#[derive(Debug, Deserialize)]
struct RawFields {
    created: String,
    #[serde(rename = "resolutiondate")]
    resolution_date: Option<String>,
    status: NamedField,
    reporter: Option<UserField>,
    assignee: Option<UserField>,
    priority: Option<NamedField>,
    #[serde(rename = "timespent")]
    time_spent: Option<i64>,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UserField {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue {
            key: raw.key,
            created: raw.fields.created,
            resolved: raw.fields.resolution_date,
            status: raw.fields.status.name,
            // A user object without a display name counts as no user at all.
            reporter: raw.fields.reporter.and_then(|u| u.display_name),
            assignee: raw.fields.assignee.and_then(|u| u.display_name),
            priority: raw.fields.priority.map(|p| p.name),
            time_spent_seconds: raw.fields.time_spent,
            summary: raw.fields.summary,
        }
    }
}

// ── FetchOutcome ───────────────────────────────────────────────────────────────

/// What one fetch run produced.
///
/// Transport failures never surface as `Err`: pagination stops and whatever
/// was collected before the failed request is returned, with the failure
/// recorded so the driver can tell a complete collection from a truncated
/// one.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Issues accumulated across all successfully fetched pages. Duplicate
    /// keys are preserved as-is.
    pub issues: Vec<Issue>,
    /// Description of the transport failure that cut pagination short, if
    /// any.
    pub interruption: Option<String>,
}

impl FetchOutcome {
    /// Whether pagination ran to its natural end.
    pub fn is_complete(&self) -> bool {
        self.interruption.is_none()
    }

    /// Whether nothing at all was collected.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

// ── IssueFetcher ───────────────────────────────────────────────────────────────

/// Issues paginated queries against the tracker's search endpoint.
pub struct IssueFetcher {
    config: FetchConfig,
    client: Client,
}

impl IssueFetcher {
    /// Create a fetcher with one HTTP client bound to the configured
    /// per-request timeout.
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/rest/api/2/search",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn jql(&self) -> String {
        format!(
            "project={} AND status in (Closed, Resolved)",
            self.config.project
        )
    }

    /// Fetch every page of the search result.
    ///
    /// Requests run strictly sequentially. Pagination ends on an empty page,
    /// on a page shorter than the configured page size (a short page is the
    /// last page; no further request is issued), or on the first transport
    /// or parse failure. There is no retry.
    pub async fn fetch(&self) -> FetchOutcome {
        let mut issues: Vec<Issue> = Vec::new();
        let mut start_at: usize = 0;

        loop {
            let page = match self.fetch_page(start_at).await {
                Ok(page) => page,
                Err(reason) => {
                    warn!("Search request failed at offset {}: {}", start_at, reason);
                    return FetchOutcome {
                        issues,
                        interruption: Some(reason),
                    };
                }
            };

            if page.is_empty() {
                break;
            }

            let page_len = page.len();
            issues.extend(page.into_iter().map(Issue::from));
            info!(
                "Received {} issues, {} collected so far",
                page_len,
                issues.len()
            );

            if page_len < self.config.page_size {
                break;
            }

            start_at += page_len;
        }

        info!("Fetched {} issues in total", issues.len());
        FetchOutcome {
            issues,
            interruption: None,
        }
    }

    /// Issue one search request and parse its page of raw issues.
    async fn fetch_page(&self, start_at: usize) -> std::result::Result<Vec<RawIssue>, String> {
        let jql = self.jql();
        let start_at_param = start_at.to_string();
        let max_results = self.config.page_size.to_string();

        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("jql", jql.as_str()),
                ("startAt", start_at_param.as_str()),
                ("maxResults", max_results.as_str()),
                ("fields", FIELD_PROJECTION),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let body: SearchResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.issues)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
