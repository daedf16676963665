use serde::{Deserialize, Serialize};

/// One tracked work item retrieved from the remote tracker.
///
/// Timestamps stay as the raw strings the tracker returned; parsing happens
/// in [`crate::duration`] so that a malformed value surfaces as a hard error
/// in the transform that touches it instead of being coerced at ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Opaque tracker key, e.g. `"KAFKA-1234"`. Keys are not deduplicated:
    /// when overlapping queries return the same key twice, it appears twice
    /// here and in every derived statistic.
    pub key: String,
    /// Creation timestamp string, always present.
    pub created: String,
    /// Resolution timestamp string; `None` while the issue is open in the
    /// tracker's eyes, even when it matched a resolved-status query.
    #[serde(default)]
    pub resolved: Option<String>,
    /// Workflow status label used for grouping.
    pub status: String,
    /// Reporter display name, when the tracker exposes one.
    #[serde(default)]
    pub reporter: Option<String>,
    /// Assignee display name, when the issue is assigned.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Priority label, when set.
    #[serde(default)]
    pub priority: Option<String>,
    /// Logged effort in seconds.
    #[serde(default)]
    pub time_spent_seconds: Option<i64>,
    /// Free-text summary, carried through for display only.
    #[serde(default)]
    pub summary: String,
}

impl Issue {
    /// Whether the tracker recorded a resolution timestamp for this issue.
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
