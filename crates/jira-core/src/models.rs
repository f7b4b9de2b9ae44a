use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assignee text used when an issue has no `<assignee>` node.
pub const UNASSIGNED: &str = "Sin asignar";

/// Sprint name used when the sprint custom field is missing.
pub const DEFAULT_SPRINT_NAME: &str = "Sprint";

/// Label that routes an issue into the "Importantes" bucket.
pub const IMPORTANT_LABEL: &str = "Inactiva";

/// Label that routes an issue into the second bucket in legacy mode.
pub const TASK_LABEL: &str = "Tarea";

/// Jira's three-way status bucket, independent of the free-text status.
///
/// Exports occasionally carry keys outside the documented three; those are
/// kept verbatim in [`StatusCategory::Other`] instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusCategory {
    #[default]
    New,
    Indeterminate,
    Done,
    Other(String),
}

impl StatusCategory {
    /// The raw category key as it appears in the export.
    pub fn as_str(&self) -> &str {
        match self {
            StatusCategory::New => "new",
            StatusCategory::Indeterminate => "indeterminate",
            StatusCategory::Done => "done",
            StatusCategory::Other(raw) => raw,
        }
    }

    /// Whether the key is one of the three Jira knows about.
    pub fn is_known(&self) -> bool {
        !matches!(self, StatusCategory::Other(_))
    }
}

impl From<&str> for StatusCategory {
    fn from(raw: &str) -> Self {
        match raw {
            "new" => StatusCategory::New,
            "indeterminate" => StatusCategory::Indeterminate,
            "done" => StatusCategory::Done,
            other => StatusCategory::Other(other.to_string()),
        }
    }
}

impl From<String> for StatusCategory {
    fn from(raw: String) -> Self {
        StatusCategory::from(raw.as_str())
    }
}

impl From<StatusCategory> for String {
    fn from(category: StatusCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamp read from the export.
///
/// Text that no supported format accepts is kept as [`IssueDate::Invalid`]
/// so the record survives parsing; date grouping skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum IssueDate {
    Valid { at: DateTime<Utc> },
    Invalid { raw: String },
}

impl IssueDate {
    pub fn valid(at: DateTime<Utc>) -> Self {
        IssueDate::Valid { at }
    }

    pub fn invalid(raw: impl Into<String>) -> Self {
        IssueDate::Invalid { raw: raw.into() }
    }

    /// The parsed instant, or `None` for the invalid marker.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            IssueDate::Valid { at } => Some(*at),
            IssueDate::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, IssueDate::Valid { .. })
    }
}

/// A single issue extracted from a Jira XML export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Issue key, e.g. `"PROJ-123"`. Unique within one export only.
    pub key: String,
    pub summary: String,
    /// Free-text workflow status, e.g. `"In Review"`.
    pub status: String,
    pub status_category: StatusCategory,
    /// Display name of the assignee, [`UNASSIGNED`] when absent.
    pub assignee: String,
    /// Issue type, e.g. `"Story"` or `"Bug"`.
    #[serde(rename = "type")]
    pub issue_type: String,
    pub priority: String,
}

/// An [`IssueRecord`] plus the lifecycle fields used by the trend pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedIssueRecord {
    #[serde(flatten)]
    pub issue: IssueRecord,
    /// Always set; holds the invalid marker when `<created>` is missing or
    /// unparseable.
    pub created_date: IssueDate,
    /// Only set when `<resolved>` exists and is non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<IssueDate>,
    /// First label of the issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Epic or parent issue key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl DatedIssueRecord {
    pub fn key(&self) -> &str {
        &self.issue.key
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }
}

/// Number of issues sharing one status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u32,
    /// Category of the first issue seen with this status.
    pub category: String,
}

/// Document-level sprint metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintInfo {
    pub name: String,
    pub total_issues: u64,
}

impl Default for SprintInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_SPRINT_NAME.to_string(),
            total_issues: 0,
        }
    }
}

/// Which lifecycle date drives a daily aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    Created,
    Resolved,
}

/// Events on one calendar day. Days without events are never emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Running created/closed totals for one day of a burn-up series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub created_cumulative: u32,
    pub closed_cumulative: u32,
}

/// Label-based partition of issues for the output analysis table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buckets {
    /// "Importantes": issues labelled [`IMPORTANT_LABEL`].
    pub important: Vec<DatedIssueRecord>,
    /// "Todo lo demás".
    pub rest: Vec<DatedIssueRecord>,
}

impl Buckets {
    pub const IMPORTANT_TITLE: &'static str = "Importantes";
    pub const REST_TITLE: &'static str = "Todo lo demás";

    pub fn total(&self) -> usize {
        self.important.len() + self.rest.len()
    }
}

/// How the output analysis splits issues into [`Buckets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMode {
    /// Dedup both files by key, then `Inactiva` vs everything else.
    #[default]
    Merged,
    /// Closed file only, `Inactiva` vs `Tarea`; other labels are dropped.
    Legacy,
}

impl BucketMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketMode::Merged => "merged",
            BucketMode::Legacy => "legacy",
        }
    }
}

impl std::str::FromStr for BucketMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merged" => Ok(BucketMode::Merged),
            "legacy" => Ok(BucketMode::Legacy),
            other => Err(format!("unknown bucket mode: {other}")),
        }
    }
}
