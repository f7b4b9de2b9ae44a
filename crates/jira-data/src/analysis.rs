//! Top-level pipelines for JiraJira.
//!
//! Combine parsing, aggregation, trend building and bucketing into report
//! values ready for the presentation layer.

use std::path::Path;

use chrono::Utc;
use jira_core::error::{JiraError, Result};
use jira_core::models::{
    BucketMode, Buckets, DatedIssueRecord, IssueRecord, SprintInfo, StatusCount, TrendPoint,
};
use jira_core::time_utils::TimezoneHandler;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::IssueAggregator;
use crate::buckets::bucketize;
use crate::reader::{parse_issues, read_sprint_info};
use crate::trend::trend_from_issues;

// ── Public types ──────────────────────────────────────────────────────────────

/// Status histogram of one export (basic pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusAnalysis {
    pub sprint: SprintInfo,
    pub statuses: Vec<StatusCount>,
    /// Number of `<item>` nodes parsed; may differ from `sprint.total_issues`
    /// when the export was paginated.
    pub issues_parsed: usize,
}

/// Metadata produced alongside a [`TrendAnalysis`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// IANA name of the zone used for calendar days.
    pub timezone: String,
    pub created_issues: usize,
    pub closed_issues: usize,
    /// Created-file issues left out of the series for lack of a usable date.
    pub invalid_created_dates: usize,
    pub bucket_mode: BucketMode,
}

/// Burn-up series plus output buckets (dated pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Sprint header of the closed export.
    pub sprint: SprintInfo,
    pub series: Vec<TrendPoint>,
    pub buckets: Buckets,
    /// Status histogram of the closed export.
    pub closed_statuses: Vec<StatusCount>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the basic pipeline over the export text loaded from `path`.
///
/// Fails when the XML is malformed or holds no issues.
pub fn analyze_status(path: &Path, xml: &str) -> Result<StatusAnalysis> {
    let issues = parse_issues(xml)?;
    if issues.is_empty() {
        return Err(JiraError::NoIssues(path.to_path_buf()));
    }

    let statuses = IssueAggregator::by_status(&issues);
    let sprint = read_sprint_info(xml);
    info!(
        "{}: {} issues in {} statuses",
        path.display(),
        issues.len(),
        statuses.len()
    );

    Ok(StatusAnalysis {
        sprint,
        statuses,
        issues_parsed: issues.len(),
    })
}

/// Run the dated pipeline over already-parsed created and closed files.
///
/// `sprint` is the header read from the closed export.
pub fn analyze_trend(
    created_issues: &[DatedIssueRecord],
    closed_issues: &[DatedIssueRecord],
    sprint: SprintInfo,
    mode: BucketMode,
    timestamps: &TimezoneHandler,
) -> TrendAnalysis {
    let series = trend_from_issues(created_issues, closed_issues, timestamps);
    let buckets = bucketize(mode, created_issues, closed_issues);
    let closed_records: Vec<IssueRecord> =
        closed_issues.iter().map(|d| d.issue.clone()).collect();
    let closed_statuses = IssueAggregator::by_status(&closed_records);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        timezone: timestamps.default_tz().name().to_string(),
        created_issues: created_issues.len(),
        closed_issues: closed_issues.len(),
        invalid_created_dates: created_issues
            .iter()
            .filter(|i| !i.created_date.is_valid())
            .count(),
        bucket_mode: mode,
    };

    info!(
        "Trend over {} days; {} important / {} other issues",
        series.len(),
        buckets.important.len(),
        buckets.rest.len()
    );

    TrendAnalysis {
        sprint,
        series,
        buckets,
        closed_statuses,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
