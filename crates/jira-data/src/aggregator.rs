//! Status and calendar-day aggregation over parsed issues.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use jira_core::models::{DailyCount, DateField, DatedIssueRecord, IssueRecord, StatusCount};
use jira_core::time_utils::TimezoneHandler;
use tracing::debug;

// ── IssueAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that groups issues by status or by calendar day.
pub struct IssueAggregator;

impl IssueAggregator {
    /// One [`StatusCount`] per distinct status, most frequent first.
    ///
    /// The category is taken from the first issue seen with each status.
    /// Equal counts keep the order in which their status first appeared.
    pub fn by_status(issues: &[IssueRecord]) -> Vec<StatusCount> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<StatusCount> = Vec::new();

        for issue in issues {
            match index.get(issue.status.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(issue.status.as_str(), counts.len());
                    counts.push(StatusCount {
                        status: issue.status.clone(),
                        count: 1,
                        category: issue.status_category.to_string(),
                    });
                }
            }
        }

        // `sort_by` is stable, so ties stay in first-occurrence order.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// Count issues per local calendar day of the selected date field.
    ///
    /// Issues without that date, or with an unparseable one, are skipped.
    /// Returns days sorted ascending; days without issues are not emitted.
    pub fn by_date(
        issues: &[DatedIssueRecord],
        field: DateField,
        timestamps: &TimezoneHandler,
    ) -> Vec<DailyCount> {
        let mut map: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        let mut skipped_invalid = 0usize;

        for issue in issues {
            let date = match field {
                DateField::Created => Some(&issue.created_date),
                DateField::Resolved => issue.resolved_date.as_ref(),
            };
            let Some(date) = date else { continue };
            let Some(at) = date.timestamp() else {
                skipped_invalid += 1;
                continue;
            };
            *map.entry(timestamps.local_date(at)).or_insert(0) += 1;
        }

        if skipped_invalid > 0 {
            debug!(
                "Skipped {} issues with an invalid {:?} date",
                skipped_invalid, field
            );
        }

        map.into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
