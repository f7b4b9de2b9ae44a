//! Dense created-vs-closed burn-up series.

use std::collections::HashMap;

use chrono::NaiveDate;
use jira_core::models::{DailyCount, DateField, DatedIssueRecord, TrendPoint};
use jira_core::time_utils::TimezoneHandler;

use crate::aggregator::IssueAggregator;

/// Merge two sparse daily counts into one cumulative point per day.
///
/// The series spans every day from the earliest to the latest date found in
/// either input, with days lacking events carrying the previous totals.
/// Returns an empty series when both inputs are empty.
pub fn build_trend_series(created: &[DailyCount], closed: &[DailyCount]) -> Vec<TrendPoint> {
    let created_map: HashMap<NaiveDate, u32> = created.iter().map(|d| (d.date, d.count)).collect();
    let closed_map: HashMap<NaiveDate, u32> = closed.iter().map(|d| (d.date, d.count)).collect();

    let all_dates = created_map.keys().chain(closed_map.keys());
    let (Some(min_date), Some(max_date)) = (all_dates.clone().min(), all_dates.max()) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    let mut created_cumulative = 0u32;
    let mut closed_cumulative = 0u32;

    for date in min_date.iter_days().take_while(|d| d <= max_date) {
        created_cumulative += created_map.get(&date).copied().unwrap_or(0);
        closed_cumulative += closed_map.get(&date).copied().unwrap_or(0);
        result.push(TrendPoint {
            date,
            created_cumulative,
            closed_cumulative,
        });
    }

    result
}

/// Build the burn-up series straight from two issue lists: the created file
/// is counted on `created`, the closed file on `resolved`.
pub fn trend_from_issues(
    created_issues: &[DatedIssueRecord],
    closed_issues: &[DatedIssueRecord],
    timestamps: &TimezoneHandler,
) -> Vec<TrendPoint> {
    let created = IssueAggregator::by_date(created_issues, DateField::Created, timestamps);
    let closed = IssueAggregator::by_date(closed_issues, DateField::Resolved, timestamps);
    build_trend_series(&created, &closed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use jira_core::models::{IssueRecord, StatusCategory};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn count(date: NaiveDate, count: u32) -> DailyCount {
        DailyCount { date, count }
    }

    fn dated(key: &str, created: &str, resolved: Option<&str>) -> DatedIssueRecord {
        let handler = TimezoneHandler::default();
        DatedIssueRecord {
            issue: IssueRecord {
                key: key.to_string(),
                summary: String::new(),
                status: "Done".to_string(),
                status_category: StatusCategory::Done,
                assignee: "Ana".to_string(),
                issue_type: "Task".to_string(),
                priority: String::new(),
            },
            created_date: handler.parse_issue_date(created),
            resolved_date: resolved.map(|r| handler.parse_issue_date(r)),
            label: None,
            parent: None,
        }
    }

    fn columns(series: &[TrendPoint]) -> (Vec<u32>, Vec<u32>) {
        (
            series.iter().map(|p| p.created_cumulative).collect(),
            series.iter().map(|p| p.closed_cumulative).collect(),
        )
    }

    // ── build_trend_series ────────────────────────────────────────────────────

    #[test]
    fn test_series_fills_gaps_between_inputs() {
        let created = vec![count(day(2024, 1, 1), 1), count(day(2024, 1, 3), 1)];
        let closed = vec![count(day(2024, 1, 2), 1)];
        let series = build_trend_series(&created, &closed);

        let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]);
        assert_eq!(columns(&series), (vec![1, 1, 2], vec![0, 1, 1]));
    }

    #[test]
    fn test_series_empty_inputs() {
        assert!(build_trend_series(&[], &[]).is_empty());
    }

    #[test]
    fn test_series_single_side() {
        let closed = vec![count(day(2024, 3, 1), 2), count(day(2024, 3, 4), 1)];
        let series = build_trend_series(&[], &closed);
        assert_eq!(series.len(), 4);
        assert_eq!(columns(&series), (vec![0, 0, 0, 0], vec![2, 2, 2, 3]));
    }

    #[test]
    fn test_series_length_spans_both_inputs() {
        let created = vec![count(day(2024, 2, 10), 3)];
        let closed = vec![count(day(2024, 1, 30), 1), count(day(2024, 3, 1), 1)];
        let series = build_trend_series(&created, &closed);

        let span = (day(2024, 3, 1) - day(2024, 1, 30)).num_days() + 1;
        assert_eq!(series.len() as i64, span);
        assert_eq!(series.first().unwrap().date, day(2024, 1, 30));
        assert_eq!(series.last().unwrap().date, day(2024, 3, 1));
        assert!(series
            .windows(2)
            .all(|w| w[0].created_cumulative <= w[1].created_cumulative
                && w[0].closed_cumulative <= w[1].closed_cumulative));
        assert_eq!(series.last().unwrap().created_cumulative, 3);
        assert_eq!(series.last().unwrap().closed_cumulative, 2);
    }

    // ── trend_from_issues ─────────────────────────────────────────────────────

    #[test]
    fn test_trend_from_issues_scenario() {
        let created = vec![dated("A", "2024-01-01", None), dated("B", "2024-01-03", None)];
        let closed = vec![dated("C", "2023-12-01", Some("2024-01-02"))];
        let series = trend_from_issues(&created, &closed, &TimezoneHandler::default());

        assert_eq!(series.len(), 3);
        assert_eq!(columns(&series), (vec![1, 1, 2], vec![0, 1, 1]));
    }

    #[test]
    fn test_trend_from_issues_ignores_invalid_created() {
        let created = vec![dated("A", "garbage", None), dated("B", "2024-01-01", None)];
        let series = trend_from_issues(&created, &[], &TimezoneHandler::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].created_cumulative, 1);
    }

    #[test]
    fn test_trend_points_serialize_iso_dates() {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let handler = TimezoneHandler::default();
        let series = build_trend_series(&[count(handler.local_date(at), 1)], &[]);
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json[0]["date"], "2024-01-05");
        assert_eq!(json[0]["created_cumulative"], 1);
    }
}
