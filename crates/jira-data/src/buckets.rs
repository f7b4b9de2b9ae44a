//! Label-based split of issues for the output analysis.

use std::collections::HashMap;

use jira_core::models::{BucketMode, Buckets, DatedIssueRecord, IMPORTANT_LABEL, TASK_LABEL};
use tracing::debug;

/// Union of two issue lists keyed by issue key, in first-seen order.
///
/// Records of `first` are inserted like map entries: a repeated key replaces
/// the earlier record in place. A record of `second` is kept only if its key
/// is not present yet, so `first` wins on conflicts.
pub fn merge_by_key(
    first: &[DatedIssueRecord],
    second: &[DatedIssueRecord],
) -> Vec<DatedIssueRecord> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(first.len() + second.len());
    let mut merged: Vec<DatedIssueRecord> = Vec::with_capacity(first.len() + second.len());

    for record in first {
        match index.get(record.key()) {
            Some(&i) => merged[i] = record.clone(),
            None => {
                index.insert(record.key(), merged.len());
                merged.push(record.clone());
            }
        }
    }
    for record in second {
        if !index.contains_key(record.key()) {
            index.insert(record.key(), merged.len());
            merged.push(record.clone());
        }
    }

    debug!(
        "Merged {} + {} issues into {} unique keys",
        first.len(),
        second.len(),
        merged.len()
    );
    merged
}

/// Dedup the created and closed files, then split on the important label.
///
/// Bucket A holds issues labelled [`IMPORTANT_LABEL`]; bucket B holds the
/// rest, unlabelled ones included. Both keep the merged order.
pub fn merge_and_bucketize(
    created_issues: &[DatedIssueRecord],
    closed_issues: &[DatedIssueRecord],
) -> Buckets {
    let (important, rest) = merge_by_key(created_issues, closed_issues)
        .into_iter()
        .partition(|record| record.has_label(IMPORTANT_LABEL));
    Buckets { important, rest }
}

/// Single-file split: [`IMPORTANT_LABEL`] vs [`TASK_LABEL`]. Issues with any
/// other label, or none, appear in neither bucket.
pub fn split_by_labels(issues: &[DatedIssueRecord]) -> Buckets {
    let mut buckets = Buckets::default();
    for record in issues {
        if record.has_label(IMPORTANT_LABEL) {
            buckets.important.push(record.clone());
        } else if record.has_label(TASK_LABEL) {
            buckets.rest.push(record.clone());
        }
    }
    buckets
}

/// Apply the configured bucketing. Legacy mode only looks at the closed file.
pub fn bucketize(
    mode: BucketMode,
    created_issues: &[DatedIssueRecord],
    closed_issues: &[DatedIssueRecord],
) -> Buckets {
    match mode {
        BucketMode::Merged => merge_and_bucketize(created_issues, closed_issues),
        BucketMode::Legacy => split_by_labels(closed_issues),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jira_core::models::{IssueDate, IssueRecord, StatusCategory};

    fn record(key: &str, label: Option<&str>, summary: &str) -> DatedIssueRecord {
        DatedIssueRecord {
            issue: IssueRecord {
                key: key.to_string(),
                summary: summary.to_string(),
                status: "Done".to_string(),
                status_category: StatusCategory::Done,
                assignee: "Ana".to_string(),
                issue_type: "Task".to_string(),
                priority: String::new(),
            },
            created_date: IssueDate::invalid(""),
            resolved_date: None,
            label: label.map(str::to_string),
            parent: None,
        }
    }

    fn keys(records: &[DatedIssueRecord]) -> Vec<&str> {
        records.iter().map(|r| r.key()).collect()
    }

    // ── merge_by_key ──────────────────────────────────────────────────────────

    #[test]
    fn test_merge_first_file_wins() {
        let created = vec![record("A", Some("Inactiva"), "from created")];
        let closed = vec![record("A", Some("Tarea"), "from closed"), record("B", None, "")];
        let merged = merge_by_key(&created, &closed);

        assert_eq!(keys(&merged), vec!["A", "B"]);
        assert_eq!(merged[0].issue.summary, "from created");
        assert_eq!(merged[0].label.as_deref(), Some("Inactiva"));
    }

    #[test]
    fn test_merge_repeated_key_in_first_replaces_in_place() {
        let created = vec![
            record("A", None, "one"),
            record("B", None, ""),
            record("A", None, "two"),
        ];
        let merged = merge_by_key(&created, &[record("A", None, "three")]);
        assert_eq!(keys(&merged), vec!["A", "B"]);
        assert_eq!(merged[0].issue.summary, "two");
    }

    // ── merge_and_bucketize ───────────────────────────────────────────────────

    #[test]
    fn test_merge_and_bucketize_scenario() {
        let created = vec![record("A", Some("Inactiva"), "")];
        let closed = vec![record("A", Some("Tarea"), ""), record("B", Some("Tarea"), "")];
        let buckets = merge_and_bucketize(&created, &closed);

        assert_eq!(keys(&buckets.important), vec!["A"]);
        assert_eq!(keys(&buckets.rest), vec!["B"]);
        assert_eq!(buckets.total(), 2);
    }

    #[test]
    fn test_merge_and_bucketize_sizes_sum_to_unique_keys() {
        let created = vec![
            record("A", Some("Inactiva"), ""),
            record("B", None, ""),
            record("C", Some("Backend"), ""),
        ];
        let closed = vec![
            record("C", Some("Inactiva"), ""),
            record("D", Some("Inactiva"), ""),
            record("B", None, ""),
        ];
        let buckets = merge_and_bucketize(&created, &closed);

        assert_eq!(buckets.total(), 4);
        assert_eq!(keys(&buckets.important), vec!["A", "D"]);
        assert_eq!(keys(&buckets.rest), vec!["B", "C"]);
    }

    #[test]
    fn test_merge_and_bucketize_empty() {
        assert_eq!(merge_and_bucketize(&[], &[]), Buckets::default());
    }

    // ── split_by_labels ───────────────────────────────────────────────────────

    #[test]
    fn test_split_by_labels_drops_other_labels() {
        let issues = vec![
            record("A", Some("Tarea"), ""),
            record("B", Some("Inactiva"), ""),
            record("C", None, ""),
            record("D", Some("Backend"), ""),
            record("E", Some("Tarea"), ""),
        ];
        let buckets = split_by_labels(&issues);
        assert_eq!(keys(&buckets.important), vec!["B"]);
        assert_eq!(keys(&buckets.rest), vec!["A", "E"]);
    }

    // ── bucketize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_bucketize_legacy_uses_closed_file_only() {
        let created = vec![record("X", Some("Inactiva"), "")];
        let closed = vec![record("Y", Some("Tarea"), "")];
        let buckets = bucketize(BucketMode::Legacy, &created, &closed);
        assert!(buckets.important.is_empty());
        assert_eq!(keys(&buckets.rest), vec!["Y"]);

        let merged = bucketize(BucketMode::Merged, &created, &closed);
        assert_eq!(keys(&merged.important), vec!["X"]);
    }
}
