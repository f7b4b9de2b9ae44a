//! Jira XML export loading for JiraJira.
//!
//! Reads an RSS-style export into memory and turns its `<item>` nodes into
//! issue records, plus the document-level sprint metadata.

use std::path::Path;

use jira_core::error::{JiraError, Result};
use jira_core::models::{DatedIssueRecord, IssueRecord, SprintInfo, DEFAULT_SPRINT_NAME};
use jira_core::time_utils::TimezoneHandler;
use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, warn};

use crate::extractor::{text_content, IssueExtractor};

/// Jira custom field holding the sprint name. Hard-coded by Jira Cloud and
/// different on other instances.
pub const SPRINT_FIELD_ID: &str = "customfield_10020";

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse every `<item>` of an export into an [`IssueRecord`], in document order.
///
/// A well-formed document without items yields an empty list; malformed XML
/// is a [`JiraError::XmlParse`].
pub fn parse_issues(xml: &str) -> Result<Vec<IssueRecord>> {
    let doc = parse_document(xml)?;
    let extractor = IssueExtractor::default();
    let issues: Vec<IssueRecord> = items(&doc).map(|item| extractor.extract(item)).collect();
    debug!("Parsed {} issues", issues.len());
    Ok(issues)
}

/// Parse every `<item>` into a [`DatedIssueRecord`], in document order.
///
/// `timestamps` decides how zone-less dates are interpreted.
pub fn parse_issues_with_dates(
    xml: &str,
    timestamps: TimezoneHandler,
) -> Result<Vec<DatedIssueRecord>> {
    let doc = parse_document(xml)?;
    let extractor = IssueExtractor::new(timestamps);
    let issues: Vec<DatedIssueRecord> = items(&doc)
        .map(|item| extractor.extract_dated(item))
        .collect();

    let invalid = issues.iter().filter(|i| !i.created_date.is_valid()).count();
    debug!(
        "Parsed {} dated issues ({} without a usable created date)",
        issues.len(),
        invalid
    );
    Ok(issues)
}

/// Read the total issue count and sprint name of an export.
///
/// Never fails: malformed XML and missing nodes give the defaults.
pub fn read_sprint_info(xml: &str) -> SprintInfo {
    let doc = match parse_document(xml) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Sprint info unavailable, using defaults: {}", e);
            return SprintInfo::default();
        }
    };

    let total_issues = doc
        .descendants()
        .find(|n| n.has_tag_name("issue"))
        .and_then(|n| n.attribute("total"))
        .and_then(parse_leading_int)
        .unwrap_or(0);

    let name = doc
        .descendants()
        .find(|n| n.has_tag_name("customfieldvalue") && in_sprint_field(*n))
        .map(text_content)
        .unwrap_or_else(|| DEFAULT_SPRINT_NAME.to_string());

    SprintInfo { name, total_issues }
}

/// Read an export file into memory.
pub fn load_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| JiraError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse already-loaded export text from `path` and require at least one
/// issue, so that callers can flag an unusable file.
pub fn dated_issues_from_export(
    path: &Path,
    xml: &str,
    timestamps: TimezoneHandler,
) -> Result<Vec<DatedIssueRecord>> {
    let issues = parse_issues_with_dates(xml, timestamps)?;
    if issues.is_empty() {
        return Err(JiraError::NoIssues(path.to_path_buf()));
    }
    debug!("File {}: {} issues", path.display(), issues.len());
    Ok(issues)
}

/// An export read from disk together with its parsed issues.
#[derive(Debug, Clone)]
pub struct LoadedExport {
    pub xml: String,
    pub issues: Vec<DatedIssueRecord>,
}

impl LoadedExport {
    /// Sprint header of this export.
    pub fn sprint(&self) -> SprintInfo {
        read_sprint_info(&self.xml)
    }
}

/// Load and parse an export file, requiring at least one issue.
pub fn load_export(path: &Path, timestamps: TimezoneHandler) -> Result<LoadedExport> {
    let xml = load_document(path)?;
    let issues = dated_issues_from_export(path, &xml, timestamps)?;
    Ok(LoadedExport { xml, issues })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_document(xml: &str) -> Result<Document<'_>> {
    // Some exports keep the RSS doctype.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(xml, options)?)
}

fn items<'a, 'input>(doc: &'a Document<'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.descendants().filter(|n| n.has_tag_name("item"))
}

/// Whether `node` sits inside the sprint custom field.
fn in_sprint_field(node: Node<'_, '_>) -> bool {
    node.ancestors()
        .any(|a| a.has_tag_name("customfield") && a.attribute("id") == Some(SPRINT_FIELD_ID))
}

/// Base-10 integer from the leading digits of `raw`, ignoring surrounding
/// whitespace and trailing junk (`"12 issues"` → 12). Negative values and
/// text without leading digits give `None`; values past `u64::MAX` saturate.
fn parse_leading_int(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = unsigned.chars().map_while(|c| c.to_digit(10)).peekable();
    digits.peek()?;
    Some(digits.fold(0u64, |acc, d| {
        acc.saturating_mul(10).saturating_add(u64::from(d))
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
