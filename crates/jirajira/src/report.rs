//! Plain-text rendering of analysis results.
//!
//! Every table is laid out with display widths from `unicode-width`, so
//! accented status names and the `—` placeholder keep columns aligned.

use std::fmt::Write as _;

use jira_core::formatting::{format_count, format_date_label, percentage};
use jira_core::models::{Buckets, DatedIssueRecord};
use jira_data::analysis::{StatusAnalysis, TrendAnalysis};
use jira_data::view_state::{FileSlot, FileStatus, ViewState};
use unicode_width::UnicodeWidthStr;

const TREND_TITLE: &str = "Tendencia de Tickets: Creados vs Cerrados";
const OUTPUT_TITLE: &str = "Análisis de Output";
const EMPTY_BUCKET: &str = "Sin tickets";
const NO_PARENT: &str = "—";

// ── Tables ────────────────────────────────────────────────────────────────────

/// Column alignment within a [`TextTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Minimal fixed-width table: a header row, a rule and the data rows.
struct TextTable {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: &[(&str, Align)]) -> Self {
        Self {
            headers: headers.iter().map(|(h, _)| h.to_string()).collect(),
            align: headers.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }
        widths
    }

    fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();
        out.push_str(&self.render_row(&self.headers, &widths));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.render_row(row, &widths));
            out.push('\n');
        }
        out
    }

    fn render_row(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, &width), align)| pad(cell, width, *align))
            .collect();
        padded.join("  ").trim_end().to_string()
    }
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match align {
        Align::Left => format!("{cell}{fill}"),
        Align::Right => format!("{fill}{cell}"),
    }
}

// ── Status view ───────────────────────────────────────────────────────────────

/// Sprint header followed by the status histogram.
pub fn render_status(analysis: &StatusAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} issues)",
        analysis.sprint.name,
        format_count(analysis.sprint.total_issues)
    );
    if analysis.sprint.total_issues != analysis.issues_parsed as u64 {
        let _ = writeln!(
            out,
            "{} issues in this export",
            format_count(analysis.issues_parsed as u64)
        );
    }
    out.push('\n');

    let total: u32 = analysis.statuses.iter().map(|s| s.count).sum();
    let mut table = TextTable::new(&[
        ("Estado", Align::Left),
        ("Categoría", Align::Left),
        ("Tickets", Align::Right),
        ("%", Align::Right),
    ]);
    for status in &analysis.statuses {
        table.push(vec![
            status.status.clone(),
            status.category.clone(),
            format_count(u64::from(status.count)),
            format!(
                "{:.1}",
                percentage(f64::from(status.count), f64::from(total), 1)
            ),
        ]);
    }
    out.push_str(&table.render());
    out
}

// ── Trend view ────────────────────────────────────────────────────────────────

/// Burn-up table followed by the two output buckets.
pub fn render_trend(analysis: &TrendAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TREND_TITLE}");
    let _ = writeln!(
        out,
        "{} · zona horaria {}",
        analysis.sprint.name, analysis.metadata.timezone
    );
    out.push('\n');

    if analysis.series.is_empty() {
        let _ = writeln!(out, "{EMPTY_BUCKET}");
    } else {
        let mut table = TextTable::new(&[
            ("Fecha", Align::Left),
            (FileSlot::Created.label(), Align::Right),
            (FileSlot::Closed.label(), Align::Right),
        ]);
        for point in &analysis.series {
            table.push(vec![
                format_date_label(point.date),
                format_count(u64::from(point.created_cumulative)),
                format_count(u64::from(point.closed_cumulative)),
            ]);
        }
        out.push_str(&table.render());
    }

    if analysis.metadata.invalid_created_dates > 0 {
        let _ = writeln!(
            out,
            "{} issues sin fecha de creación válida",
            analysis.metadata.invalid_created_dates
        );
    }

    out.push('\n');
    out.push_str(&render_buckets(&analysis.buckets));
    out
}

/// Output analysis: one section per bucket.
pub fn render_buckets(buckets: &Buckets) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{OUTPUT_TITLE}");
    for (title, issues) in [
        (Buckets::IMPORTANT_TITLE, &buckets.important),
        (Buckets::REST_TITLE, &buckets.rest),
    ] {
        out.push('\n');
        let _ = writeln!(out, "{title} ({})", issues.len());
        out.push_str(&render_issue_table(issues));
    }
    out
}

fn render_issue_table(issues: &[DatedIssueRecord]) -> String {
    if issues.is_empty() {
        return format!("{EMPTY_BUCKET}\n");
    }
    let mut table = TextTable::new(&[
        ("Tipo", Align::Left),
        ("Ticket", Align::Left),
        ("Épica", Align::Left),
        ("Estado", Align::Left),
    ]);
    for record in issues {
        table.push(vec![
            record.issue.issue_type.clone(),
            record.key().to_string(),
            record.parent.clone().unwrap_or_else(|| NO_PARENT.to_string()),
            record.issue.status.clone(),
        ]);
    }
    table.render()
}

// ── File status ───────────────────────────────────────────────────────────────

/// One line per input file with its load status.
pub fn render_file_status(state: &ViewState) -> String {
    let mut out = String::new();
    for slot in [FileSlot::Created, FileSlot::Closed] {
        let file = state.slot(slot);
        let path = file
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let detail = match file.status {
            FileStatus::Empty => "sin archivo".to_string(),
            FileStatus::Loading => "cargando".to_string(),
            FileStatus::Loaded => format!(
                "{} issues",
                file.issues.as_ref().map(Vec::len).unwrap_or(0)
            ),
            FileStatus::Error => format!("error: {}", file.error.as_deref().unwrap_or("")),
        };
        let _ = writeln!(out, "{}: {} {}", slot.label(), path, detail);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
