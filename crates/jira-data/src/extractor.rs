//! Field extraction for a single `<item>` node of a Jira XML export.
//!
//! Every field is read through a named rule that carries its own default,
//! so a missing node never fails the record.

use jira_core::models::{DatedIssueRecord, IssueRecord, StatusCategory, UNASSIGNED};
use jira_core::time_utils::TimezoneHandler;
use roxmltree::Node;
use tracing::debug;

// ── Rules ─────────────────────────────────────────────────────────────────────

/// Text of the first descendant element named `tag`.
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub tag: &'static str,
    pub default: &'static str,
    /// Whether a present but blank element also falls back to `default`.
    pub blank_is_missing: bool,
}

impl TextRule {
    pub fn apply(&self, item: Node<'_, '_>) -> String {
        match find_descendant(item, self.tag).map(text_content) {
            Some(text) if !(self.blank_is_missing && text.is_empty()) => text,
            _ => self.default.to_string(),
        }
    }
}

/// Attribute `attr` on the first descendant element named `tag`.
#[derive(Debug, Clone, Copy)]
pub struct AttrRule {
    pub tag: &'static str,
    pub attr: &'static str,
    pub default: &'static str,
}

impl AttrRule {
    pub fn apply(&self, item: Node<'_, '_>) -> String {
        find_descendant(item, self.tag)
            .and_then(|node| node.attribute(self.attr))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.default)
            .to_string()
    }
}

/// Optional text of the first descendant `tag`, restricted to elements whose
/// parent is named `within` when set. Blank text counts as absent.
#[derive(Debug, Clone, Copy)]
pub struct OptionalRule {
    pub tag: &'static str,
    pub within: Option<&'static str>,
}

impl OptionalRule {
    pub fn apply(&self, item: Node<'_, '_>) -> Option<String> {
        item.descendants()
            .skip(1)
            .find(|node| {
                node.has_tag_name(self.tag)
                    && self.within.map_or(true, |parent| {
                        node.parent_element()
                            .is_some_and(|p| p.has_tag_name(parent))
                    })
            })
            .map(text_content)
            .filter(|text| !text.is_empty())
    }
}

pub const KEY: TextRule = TextRule {
    tag: "key",
    default: "",
    blank_is_missing: false,
};
pub const SUMMARY: TextRule = TextRule {
    tag: "summary",
    default: "",
    blank_is_missing: false,
};
pub const STATUS: TextRule = TextRule {
    tag: "status",
    default: "",
    blank_is_missing: false,
};
pub const ISSUE_TYPE: TextRule = TextRule {
    tag: "type",
    default: "",
    blank_is_missing: false,
};
pub const PRIORITY: TextRule = TextRule {
    tag: "priority",
    default: "",
    blank_is_missing: false,
};
pub const ASSIGNEE: TextRule = TextRule {
    tag: "assignee",
    default: UNASSIGNED,
    blank_is_missing: true,
};
pub const STATUS_CATEGORY: AttrRule = AttrRule {
    tag: "statusCategory",
    attr: "key",
    default: "new",
};
pub const CREATED: OptionalRule = OptionalRule {
    tag: "created",
    within: None,
};
pub const RESOLVED: OptionalRule = OptionalRule {
    tag: "resolved",
    within: None,
};
pub const LABEL: OptionalRule = OptionalRule {
    tag: "label",
    within: Some("labels"),
};
pub const PARENT: OptionalRule = OptionalRule {
    tag: "parent",
    within: None,
};

// ── IssueExtractor ────────────────────────────────────────────────────────────

/// Turns `<item>` nodes into issue records.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueExtractor {
    timestamps: TimezoneHandler,
}

impl IssueExtractor {
    /// `timestamps` decides how zone-less dates in the export are read.
    pub fn new(timestamps: TimezoneHandler) -> Self {
        Self { timestamps }
    }

    /// Extract the flat fields of an issue.
    pub fn extract(&self, item: Node<'_, '_>) -> IssueRecord {
        let status_category = StatusCategory::from(STATUS_CATEGORY.apply(item));
        if !status_category.is_known() {
            debug!(
                "Passing through unknown status category \"{}\"",
                status_category
            );
        }

        IssueRecord {
            key: KEY.apply(item),
            summary: SUMMARY.apply(item),
            status: STATUS.apply(item),
            status_category,
            assignee: ASSIGNEE.apply(item),
            issue_type: ISSUE_TYPE.apply(item),
            priority: PRIORITY.apply(item),
        }
    }

    /// Extract an issue together with its lifecycle dates, label and parent.
    pub fn extract_dated(&self, item: Node<'_, '_>) -> DatedIssueRecord {
        let issue = self.extract(item);
        let created_raw = CREATED.apply(item).unwrap_or_default();
        let created_date = self.timestamps.parse_issue_date(&created_raw);
        if !created_date.is_valid() {
            debug!("Issue {} has no usable created date", issue.key);
        }

        DatedIssueRecord {
            created_date,
            resolved_date: RESOLVED
                .apply(item)
                .map(|raw| self.timestamps.parse_issue_date(&raw)),
            label: LABEL.apply(item),
            parent: PARENT.apply(item),
            issue,
        }
    }
}

// ── Node helpers ──────────────────────────────────────────────────────────────

/// First element below `node` (excluding `node` itself) named `tag`.
pub(crate) fn find_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.has_tag_name(tag))
}

/// Concatenated, trimmed text of `node` and all its descendants.
pub(crate) fn text_content(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
