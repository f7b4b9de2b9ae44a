//! Per-file load state for the two-export trend view.
//!
//! [`ViewState`] is an immutable value; every change goes through
//! [`ViewState::apply`], which returns the next state.

use std::path::PathBuf;

use jira_core::error::Result;
use jira_core::models::DatedIssueRecord;
use serde::Serialize;

/// Load status of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Empty,
    Loading,
    Loaded,
    Error,
}

/// Which of the two exports an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSlot {
    Created,
    Closed,
}

impl FileSlot {
    /// Label shown next to the file's status ("IN" / "OUT" side of the chart).
    pub fn label(&self) -> &'static str {
        match self {
            FileSlot::Created => "Creados (IN)",
            FileSlot::Closed => "Cerrados (OUT)",
        }
    }
}

/// State of one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotState {
    pub status: FileStatus,
    pub path: Option<PathBuf>,
    pub issues: Option<Vec<DatedIssueRecord>>,
    pub error: Option<String>,
}

/// Events that move the view forward.
#[derive(Debug, Clone)]
pub enum Action {
    LoadStarted(FileSlot, PathBuf),
    LoadSucceeded(FileSlot, Vec<DatedIssueRecord>),
    LoadFailed(FileSlot, String),
    Reset,
}

impl Action {
    /// Completion action for a finished load.
    pub fn from_result(slot: FileSlot, result: Result<Vec<DatedIssueRecord>>) -> Self {
        match result {
            Ok(issues) => Action::LoadSucceeded(slot, issues),
            Err(e) if e.is_parse_error() => {
                Action::LoadFailed(slot, format!("invalid Jira export: {e}"))
            }
            Err(e) => Action::LoadFailed(slot, e.to_string()),
        }
    }
}

/// Load state of the created and closed exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub created: SlotState,
    pub closed: SlotState,
}

impl ViewState {
    /// Return the state that results from `action`.
    ///
    /// A failed load drops any issues previously held by that slot.
    #[must_use]
    pub fn apply(mut self, action: Action) -> Self {
        match action {
            Action::LoadStarted(slot, path) => {
                let state = self.slot_mut(slot);
                state.status = FileStatus::Loading;
                state.path = Some(path);
                state.error = None;
            }
            Action::LoadSucceeded(slot, issues) => {
                let state = self.slot_mut(slot);
                state.status = FileStatus::Loaded;
                state.issues = Some(issues);
                state.error = None;
            }
            Action::LoadFailed(slot, message) => {
                let state = self.slot_mut(slot);
                state.status = FileStatus::Error;
                state.issues = None;
                state.error = Some(message);
            }
            Action::Reset => return ViewState::default(),
        }
        self
    }

    pub fn slot(&self, slot: FileSlot) -> &SlotState {
        match slot {
            FileSlot::Created => &self.created,
            FileSlot::Closed => &self.closed,
        }
    }

    /// Both files loaded: the created and closed issue lists.
    pub fn ready_issues(&self) -> Option<(&[DatedIssueRecord], &[DatedIssueRecord])> {
        match (&self.created, &self.closed) {
            (
                SlotState {
                    status: FileStatus::Loaded,
                    issues: Some(created),
                    ..
                },
                SlotState {
                    status: FileStatus::Loaded,
                    issues: Some(closed),
                    ..
                },
            ) => Some((created.as_slice(), closed.as_slice())),
            _ => None,
        }
    }

    /// Slots currently in the error state, with their messages.
    pub fn errors(&self) -> Vec<(FileSlot, &str)> {
        [FileSlot::Created, FileSlot::Closed]
            .into_iter()
            .filter_map(|slot| {
                let state = self.slot(slot);
                match (state.status, state.error.as_deref()) {
                    (FileStatus::Error, Some(message)) => Some((slot, message)),
                    _ => None,
                }
            })
            .collect()
    }

    fn slot_mut(&mut self, slot: FileSlot) -> &mut SlotState {
        match slot {
            FileSlot::Created => &mut self.created,
            FileSlot::Closed => &mut self.closed,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
