use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the JiraJira crates.
#[derive(Error, Debug)]
pub enum JiraError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export is not well-formed XML.
    #[error("Failed to parse XML: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The export parsed but contained no `<item>` nodes.
    #[error("No issues found in {0}")]
    NoIssues(PathBuf),

    /// A timezone name is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JiraError {
    /// `true` for errors caused by the content of an export rather than the
    /// environment. The per-file load status words these as invalid exports.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, JiraError::XmlParse(_) | JiraError::NoIssues(_))
    }
}

/// Convenience alias used throughout the JiraJira crates.
pub type Result<T> = std::result::Result<T, JiraError>;
