//! Core types for JiraJira.
//!
//! Issue and aggregate models, the shared error type, timestamp handling,
//! display formatting and CLI settings used by the data and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{JiraError, Result};
