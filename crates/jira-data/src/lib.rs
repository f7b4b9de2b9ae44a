//! Data layer for JiraJira.
//!
//! Reads Jira XML exports, extracts issue records, aggregates them by status
//! and calendar day, builds the created-vs-closed burn-up series and splits
//! issues into label buckets.

pub mod aggregator;
pub mod analysis;
pub mod buckets;
pub mod extractor;
pub mod reader;
pub mod trend;
pub mod view_state;

pub use jira_core as core;
