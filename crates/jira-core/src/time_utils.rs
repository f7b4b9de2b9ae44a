use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{JiraError, Result};
use crate::models::IssueDate;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured timezone name into a [`Tz`].
///
/// `"auto"` (or an empty string) means the system timezone.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    let name = if name.is_empty() || name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    };
    name.parse::<Tz>().map_err(|_| JiraError::InvalidTimezone(name))
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses export timestamps and maps them onto local calendar days.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self {
            default_tz: Tz::UTC,
        }
    }
}

impl TimezoneHandler {
    /// Handler that reads zone-less timestamps and calendar days in `tz`.
    pub fn with_tz(tz: Tz) -> Self {
        Self { default_tz: tz }
    }

    /// Parse a timestamp as found in a Jira export into a UTC [`DateTime`].
    ///
    /// Accepted, in order:
    /// * RFC 2822, Jira's native `"Mon, 15 Jan 2024 10:00:00 +0100"`.
    /// * RFC 3339 / ISO 8601 with a `Z` suffix or fixed offset.
    /// * Naive date-times, interpreted in the handler's timezone.
    /// * Bare `YYYY-MM-DD` dates, taken as local midnight so they land on the
    ///   same day under [`TimezoneHandler::local_date`].
    ///
    /// Returns `None` for empty strings or unrecognised formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }

        // Replace trailing 'Z' with '+00:00'.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        const FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ];
        for fmt in FMTS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                use chrono::TimeZone as _;
                if let Some(dt) = self.default_tz.from_local_datetime(&naive).earliest() {
                    return Some(dt.with_timezone(&Utc));
                }
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            use chrono::TimeZone as _;
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return self
                .default_tz
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }

        debug!("TimezoneHandler: could not parse timestamp \"{}\"", s);
        None
    }

    /// Parse `raw` into an [`IssueDate`], keeping the text when it fails.
    pub fn parse_issue_date(&self, raw: &str) -> IssueDate {
        match self.parse_timestamp(raw) {
            Some(at) => IssueDate::valid(at),
            None => IssueDate::invalid(raw.trim()),
        }
    }

    /// Calendar day of `dt` in the handler's timezone.
    pub fn local_date(&self, dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&self.default_tz).date_naive()
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
