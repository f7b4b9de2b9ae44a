use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{JiraError, Result};
use crate::models::BucketMode;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Status histograms and created-vs-closed trends from Jira XML exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jirajira",
    about = "Status histograms and created-vs-closed trends from Jira XML exports",
    version
)]
pub struct Settings {
    /// View mode
    #[arg(long, default_value = "trend", value_parser = ["status", "trend"])]
    pub view: String,

    /// Export to summarise in the status view
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Export of created issues (trend view)
    #[arg(long)]
    pub created_file: Option<PathBuf>,

    /// Export of closed issues (trend view)
    #[arg(long)]
    pub closed_file: Option<PathBuf>,

    /// How the output analysis splits issues by label
    #[arg(long, default_value = "merged", value_parser = ["merged", "legacy"])]
    pub bucket_mode: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Timezone used for calendar days (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.jirajira/last_used.json`.
///
/// Input files are never persisted; every run names its exports explicitly.
/// The view depends on which files were given, so it is not persisted either.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_mode: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".jirajira").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. clap stores the arg id under the field name.
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "bucket_mode") {
            if let Some(v) = last.bucket_mode {
                settings.bucket_mode = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Check that the files required by the selected view were given.
    pub fn validate(&self) -> Result<()> {
        match self.view.as_str() {
            "status" if self.file.is_none() => Err(JiraError::Config(
                "the status view needs --file".to_string(),
            )),
            "trend" if self.created_file.is_none() || self.closed_file.is_none() => {
                Err(JiraError::Config(
                    "the trend view needs --created-file and --closed-file".to_string(),
                ))
            }
            "status" | "trend" => Ok(()),
            other => Err(JiraError::Config(format!("unknown view: {other}"))),
        }
    }

    /// Parsed bucket mode; unknown persisted values fall back to the default.
    pub fn bucket_mode(&self) -> BucketMode {
        self.bucket_mode.parse().unwrap_or_default()
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }

    /// Resolve the `"auto"` timezone and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            timezone: Some(s.timezone.clone()),
            format: Some(s.format.clone()),
            bucket_mode: Some(s.bucket_mode.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        list.iter().map(|a| a.into()).collect()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            timezone: Some("Europe/Madrid".to_string()),
            format: Some("json".to_string()),
            bucket_mode: Some("legacy".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.timezone.as_deref(), Some("Europe/Madrid"));
        assert_eq!(loaded.format.as_deref(), Some("json"));
        assert_eq!(loaded.bucket_mode.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.timezone.is_none());
        assert!(loaded.format.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());
        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    // ── Settings parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["jirajira"]);
        assert_eq!(settings.view, "trend");
        assert_eq!(settings.bucket_mode, "merged");
        assert_eq!(settings.format, "text");
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.file.is_none());
        assert!(settings.created_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_files() {
        let settings = Settings::parse_from([
            "jirajira",
            "--created-file",
            "in.xml",
            "--closed-file",
            "out.xml",
        ]);
        assert_eq!(settings.created_file, Some(PathBuf::from("in.xml")));
        assert_eq!(settings.closed_file, Some(PathBuf::from("out.xml")));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validate_missing_files() {
        let status = Settings::parse_from(["jirajira", "--view", "status"]);
        assert!(matches!(status.validate(), Err(JiraError::Config(_))));

        let trend = Settings::parse_from(["jirajira", "--created-file", "in.xml"]);
        assert!(matches!(trend.validate(), Err(JiraError::Config(_))));
    }

    #[test]
    fn test_settings_bucket_mode_parsed() {
        let settings = Settings::parse_from(["jirajira", "--bucket-mode", "legacy"]);
        assert_eq!(settings.bucket_mode(), BucketMode::Legacy);
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            format: Some("json".to_string()),
            timezone: Some("UTC".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["jirajira"]), &config_path);
        assert_eq!(settings.format, "json");
        assert_eq!(settings.timezone, "UTC");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            format: Some("json".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["jirajira", "--format", "text"]),
            &config_path,
        );
        assert_eq!(settings.format, "text");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");

        Settings::load_with_last_used_impl(args(&["jirajira", "--clear"]), &config_path);
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            args(&["jirajira", "--debug"]),
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            args(&["jirajira", "--view", "status", "--timezone", "Europe/Madrid"]),
            &config_path,
        );

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.timezone.as_deref(), Some("Europe/Madrid"));
        assert!(!std::fs::read_to_string(&config_path)
            .expect("read config")
            .contains("view"));
    }

    #[test]
    fn test_trend_run_after_status_run_keeps_default_view() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let status = Settings::load_with_last_used_impl(
            args(&["jirajira", "--view", "status", "--file", "x.xml"]),
            &config_path,
        );
        assert_eq!(status.view, "status");
        assert!(status.validate().is_ok());

        let trend = Settings::load_with_last_used_impl(
            args(&["jirajira", "--created-file", "in.xml", "--closed-file", "out.xml"]),
            &config_path,
        );
        assert_eq!(trend.view, "trend");
        assert!(trend.validate().is_ok());
    }

    #[test]
    fn test_load_with_last_used_ignores_saved_view_from_older_config() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        std::fs::create_dir_all(config_path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&config_path, r#"{"view":"status","format":"json"}"#).expect("write");

        let settings = Settings::load_with_last_used_impl(args(&["jirajira"]), &config_path);
        assert_eq!(settings.view, "trend");
        assert_eq!(settings.format, "json");
    }
}
