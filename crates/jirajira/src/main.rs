mod bootstrap;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use jira_core::error::JiraError;
use jira_core::settings::Settings;
use jira_core::time_utils::{resolve_timezone, TimezoneHandler};
use jira_data::analysis::{analyze_status, analyze_trend};
use jira_data::reader::{load_document, load_export, LoadedExport};
use jira_data::view_state::{Action, FileSlot, ViewState};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("JiraJira v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Timezone: {}, Buckets: {}",
        settings.view,
        settings.format,
        settings.timezone,
        settings.bucket_mode
    );

    settings.validate()?;
    let timestamps = TimezoneHandler::with_tz(resolve_timezone(&settings.timezone)?);

    match (settings.view.as_str(), &settings.file) {
        ("status", Some(path)) => run_status(&settings, path).await,
        _ => match (&settings.created_file, &settings.closed_file) {
            (Some(created), Some(closed)) => {
                run_trend(&settings, created, closed, timestamps).await
            }
            _ => bail!("the trend view needs --created-file and --closed-file"),
        },
    }
}

async fn run_status(settings: &Settings, path: &Path) -> Result<()> {
    let owned = path.to_path_buf();
    let xml = tokio::task::spawn_blocking(move || load_document(&owned)).await??;
    let analysis = analyze_status(path, &xml)?;

    if settings.wants_json() {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", report::render_status(&analysis));
    }
    Ok(())
}

async fn run_trend(
    settings: &Settings,
    created_path: &Path,
    closed_path: &Path,
    timestamps: TimezoneHandler,
) -> Result<()> {
    let state = ViewState::default()
        .apply(Action::LoadStarted(FileSlot::Created, created_path.to_path_buf()))
        .apply(Action::LoadStarted(FileSlot::Closed, closed_path.to_path_buf()));

    let (created, closed) = tokio::join!(
        load_in_background(created_path.to_path_buf(), timestamps),
        load_in_background(closed_path.to_path_buf(), timestamps)
    );

    let sprint = closed
        .as_ref()
        .map(LoadedExport::sprint)
        .unwrap_or_default();
    let state = state
        .apply(Action::from_result(
            FileSlot::Created,
            created.map(|export| export.issues),
        ))
        .apply(Action::from_result(
            FileSlot::Closed,
            closed.map(|export| export.issues),
        ));

    eprint!("{}", report::render_file_status(&state));

    let errors = state.errors();
    if !errors.is_empty() {
        let messages: Vec<String> = errors
            .iter()
            .map(|(slot, message)| format!("{}: {}", slot.label(), message))
            .collect();
        bail!(messages.join("; "));
    }

    let Some((created_issues, closed_issues)) = state.ready_issues() else {
        bail!("input files are not loaded");
    };

    let analysis = analyze_trend(
        created_issues,
        closed_issues,
        sprint,
        settings.bucket_mode(),
        &timestamps,
    );

    if settings.wants_json() {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", report::render_trend(&analysis));
    }
    Ok(())
}

/// Load one export on the blocking pool so both files are read concurrently.
async fn load_in_background(
    path: PathBuf,
    timestamps: TimezoneHandler,
) -> jira_core::Result<LoadedExport> {
    let export = tokio::task::spawn_blocking(move || load_export(&path, timestamps))
        .await
        .map_err(|e| JiraError::Other(e.into()))??;
    tracing::info!("Loaded {} issues", export.issues.len());
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = r#"<rss><channel><issue total="1"/>
        <item><key>P-1</key><status>Done</status><created>2024-01-01</created>
            <resolved>2024-01-02</resolved></item>
    </channel></rss>"#;

    #[tokio::test]
    async fn test_load_in_background_reads_and_parses() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("export.xml");
        std::fs::write(&path, EXPORT).expect("write");

        let export = load_in_background(path, TimezoneHandler::default())
            .await
            .expect("load");
        assert_eq!(export.xml, EXPORT);
        assert_eq!(export.issues.len(), 1);
        assert_eq!(export.issues[0].key(), "P-1");
    }

    #[tokio::test]
    async fn test_load_in_background_missing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_in_background(tmp.path().join("missing.xml"), TimezoneHandler::default())
            .await
            .unwrap_err();
        assert!(matches!(err, JiraError::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_load_in_background_without_items() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("empty.xml");
        std::fs::write(&path, "<rss><channel/></rss>").expect("write");

        let err = load_in_background(path, TimezoneHandler::default())
            .await
            .unwrap_err();
        assert!(matches!(err, JiraError::NoIssues(_)));
    }
}
