use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::error::SyncError;
use crate::export::export_to_file;
use crate::providers::{self, IssueSource, TaskBackend};
use crate::sync::synchronizer::{SyncStats, Synchronizer};

#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    NoIssues,
    Synced(SyncStats),
    Exported(PathBuf),
}

/// Build the real clients from `config` and run once.
pub async fn run(config: &AppConfig) -> Result<RunOutcome> {
    let source = providers::create_source(config)?;
    let backend = providers::create_backend(config)?;
    let backend = backend.as_ref().map(|b| b as &dyn TaskBackend);

    let outcome = execute(config, &source, backend, Local::now().naive_local()).await?;
    Ok(outcome)
}

/// Fetch issues, then either sync them to `backend` or, without one, write
/// them to the export file.
pub async fn execute(
    config: &AppConfig,
    source: &dyn IssueSource,
    backend: Option<&dyn TaskBackend>,
    now: NaiveDateTime,
) -> Result<RunOutcome, SyncError> {
    source
        .validate_connection()
        .await
        .map_err(|err| SyncError::Connectivity {
            service: source.name().to_string(),
            source: err,
        })?;

    let filter = config.issue_filter();
    if let Some(milestone) = &filter.milestone {
        info!(%milestone, "filtering by milestone");
    }
    let issues = source
        .fetch_issues(&filter)
        .await
        .map_err(|err| SyncError::Setup {
            phase: "issue fetch",
            source: err,
        })?;
    info!(count = issues.len(), "issues found");

    if issues.is_empty() {
        info!("no issues found, nothing to do");
        return Ok(RunOutcome::NoIssues);
    }

    match backend {
        Some(backend) => Synchronizer::new(config, backend)
            .run(&issues)
            .await
            .map(RunOutcome::Synced),
        None => export_to_file(config, &issues, now).map(RunOutcome::Exported),
    }
}
