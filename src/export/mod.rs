pub mod csv_import;
pub mod markdown;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{AppConfig, ExportFormat};
use crate::error::SyncError;
use crate::model::issue::Issue;
use csv_import::{write_import_csv, CsvLayout};
use markdown::{write_meeting_notes, NotesHeader};

/// Write `issues` to the configured output file and return its path.
pub fn export_to_file(
    config: &AppConfig,
    issues: &[Issue],
    now: NaiveDateTime,
) -> Result<PathBuf, SyncError> {
    let path = config.output_path(now.date());

    write_export(config, issues, &path, now).map_err(|source| SyncError::Format {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), count = issues.len(), "export written");
    Ok(path)
}

fn write_export(
    config: &AppConfig,
    issues: &[Issue],
    path: &Path,
    now: NaiveDateTime,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    match config.format {
        ExportFormat::Csv => {
            let layout = if config.structured {
                CsvLayout::Structured {
                    project: config.milestone_filter().map(String::from),
                }
            } else {
                CsvLayout::Flat
            };
            write_import_csv(&mut out, issues, &layout)?;
        }
        ExportFormat::Markdown => {
            let header = NotesHeader {
                project_path: &config.project_path,
                milestone: config.milestone_filter(),
                assignee: config.assignee.as_deref(),
            };
            write_meeting_notes(&mut out, issues, &header, now)?;
        }
    }

    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
