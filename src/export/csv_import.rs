//! Todoist CSV import format.

use anyhow::Result;
use std::io::Write;

use crate::model::issue::Issue;
use crate::sync::mapper::{determine_priority, extract_labels, task_content};
use crate::util::date::{convert_to_todoist_date, format_date_for_display};

pub const HEADER: [&str; 11] = [
    "TYPE",
    "CONTENT",
    "DESCRIPTION",
    "PRIORITY",
    "INDENT",
    "AUTHOR",
    "RESPONSIBLE",
    "DATE",
    "DATE_LANG",
    "TIMEZONE",
    "LABELS",
];

const DATE_LANG: &str = "de";
const TIMEZONE: &str = "Europe/Berlin";
const DEFAULT_PROJECT: &str = "GitLab Issues";
const OPEN_SECTION: &str = "🔓 Offen";
const CLOSED_SECTION: &str = "✅ Geschlossen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvLayout {
    Flat,
    /// One project row, then open and closed sections.
    Structured { project: Option<String> },
}

/// One row of the import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub kind: &'static str,
    pub content: String,
    pub description: String,
    pub priority: u8,
    pub indent: u8,
    pub responsible: String,
    pub date: String,
    pub labels: String,
}

impl ImportRecord {
    pub fn task(issue: &Issue, indent: u8) -> Self {
        let mut summary = vec![
            format!("🔗 GitLab: {}", issue.web_url),
            format!("IID: {}", issue.iid),
            format!("Status: {}", issue.state),
        ];
        let date = issue
            .due_date()
            .map(convert_to_todoist_date)
            .unwrap_or_default();
        if !date.is_empty() {
            summary.push(format!("📅 Due: {}", format_date_for_display(&date)));
        }

        ImportRecord {
            kind: "task",
            content: task_content(issue),
            description: summary.join(" | "),
            priority: determine_priority(issue),
            indent,
            responsible: issue.assignees.first().cloned().unwrap_or_default(),
            date,
            labels: extract_labels(issue).join(","),
        }
    }

    fn marker(kind: &'static str, name: &str, indent: u8) -> Self {
        ImportRecord {
            kind,
            content: name.to_string(),
            description: String::new(),
            priority: 1,
            indent,
            responsible: String::new(),
            date: String::new(),
            labels: String::new(),
        }
    }

    pub fn to_row(&self) -> [String; 11] {
        [
            self.kind.to_string(),
            self.content.clone(),
            self.description.clone(),
            self.priority.to_string(),
            self.indent.to_string(),
            String::new(),
            self.responsible.clone(),
            self.date.clone(),
            DATE_LANG.to_string(),
            TIMEZONE.to_string(),
            self.labels.clone(),
        ]
    }
}

/// Rows for `issues` in `layout`, without the header.
pub fn build_records(issues: &[Issue], layout: &CsvLayout) -> Vec<ImportRecord> {
    let project = match layout {
        CsvLayout::Flat => return issues.iter().map(|i| ImportRecord::task(i, 1)).collect(),
        CsvLayout::Structured { project } => project.as_deref().unwrap_or(DEFAULT_PROJECT),
    };

    let (open, closed): (Vec<&Issue>, Vec<&Issue>) = issues.iter().partition(|i| i.is_open());

    let mut records = vec![ImportRecord::marker("project", project, 1)];
    for (section, group) in [(OPEN_SECTION, open), (CLOSED_SECTION, closed)] {
        if group.is_empty() {
            continue;
        }
        records.push(ImportRecord::marker("section", section, 2));
        records.extend(group.into_iter().map(|i| ImportRecord::task(i, 3)));
    }
    records
}

pub fn write_import_csv<W: Write>(out: W, issues: &[Issue], layout: &CsvLayout) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;
    for record in build_records(issues, layout) {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}
