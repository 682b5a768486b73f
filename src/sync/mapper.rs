//! Pure GitLab issue -> Todoist task transformations.

use crate::model::issue::Issue;
use crate::model::task::{CreateTaskRequest, SectionBucket, SectionMap};
use crate::util::date::{convert_to_todoist_date, format_date_for_display};
use crate::util::text::{format_labels, truncate_text};

/// Issue descriptions are cut to this many characters in task descriptions.
pub const DESCRIPTION_LIMIT: usize = 300;

pub const DEFAULT_PRIORITY: u8 = 1;

/// Task title: `#<iid> - <title>`. The prefix is what `issue_key` recovers.
pub fn task_content(issue: &Issue) -> String {
    format!("#{} - {}", issue.iid, issue.title)
}

/// Recover the issue iid from a task title written by `task_content`.
///
/// Returns `None` for titles that do not start with `#` or carry an empty
/// key; such tasks are not managed by this tool.
pub fn issue_key(content: &str) -> Option<&str> {
    let rest = content.strip_prefix('#')?;
    let key = match rest.find(" - ") {
        Some(end) => &rest[..end],
        None => rest,
    };
    (!key.is_empty()).then_some(key)
}

pub fn build_description(issue: &Issue) -> String {
    let mut parts = vec![format!("🔗 [GitLab Issue #{}]({})", issue.iid, issue.web_url)];

    if !issue.assignees.is_empty() {
        parts.push(format!("👤 **Assignees:** {}", issue.assignees.join(", ")));
    }

    if !issue.labels.is_empty() {
        parts.push(format!("🏷️ **Labels:** {}", format_labels(&issue.labels)));
    }

    if let Some(due) = issue.due_date() {
        let display = format_date_for_display(&convert_to_todoist_date(due));
        parts.push(format!("📅 **Due Date:** {display}"));
    }

    if !issue.description.is_empty() {
        parts.push(String::new());
        parts.push("**Beschreibung:**".to_string());
        parts.push(truncate_text(&issue.description, DESCRIPTION_LIMIT));
    }

    parts.join("\n")
}

/// Normalised issue labels plus a synthetic `open`/`closed` state label.
pub fn extract_labels(issue: &Issue) -> Vec<String> {
    let mut labels: Vec<String> = issue
        .labels
        .iter()
        .map(|l| l.replace(' ', "_").to_lowercase())
        .collect();

    if issue.is_open() {
        labels.push("open".to_string());
    } else if issue.is_closed() {
        labels.push("closed".to_string());
    }

    labels
}

/// Priority a single label implies, if any. Substring match, case-insensitive.
pub fn label_priority(label: &str) -> Option<u8> {
    let lower = label.to_lowercase();
    if lower.contains("critical") || lower.contains("urgent") {
        Some(4)
    } else if lower.contains("high") || lower.contains("important") {
        Some(3)
    } else if lower.contains("medium") {
        Some(2)
    } else if lower.contains("low") {
        Some(1)
    } else {
        None
    }
}

/// Todoist priority (1-4) from the first label that implies one.
///
/// Labels are scanned in order and the first match wins, so
/// `["medium", "critical"]` yields 2.
pub fn determine_priority(issue: &Issue) -> u8 {
    issue
        .labels
        .iter()
        .find_map(|l| label_priority(l))
        .unwrap_or(DEFAULT_PRIORITY)
}

/// Todoist project name: the explicit override, else the GitLab project path,
/// suffixed with the milestone when one is filtered on.
pub fn build_project_name(
    project_override: Option<&str>,
    project_path: &str,
    milestone: Option<&str>,
) -> String {
    if let Some(name) = project_override.filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    match milestone.filter(|m| !m.is_empty() && *m != "*") {
        Some(milestone) => format!("{project_path} - {milestone}"),
        None => project_path.to_string(),
    }
}

/// Section for the issue's state. Closed issues fall back to the open
/// section when there is no closed one; `None` means "no section".
pub fn determine_section_id<'a>(issue: &Issue, sections: &'a SectionMap) -> Option<&'a str> {
    if issue.is_closed() {
        if let Some(id) = sections.get(&SectionBucket::Closed) {
            return Some(id.as_str());
        }
    }
    sections.get(&SectionBucket::Open).map(String::as_str)
}

pub fn to_task_request(
    issue: &Issue,
    project_id: &str,
    section_id: Option<&str>,
) -> CreateTaskRequest {
    CreateTaskRequest {
        content: task_content(issue),
        description: build_description(issue),
        project_id: project_id.to_string(),
        section_id: section_id.map(String::from),
        labels: extract_labels(issue),
        priority: determine_priority(issue),
        due_date: issue.due_date().map(convert_to_todoist_date),
    }
}
