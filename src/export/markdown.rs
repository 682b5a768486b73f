//! Meeting notes: an agenda of all issues followed by one note section each.

use chrono::NaiveDateTime;
use std::io::{self, Write};

use crate::model::issue::Issue;
use crate::sync::mapper::label_priority;
use crate::util::date::{convert_to_todoist_date, format_date_for_display};
use crate::util::text::{escape_markdown, format_labels};

pub struct NotesHeader<'a> {
    pub project_path: &'a str,
    pub milestone: Option<&'a str>,
    pub assignee: Option<&'a str>,
}

pub fn state_glyph(state: &str) -> &'static str {
    match state.to_lowercase().as_str() {
        "opened" => "🔵",
        "closed" => "✅",
        "merged" => "🟣",
        _ => "⚪",
    }
}

pub fn state_display_name(state: &str) -> String {
    match state.to_lowercase().as_str() {
        "opened" => "Offen".to_string(),
        "closed" => "Geschlossen".to_string(),
        "merged" => "Gemergt".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Glyph for the first priority-bearing label, or a neutral one.
pub fn priority_glyph(issue: &Issue) -> &'static str {
    match issue.labels.iter().find_map(|l| label_priority(l)) {
        Some(4) | Some(3) => "🔴",
        Some(2) => "🟡",
        Some(_) => "🟢",
        None => "⚪",
    }
}

pub fn write_meeting_notes<W: Write>(
    out: &mut W,
    issues: &[Issue],
    header: &NotesHeader<'_>,
    generated_at: NaiveDateTime,
) -> io::Result<()> {
    writeln!(out, "# Meeting Notes - {}", header.project_path)?;
    writeln!(
        out,
        "**Exportiert am:** {}  ",
        generated_at.format("%Y-%m-%d %H:%M")
    )?;
    if let Some(milestone) = header.milestone {
        writeln!(out, "**Milestone:** {milestone}  ")?;
    }
    if let Some(assignee) = header.assignee {
        writeln!(out, "**Assigned to:** {assignee}  ")?;
    }
    writeln!(out, "**Issues gesamt:** {}\n", issues.len())?;

    writeln!(out, "## 📋 Agenda\n")?;
    for issue in issues {
        let line = format!(
            "- [{} #{}: {}](#issue-{}) {} {}",
            state_glyph(&issue.state),
            issue.iid,
            escape_markdown(&issue.title),
            issue.iid,
            priority_glyph(issue),
            format_labels(&issue.labels)
        );
        writeln!(out, "{}", line.trim_end())?;
    }
    writeln!(out, "\n---\n")?;

    for (index, issue) in issues.iter().enumerate() {
        write_issue_section(out, issue, index + 1, issues.len())?;
    }

    write_footer(out, issues, generated_at)
}

fn write_issue_section<W: Write>(
    out: &mut W,
    issue: &Issue,
    position: usize,
    total: usize,
) -> io::Result<()> {
    writeln!(
        out,
        "## Issue #{}: {} {{#issue-{}}}\n",
        issue.iid,
        escape_markdown(&issue.title),
        issue.iid
    )?;
    writeln!(
        out,
        "**Status:** {} {} | **Priorität:** {} | **Progress:** {position}/{total}\n",
        state_glyph(&issue.state),
        state_display_name(&issue.state),
        priority_glyph(issue)
    )?;

    writeln!(out, "> 📎 **GitLab:** [{0}]({0})  ", issue.web_url)?;
    if !issue.assignees.is_empty() {
        writeln!(out, "> 👤 **Assignee:** {}  ", issue.assignees.join(", "))?;
    }
    if let Some(due) = issue.due_date() {
        let display = format_date_for_display(&convert_to_todoist_date(due));
        writeln!(out, "> 📅 **Due Date:** {display}  ")?;
    }
    if !issue.labels.is_empty() {
        writeln!(out, "> 🏷️ **Labels:** {}  ", format_labels(&issue.labels))?;
    }
    writeln!(out)?;

    if !issue.description.is_empty() {
        writeln!(out, "### 📝 Beschreibung\n")?;
        writeln!(out, "> {}\n", issue.description.replace('\n', "\n> "))?;
    }

    writeln!(out, "### 💬 Meeting Notes\n")?;
    writeln!(out, "**Diskussion:**")?;
    for _ in 0..5 {
        writeln!(out, "- ")?;
    }
    writeln!(out, "\n**Entscheidungen:**")?;
    for _ in 0..3 {
        writeln!(out, "- [ ] ")?;
    }
    writeln!(out, "\n**Nächste Schritte:**")?;
    for _ in 0..3 {
        writeln!(out, "- [ ] ")?;
    }
    writeln!(out, "\n**Release Notes:**\n```\n\n\n```\n")?;
    writeln!(out, "---\n")
}

fn write_footer<W: Write>(
    out: &mut W,
    issues: &[Issue],
    generated_at: NaiveDateTime,
) -> io::Result<()> {
    let open = issues.iter().filter(|i| i.is_open()).count();

    writeln!(out, "## 📋 Meeting Summary\n")?;
    writeln!(
        out,
        "**Offen:** {open} | **Geschlossen:** {}\n",
        issues.len() - open
    )?;
    writeln!(out, "### Gesammelte Action Items")?;
    for _ in 0..8 {
        writeln!(out, "- [ ] ")?;
    }
    writeln!(out, "\n### Follow-up Meeting")?;
    writeln!(out, "**Datum:** _________________  ")?;
    writeln!(out, "**Teilnehmer:** _________________  ")?;
    writeln!(out, "**Themen:** _________________  \n")?;
    writeln!(out, "### Changelog/Release Notes\n```markdown")?;
    writeln!(
        out,
        "## Version X.X.X\n\n### Features\n- \n\n### Fixes\n- \n\n### Changes\n- \n"
    )?;
    writeln!(out, "```\n")?;
    writeln!(out, "---")?;
    writeln!(
        out,
        "*Generiert am {}*",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn issue(iid: &str, title: &str, state: &str, labels: &[&str]) -> Issue {
        Issue {
            iid: iid.into(),
            title: title.into(),
            state: state.into(),
            web_url: format!("https://gitlab.com/g/r/-/issues/{iid}"),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn render(issues: &[Issue], header: &NotesHeader<'_>) -> String {
        let mut out = Vec::new();
        write_meeting_notes(&mut out, issues, header, at()).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn header() -> NotesHeader<'static> {
        NotesHeader {
            project_path: "g/r",
            milestone: None,
            assignee: None,
        }
    }

    #[test]
    fn agenda_lists_every_issue_in_order() {
        let issues = vec![
            issue("1", "Login", "opened", &["High"]),
            issue("2", "Docs", "closed", &[]),
        ];
        let notes = render(&issues, &header());

        assert!(notes.starts_with("# Meeting Notes - g/r\n**Exportiert am:** 2024-02-15 09:30  \n"));
        assert!(notes.contains("**Issues gesamt:** 2\n"));
        assert!(notes.contains("- [🔵 #1: Login](#issue-1) 🔴 `High`\n"));
        assert!(notes.contains("- [✅ #2: Docs](#issue-2) ⚪\n"));
        let first = notes.find("## Issue #1").unwrap();
        let second = notes.find("## Issue #2").unwrap();
        assert!(first < second);
        assert!(notes.contains("**Progress:** 2/2"));
        assert!(notes.ends_with("*Generiert am 2024-02-15 09:30:00*\n"));
    }

    #[test]
    fn header_shows_filters() {
        let notes = render(
            &[],
            &NotesHeader {
                project_path: "g/r",
                milestone: Some("v1.0"),
                assignee: Some("alice"),
            },
        );
        assert!(notes.contains("**Milestone:** v1.0  \n"));
        assert!(notes.contains("**Assigned to:** alice  \n"));
    }

    #[test]
    fn issue_section_metadata_and_description() {
        let mut i = issue("7", "Crash", "opened", &["bug"]);
        i.assignees = vec!["Alice".into()];
        i.due_date = Some("2024-03-01".into());
        i.description = "line one\nline two".into();
        let notes = render(&[i], &header());

        assert!(notes.contains("## Issue #7: Crash {#issue-7}\n"));
        assert!(notes.contains("**Status:** 🔵 Offen"));
        assert!(notes.contains("> 👤 **Assignee:** Alice  \n"));
        assert!(notes.contains("> 📅 **Due Date:** 01.03.2024  \n"));
        assert!(notes.contains("> line one\n> line two\n"));
        assert!(notes.contains("**Offen:** 1 | **Geschlossen:** 0"));
    }

    #[test]
    fn section_without_description_has_no_blockquote_body() {
        let notes = render(&[issue("7", "Crash", "opened", &[])], &header());
        assert!(!notes.contains("### 📝 Beschreibung"));
    }

    #[test]
    fn state_names() {
        assert_eq!(state_display_name("opened"), "Offen");
        assert_eq!(state_display_name("MERGED"), "Gemergt");
        assert_eq!(state_display_name("locked"), "Locked");
        assert_eq!(state_display_name(""), "");
        assert_eq!(state_glyph("weird"), "⚪");
    }

    #[test]
    fn priority_glyphs() {
        assert_eq!(priority_glyph(&issue("1", "t", "opened", &["urgent"])), "🔴");
        assert_eq!(priority_glyph(&issue("1", "t", "opened", &["Medium"])), "🟡");
        assert_eq!(priority_glyph(&issue("1", "t", "opened", &["low"])), "🟢");
        assert_eq!(priority_glyph(&issue("1", "t", "opened", &["bug"])), "⚪");
    }
}
