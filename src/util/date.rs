use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

const TODOIST_DATE: &str = "%Y-%m-%d";
const DISPLAY_DATE: &str = "%d.%m.%Y";

/// Shown in place of a due date when the issue has none.
pub const NO_DATE: &str = "Kein Datum";

/// Normalise a GitLab date or timestamp to Todoist's `YYYY-MM-DD`.
///
/// Accepted inputs, tried in order: plain date, UTC timestamp with and
/// without fractional seconds, timestamp with a numeric offset with and
/// without fractional seconds. Timestamps keep the calendar date of their
/// own offset. Anything else is passed through unchanged.
pub fn convert_to_todoist_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    if let Some(date) = parse_known_format(raw) {
        return date.format(TODOIST_DATE).to_string();
    }

    warn!(date = raw, "unknown date format, passing through unchanged");
    raw.to_string()
}

fn parse_known_format(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, TODOIST_DATE) {
        return Some(date);
    }

    for format in ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.fZ"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.date_naive());
        }
    }

    None
}

/// `2024-02-15` -> `15.02.2024`. Unparseable input is returned as is.
pub fn format_date_for_display(date: &str) -> String {
    if date.is_empty() {
        return NO_DATE.to_string();
    }

    match NaiveDate::parse_from_str(date, TODOIST_DATE) {
        Ok(parsed) => parsed.format(DISPLAY_DATE).to_string(),
        Err(_) => date.to_string(),
    }
}
