use serde::{Deserialize, Serialize};

pub const STATE_OPENED: &str = "opened";
pub const STATE_CLOSED: &str = "closed";

/// A GitLab issue as fetched for one run.
///
/// `iid` is the project-scoped issue number and doubles as the key that ties
/// a Todoist task back to its issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub iid: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub state: String,
    pub web_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == STATE_OPENED
    }

    pub fn is_closed(&self) -> bool {
        self.state == STATE_CLOSED
    }

    /// Due date, treating an empty string like a missing one.
    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref().filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub milestone: Option<String>,
    pub assignee: Option<String>,
}
