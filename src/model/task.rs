use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    pub project_id: String,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub due: Option<Due>,
}

impl Task {
    pub fn section_id(&self) -> Option<&str> {
        self.section_id.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    pub date: String,
}

fn default_priority() -> u8 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateTaskRequest {
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Partial task update; only the fields that are set go over the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.section_id.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub order: i32,
}

/// The two sections every synced project carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionBucket {
    Open,
    Closed,
}

impl SectionBucket {
    pub const ALL: [SectionBucket; 2] = [SectionBucket::Open, SectionBucket::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionBucket::Open => "open",
            SectionBucket::Closed => "closed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SectionBucket::Open => "Offen",
            SectionBucket::Closed => "Geschlossen",
        }
    }

    pub fn order(&self) -> i32 {
        match self {
            SectionBucket::Open => 1,
            SectionBucket::Closed => 2,
        }
    }
}

impl fmt::Display for SectionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section id per bucket within one project.
pub type SectionMap = HashMap<SectionBucket, String>;
