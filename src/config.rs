use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::SyncError;
use crate::model::issue::IssueFilter;

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_CSV_FILE: &str = "gitlab_issues.csv";

/// Milestone value meaning "every milestone".
pub const ALL_MILESTONES: &str = "*";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Markdown,
}

/// Fully resolved run configuration. Built once in `main` and passed by
/// reference to everything else.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub gitlab_url: String,
    pub gitlab_token: String,
    pub project_path: String,
    pub milestone: Option<String>,
    pub assignee: Option<String>,
    pub todoist_token: Option<String>,
    pub todoist_project: Option<String>,
    pub todoist_api: bool,
    pub format: ExportFormat,
    pub structured: bool,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.project_path.is_empty() {
            return Err(SyncError::Config("project path is required".into()));
        }
        if self.gitlab_token.is_empty() {
            return Err(SyncError::Config("GitLab token is required".into()));
        }
        if self.todoist_api && self.todoist_token.as_deref().unwrap_or("").is_empty() {
            return Err(SyncError::Config(
                "Todoist token is required for API export".into(),
            ));
        }
        Ok(())
    }

    /// Milestone to filter by, or `None` when unset or set to `*`.
    pub fn milestone_filter(&self) -> Option<&str> {
        self.milestone
            .as_deref()
            .filter(|m| !m.is_empty() && *m != ALL_MILESTONES)
    }

    pub fn issue_filter(&self) -> IssueFilter {
        IssueFilter {
            milestone: self.milestone_filter().map(String::from),
            assignee: self.assignee.clone(),
        }
    }

    /// Where file exports go. Markdown defaults to a dated name derived from
    /// the project path and milestone.
    pub fn output_path(&self, today: NaiveDate) -> PathBuf {
        if let Some(path) = &self.output_file {
            return path.clone();
        }
        match self.format {
            ExportFormat::Csv => PathBuf::from(DEFAULT_CSV_FILE),
            ExportFormat::Markdown => {
                let project = self.project_path.replace('/', "-");
                let date = today.format("%Y-%m-%d");
                match self.milestone_filter() {
                    Some(milestone) => PathBuf::from(format!(
                        "{project}-{}-{date}.md",
                        milestone.replace(' ', "-")
                    )),
                    None => PathBuf::from(format!("{project}-{date}.md")),
                }
            }
        }
    }
}

/// Lowest-precedence defaults read from `~/.gitlab-tasks/config.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub gitlab: GitLabSection,
    #[serde(default)]
    pub todoist: TodoistSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct GitLabSection {
    pub url: Option<String>,
    pub token: Option<String>,
    pub project_path: Option<String>,
    pub milestone: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TodoistSection {
    pub token: Option<String>,
    pub project: Option<String>,
    pub api: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputSection {
    pub file: Option<PathBuf>,
    pub format: Option<ExportFormat>,
    pub structured: Option<bool>,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gitlab-tasks")
        .join("config.toml")
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: FileConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

/// Merge CLI/environment values over the config file and validate the result.
pub fn load_config(cli: Cli) -> Result<AppConfig> {
    let file = load_file_config(&config_path())?;
    let config = resolve(cli, file);
    config.validate()?;
    Ok(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn resolve(cli: Cli, file: FileConfig) -> AppConfig {
    AppConfig {
        gitlab_url: non_empty(cli.gitlab_url)
            .or(non_empty(file.gitlab.url))
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string())
            .trim_end_matches('/')
            .to_string(),
        gitlab_token: non_empty(cli.gitlab_token)
            .or(non_empty(file.gitlab.token))
            .unwrap_or_default(),
        project_path: non_empty(cli.project_path)
            .or(non_empty(file.gitlab.project_path))
            .unwrap_or_default(),
        milestone: non_empty(cli.milestone).or(non_empty(file.gitlab.milestone)),
        assignee: non_empty(cli.assignee).or(non_empty(file.gitlab.assignee)),
        todoist_token: non_empty(cli.todoist_token).or(non_empty(file.todoist.token)),
        todoist_project: non_empty(cli.todoist_project).or(non_empty(file.todoist.project)),
        todoist_api: cli.todoist || file.todoist.api.unwrap_or(false),
        format: cli.format.or(file.output.format).unwrap_or_default(),
        structured: cli.structured || file.output.structured.unwrap_or(false),
        output_file: cli.output.or(file.output.file),
        verbose: cli.verbose,
    }
}
