use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::config::ExportFormat;

/// Export GitLab issues to Todoist, either as an import file or live via the
/// Todoist API.
///
/// Every option can also come from the environment, a `.env` file in the
/// working directory, or `~/.gitlab-tasks/config.toml`, in that order of
/// precedence after the command line.
#[derive(Parser, Debug, Default)]
#[command(name = "gitlab-tasks", version)]
pub struct Cli {
    /// GitLab base URL
    #[arg(long, env = "GITLAB_URL")]
    pub gitlab_url: Option<String>,

    /// GitLab API token
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// GitLab project path (group/project)
    #[arg(long, env = "PROJECT_PATH")]
    pub project_path: Option<String>,

    /// Only issues of this milestone; `*` means all milestones
    #[arg(long, env = "MILESTONE_TITLE")]
    pub milestone: Option<String>,

    /// Only issues assigned to this username
    #[arg(long = "assigned", env = "ASSIGNED_USER")]
    pub assignee: Option<String>,

    /// Todoist API token
    #[arg(long, env = "TODOIST_TOKEN", hide_env_values = true)]
    pub todoist_token: Option<String>,

    /// Todoist project name, overriding the derived one
    #[arg(long, env = "TODOIST_PROJECT")]
    pub todoist_project: Option<String>,

    /// Sync to the Todoist API instead of writing a file
    #[arg(long, env = "TODOIST_API", value_parser = BoolishValueParser::new())]
    pub todoist: bool,

    /// Output file for file exports
    #[arg(short, long, env = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// File export format
    #[arg(long, value_enum, env = "EXPORT_FORMAT")]
    pub format: Option<ExportFormat>,

    /// Group CSV rows into a project with open/closed sections
    #[arg(long, env = "STRUCTURED", value_parser = BoolishValueParser::new())]
    pub structured: bool,

    /// Debug-level logging
    #[arg(short, long, env = "VERBOSE", value_parser = BoolishValueParser::new())]
    pub verbose: bool,
}
