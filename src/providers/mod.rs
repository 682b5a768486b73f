pub mod gitlab;
pub mod todoist;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::SyncError;
use crate::model::issue::{Issue, IssueFilter};
use crate::model::task::{CreateTaskRequest, Project, Section, Task, TaskUpdate};

/// Where issues come from.
#[async_trait]
pub trait IssueSource: Send + Sync {
    fn name(&self) -> &str;
    async fn validate_connection(&self) -> Result<()>;
    /// All issues matching `filter`, across every page.
    async fn fetch_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;
}

/// Where tasks go.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn validate_connection(&self) -> Result<()>;
    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>>;
    async fn create_project(&self, name: &str) -> Result<Project>;
    async fn find_section_by_name(&self, project_id: &str, name: &str) -> Result<Option<Section>>;
    async fn create_section(&self, project_id: &str, name: &str, order: i32) -> Result<Section>;
    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>>;
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task>;
    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task>;
}

pub fn create_source(config: &AppConfig) -> Result<gitlab::GitLabProvider> {
    gitlab::GitLabProvider::new(
        config.gitlab_url.clone(),
        config.gitlab_token.clone(),
        config.project_path.clone(),
    )
}

/// The Todoist backend, or `None` when the run is a file export.
pub fn create_backend(config: &AppConfig) -> Result<Option<todoist::TodoistProvider>> {
    if !config.todoist_api {
        return Ok(None);
    }
    let token = config.todoist_token.clone().unwrap_or_default();
    Ok(Some(todoist::TodoistProvider::new(token)?))
}

/// Turn a non-2xx response into `SyncError::Api`, keeping the body for the log.
pub(crate) async fn expect_success(
    resp: reqwest::Response,
    action: &str,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Api {
        action: action.to_string(),
        status: status.as_u16(),
        body,
    }
    .into())
}

#[cfg(test)]
pub mod fake;
