use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::{expect_success, TaskBackend};
use crate::model::task::{CreateTaskRequest, Project, Section, Task, TaskUpdate};

const BASE_URL: &str = "https://api.todoist.com/rest/v2";

pub struct TodoistProvider {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl TodoistProvider {
    pub fn new(token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Todoist HTTP client")?;
        Ok(Self {
            token,
            base_url: BASE_URL.to_string(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        action: &str,
    ) -> Result<T> {
        let resp = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Todoist {action} request failed"))?;
        let resp = expect_success(resp, action).await?;
        resp.json()
            .await
            .with_context(|| format!("Failed to parse Todoist {action} response"))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<T> {
        let resp = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Todoist {action} request failed"))?;
        let resp = expect_success(resp, action).await?;
        resp.json()
            .await
            .with_context(|| format!("Failed to parse Todoist {action} response"))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("projects", &[], "list projects").await
    }

    async fn list_sections(&self, project_id: &str) -> Result<Vec<Section>> {
        self.get("sections", &[("project_id", project_id)], "list sections")
            .await
    }
}

#[async_trait]
impl TaskBackend for TodoistProvider {
    fn name(&self) -> &str {
        "Todoist"
    }

    async fn validate_connection(&self) -> Result<()> {
        self.list_projects().await?;
        Ok(())
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let projects = self.list_projects().await?;
        Ok(projects.into_iter().find(|p| p.name == name))
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        let body = serde_json::json!({ "name": name, "color": "blue" });
        self.post("projects", &body, "create project").await
    }

    async fn find_section_by_name(&self, project_id: &str, name: &str) -> Result<Option<Section>> {
        let sections = self.list_sections(project_id).await?;
        Ok(sections.into_iter().find(|s| s.name == name))
    }

    async fn create_section(&self, project_id: &str, name: &str, order: i32) -> Result<Section> {
        let body = serde_json::json!({
            "project_id": project_id,
            "name": name,
            "order": order,
        });
        self.post("sections", &body, "create section").await
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        self.get("tasks", &[("project_id", project_id)], "list tasks")
            .await
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task> {
        self.post("tasks", request, "create task").await
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        let path = format!("tasks/{}", urlencoding::encode(task_id));
        self.post(&path, update, "update task").await
    }
}
