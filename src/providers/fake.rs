//! In-memory stand-ins for the remote services.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{IssueSource, TaskBackend};
use crate::model::issue::{Issue, IssueFilter};
use crate::model::task::{CreateTaskRequest, Due, Project, Section, Task, TaskUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateProject(String),
    CreateSection(String),
    CreateTask(String),
    UpdateTask(String, TaskUpdate),
}

#[derive(Default)]
struct State {
    projects: Vec<Project>,
    sections: Vec<Section>,
    tasks: Vec<Task>,
    calls: Vec<Call>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// Todoist stand-in that applies creates and updates to its own state.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    unreachable: bool,
    fail_sections: bool,
    fail_create_prefix: Option<String>,
}

impl FakeBackend {
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn failing_sections(mut self) -> Self {
        self.fail_sections = true;
        self
    }

    /// Reject task creation for contents starting with `prefix`.
    pub fn failing_create_for(mut self, prefix: &str) -> Self {
        self.fail_create_prefix = Some(prefix.to_string());
        self
    }

    pub fn seed_project(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("p");
        state.projects.push(Project {
            id: id.clone(),
            name: name.to_string(),
            color: "blue".into(),
        });
        id
    }

    pub fn seed_section(&self, project_id: &str, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("s");
        let order = state.sections.len() as i32 + 1;
        state.sections.push(Section {
            id: id.clone(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            order,
        });
        id
    }

    pub fn seed_task(&self, task: Task) {
        self.state.lock().unwrap().tasks.push(task);
    }

    pub fn project_named(&self, name: &str) -> Option<Project> {
        let state = self.state.lock().unwrap();
        state.projects.iter().find(|p| p.name == name).cloned()
    }

    pub fn section_named(&self, project_id: &str, name: &str) -> Option<Section> {
        let state = self.state.lock().unwrap();
        state
            .sections
            .iter()
            .find(|s| s.project_id == project_id && s.name == name)
            .cloned()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait]
impl TaskBackend for FakeBackend {
    fn name(&self) -> &str {
        "Fake"
    }

    async fn validate_connection(&self) -> Result<()> {
        if self.unreachable {
            bail!("connection refused");
        }
        Ok(())
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        Ok(self.project_named(name))
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        let id = self.seed_project(name);
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateProject(name.to_string()));
        Ok(state.projects.iter().find(|p| p.id == id).cloned().unwrap())
    }

    async fn find_section_by_name(&self, project_id: &str, name: &str) -> Result<Option<Section>> {
        if self.fail_sections {
            bail!("sections unavailable");
        }
        Ok(self.section_named(project_id, name))
    }

    async fn create_section(&self, project_id: &str, name: &str, order: i32) -> Result<Section> {
        let mut state = self.state.lock().unwrap();
        let section = Section {
            id: state.next_id("s"),
            project_id: project_id.to_string(),
            name: name.to_string(),
            order,
        };
        state.sections.push(section.clone());
        state.calls.push(Call::CreateSection(name.to_string()));
        Ok(section)
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task> {
        if let Some(prefix) = &self.fail_create_prefix {
            if request.content.starts_with(prefix.as_str()) {
                bail!("fake failure");
            }
        }
        let mut state = self.state.lock().unwrap();
        let task = Task {
            id: state.next_id("t"),
            content: request.content.clone(),
            description: request.description.clone(),
            project_id: request.project_id.clone(),
            section_id: request.section_id.clone(),
            labels: request.labels.clone(),
            priority: request.priority,
            due: request.due_date.clone().map(|date| Due { date }),
        };
        state.tasks.push(task.clone());
        state.calls.push(Call::CreateTask(request.content.clone()));
        Ok(task)
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::UpdateTask(task_id.to_string(), update.clone()));
        let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) else {
            bail!("task {task_id} not found");
        };
        if let Some(content) = &update.content {
            task.content = content.clone();
        }
        if let Some(section_id) = &update.section_id {
            task.section_id = Some(section_id.clone());
        }
        if let Some(description) = &update.description {
            task.description = description.clone();
        }
        Ok(task.clone())
    }
}

/// GitLab stand-in serving a fixed issue list.
#[derive(Default)]
pub struct FakeSource {
    issues: Vec<Issue>,
    unreachable: bool,
    filters: Mutex<Vec<IssueFilter>>,
}

impl FakeSource {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            ..Default::default()
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn filters(&self) -> Vec<IssueFilter> {
        self.filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueSource for FakeSource {
    fn name(&self) -> &str {
        "FakeSource"
    }

    async fn validate_connection(&self) -> Result<()> {
        if self.unreachable {
            bail!("invalid GitLab token");
        }
        Ok(())
    }

    async fn fetch_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.filters.lock().unwrap().push(filter.clone());
        Ok(self.issues.clone())
    }
}
