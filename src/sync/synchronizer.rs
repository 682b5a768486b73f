use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::mapper::{
    build_description, build_project_name, determine_section_id, issue_key, task_content,
    to_task_request,
};
use crate::config::AppConfig;
use crate::error::SyncError;
use crate::model::issue::Issue;
use crate::model::task::{Project, SectionBucket, SectionMap, Task, TaskUpdate};
use crate::providers::TaskBackend;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Skipped,
}

/// Fields of `task` that no longer match what `issue` maps to.
///
/// The section only counts when the issue maps to one; a task is never moved
/// out of a section.
pub fn plan_update(issue: &Issue, task: &Task, expected_section: Option<&str>) -> TaskUpdate {
    let mut update = TaskUpdate::default();

    let content = task_content(issue);
    if task.content != content {
        update.content = Some(content);
    }

    if let Some(section_id) = expected_section {
        if task.section_id() != Some(section_id) {
            update.section_id = Some(section_id.to_string());
        }
    }

    let description = build_description(issue);
    if task.description != description {
        update.description = Some(description);
    }

    update
}

/// Index tasks by the issue iid in their title, skipping tasks this tool did
/// not create.
pub fn index_tasks(tasks: Vec<Task>) -> HashMap<String, Task> {
    tasks
        .into_iter()
        .filter_map(|task| {
            let key = issue_key(&task.content)?.to_string();
            Some((key, task))
        })
        .collect()
}

/// Mirrors a set of issues into one Todoist project.
///
/// Setup (connection, project, sections, existing tasks) fails the whole run;
/// after that each issue is handled on its own and a failure only skips it.
pub struct Synchronizer<'a> {
    config: &'a AppConfig,
    backend: &'a dyn TaskBackend,
}

impl<'a> Synchronizer<'a> {
    pub fn new(config: &'a AppConfig, backend: &'a dyn TaskBackend) -> Self {
        Self { config, backend }
    }

    pub async fn run(&self, issues: &[Issue]) -> Result<SyncStats, SyncError> {
        self.backend
            .validate_connection()
            .await
            .map_err(|source| SyncError::Connectivity {
                service: self.backend.name().to_string(),
                source,
            })?;

        let project = self
            .resolve_project()
            .await
            .map_err(|source| SyncError::Setup {
                phase: "project",
                source,
            })?;

        let sections = self
            .resolve_sections(&project.id)
            .await
            .map_err(|source| SyncError::Setup {
                phase: "section",
                source,
            })?;

        let existing = self
            .backend
            .list_tasks(&project.id)
            .await
            .map(index_tasks)
            .map_err(|source| SyncError::Setup {
                phase: "task list",
                source,
            })?;
        info!(count = existing.len(), "found existing tasks");

        let mut stats = SyncStats::default();
        for issue in issues {
            match self.sync_issue(issue, &project.id, &sections, &existing).await {
                Ok(outcome) => stats.record(outcome),
                Err(source) => {
                    let err = SyncError::Issue {
                        iid: issue.iid.clone(),
                        source,
                    };
                    warn!("skipping issue: {:#}", anyhow::Error::from(err));
                    stats.failed += 1;
                }
            }
        }

        info!(
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            failed = stats.failed,
            "sync finished"
        );
        Ok(stats)
    }

    async fn resolve_project(&self) -> Result<Project> {
        let name = build_project_name(
            self.config.todoist_project.as_deref(),
            &self.config.project_path,
            self.config.milestone.as_deref(),
        );

        if let Some(project) = self.backend.find_project_by_name(&name).await? {
            info!(name = %project.name, id = %project.id, "using existing project");
            return Ok(project);
        }

        info!(%name, "creating project");
        self.backend.create_project(&name).await
    }

    async fn resolve_sections(&self, project_id: &str) -> Result<SectionMap> {
        let mut sections = SectionMap::new();

        for bucket in SectionBucket::ALL {
            let name = bucket.display_name();
            let section = match self.backend.find_section_by_name(project_id, name).await? {
                Some(section) => section,
                None => self
                    .backend
                    .create_section(project_id, name, bucket.order())
                    .await
                    .with_context(|| format!("Failed to create section '{name}'"))?,
            };
            sections.insert(bucket, section.id);
        }

        debug!(?sections, "sections ready");
        Ok(sections)
    }

    async fn sync_issue(
        &self,
        issue: &Issue,
        project_id: &str,
        sections: &SectionMap,
        existing: &HashMap<String, Task>,
    ) -> Result<Outcome> {
        let section_id = determine_section_id(issue, sections);

        let Some(task) = existing.get(&issue.iid) else {
            let request = to_task_request(issue, project_id, section_id);
            let created = self
                .backend
                .create_task(&request)
                .await
                .context("task creation failed")?;
            info!(iid = %issue.iid, title = %issue.title, id = %created.id, "task created");
            return Ok(Outcome::Created);
        };

        let update = plan_update(issue, task, section_id);
        if update.is_empty() {
            debug!(iid = %issue.iid, "task up to date");
            return Ok(Outcome::Skipped);
        }

        self.backend
            .update_task(&task.id, &update)
            .await
            .context("task update failed")?;
        info!(iid = %issue.iid, title = %issue.title, "task updated");
        Ok(Outcome::Updated)
    }
}
