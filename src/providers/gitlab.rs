use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use super::{expect_success, IssueSource};
use crate::error::SyncError;
use crate::model::issue::{Issue, IssueFilter};

const PAGE_SIZE: u32 = 100;

pub struct GitLabProvider {
    base_url: String,
    token: String,
    project_path: String,
    client: reqwest::Client,
}

impl GitLabProvider {
    pub fn new(base_url: String, token: String, project_path: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build GitLab HTTP client")?;
        Ok(Self {
            base_url,
            token,
            project_path,
            client,
        })
    }

    async fn fetch_page(&self, filter: &IssueFilter, after: Option<String>) -> Result<IssuePage> {
        let mut variables = serde_json::json!({
            "projectPath": self.project_path,
            "first": PAGE_SIZE,
            "after": after,
        });
        if let Some(milestone) = &filter.milestone {
            variables["milestoneTitle"] = serde_json::json!([milestone]);
        }
        if let Some(assignee) = &filter.assignee {
            variables["assigneeUsername"] = serde_json::json!(assignee);
        }
        let body = serde_json::json!({ "query": ISSUES_QUERY, "variables": variables });

        let resp = self
            .client
            .post(format!("{}/api/graphql", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .context("GitLab GraphQL request failed")?;
        let resp = expect_success(resp, "GitLab GraphQL query").await?;

        let gql: GqlResponse = resp
            .json()
            .await
            .context("Failed to parse GitLab response")?;
        gql.into_page(&self.project_path)
    }
}

const ISSUES_QUERY: &str = r#"query($projectPath: ID!, $first: Int, $after: String, $milestoneTitle: [String], $assigneeUsername: String) {
  project(fullPath: $projectPath) {
    issues(first: $first, after: $after, milestoneTitle: $milestoneTitle, assigneeUsername: $assigneeUsername) {
      nodes {
        iid title description state webUrl dueDate
        milestone { title }
        labels { nodes { title } }
        assignees { nodes { name username } }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

#[derive(Deserialize)]
struct GqlResponse {
    data: Option<GqlData>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Deserialize)]
struct GqlData {
    project: Option<GqlProject>,
}

#[derive(Deserialize)]
struct GqlProject {
    issues: IssueConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueConnection {
    nodes: Vec<GqlIssue>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlIssue {
    iid: String,
    title: String,
    description: Option<String>,
    state: String,
    web_url: String,
    due_date: Option<String>,
    milestone: Option<GqlMilestone>,
    labels: Option<Nodes<GqlLabel>>,
    assignees: Option<Nodes<GqlUser>>,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct GqlMilestone {
    title: String,
}

#[derive(Deserialize)]
struct GqlLabel {
    title: String,
}

#[derive(Deserialize)]
struct GqlUser {
    name: String,
}

impl GqlResponse {
    fn into_page(self, project_path: &str) -> Result<IssuePage> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(SyncError::GraphQl(err.message).into());
        }
        let project = self
            .data
            .context("No data in GitLab response")?
            .project
            .with_context(|| format!("GitLab project {project_path} not found"))?;

        let connection = project.issues;
        Ok(IssuePage {
            issues: connection.nodes.into_iter().map(Issue::from).collect(),
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }
}

impl From<GqlIssue> for Issue {
    fn from(issue: GqlIssue) -> Self {
        Issue {
            iid: issue.iid,
            title: issue.title,
            description: issue.description.unwrap_or_default(),
            state: issue.state,
            web_url: issue.web_url,
            due_date: issue.due_date.filter(|d| !d.is_empty()),
            labels: issue
                .labels
                .map(|l| l.nodes.into_iter().map(|n| n.title).collect())
                .unwrap_or_default(),
            assignees: issue
                .assignees
                .map(|a| a.nodes.into_iter().map(|n| n.name).collect())
                .unwrap_or_default(),
            milestone: issue.milestone.map(|m| m.title),
        }
    }
}

#[derive(Debug)]
pub(crate) struct IssuePage {
    pub issues: Vec<Issue>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Drive `fetch_page` until the connection reports no next page. A missing
/// cursor also ends the loop, whatever `has_next_page` says.
pub(crate) async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<Issue>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<IssuePage>>,
{
    let mut issues = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let page = fetch_page(after.take()).await?;
        debug!(count = page.issues.len(), "fetched issue page");
        issues.extend(page.issues);

        if !page.has_next_page {
            break;
        }
        match page.end_cursor {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }

    Ok(issues)
}

#[async_trait]
impl IssueSource for GitLabProvider {
    fn name(&self) -> &str {
        "GitLab"
    }

    async fn validate_connection(&self) -> Result<()> {
        info!(url = %self.base_url, "checking GitLab connection");
        let resp = self
            .client
            .get(format!("{}/api/v4/user", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("GitLab is unreachable")?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            bail!("invalid GitLab token");
        }
        expect_success(resp, "GitLab user lookup").await?;

        let encoded = urlencoding::encode(&self.project_path);
        let resp = self
            .client
            .get(format!("{}/api/v4/projects/{encoded}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("GitLab project lookup failed")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            bail!(
                "GitLab project {} not found or not accessible",
                self.project_path
            );
        }
        expect_success(resp, "GitLab project lookup").await?;
        Ok(())
    }

    async fn fetch_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        info!(project = %self.project_path, ?filter, "loading GitLab issues");
        collect_pages(|after| self.fetch_page(filter, after)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_issue_page() {
        let json = r#"{
          "data": {
            "project": {
              "issues": {
                "nodes": [{
                  "iid": "12",
                  "title": "Login broken",
                  "description": null,
                  "state": "opened",
                  "webUrl": "https://gitlab.com/g/r/-/issues/12",
                  "dueDate": "2024-02-15",
                  "milestone": { "title": "v1.0" },
                  "labels": { "nodes": [{ "title": "bug" }, { "title": "High" }] },
                  "assignees": { "nodes": [{ "name": "Alice", "username": "alice" }] }
                }],
                "pageInfo": { "hasNextPage": true, "endCursor": "abc" }
              }
            }
          }
        }"#;
        let gql: GqlResponse = serde_json::from_str(json).unwrap();
        let page = gql.into_page("g/r").unwrap();

        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("abc"));
        let issue = &page.issues[0];
        assert_eq!(issue.iid, "12");
        assert_eq!(issue.description, "");
        assert_eq!(issue.due_date.as_deref(), Some("2024-02-15"));
        assert_eq!(issue.milestone.as_deref(), Some("v1.0"));
        assert_eq!(issue.labels, vec!["bug", "High"]);
        assert_eq!(issue.assignees, vec!["Alice"]);
    }

    #[test]
    fn graphql_errors_surface() {
        let json = r#"{"data": null, "errors": [{"message": "Field 'x' doesn't exist"}]}"#;
        let gql: GqlResponse = serde_json::from_str(json).unwrap();
        let err = gql.into_page("g/r").unwrap_err();
        assert!(err.to_string().contains("Field 'x' doesn't exist"));
    }

    #[test]
    fn missing_project_is_an_error() {
        let json = r#"{"data": {"project": null}}"#;
        let gql: GqlResponse = serde_json::from_str(json).unwrap();
        let err = gql.into_page("g/missing").unwrap_err();
        assert!(err.to_string().contains("g/missing"));
    }
}
