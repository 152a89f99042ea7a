//! GitHub REST API adapter.
//!
//! One client serves two roles:
//!
//! - [`RunSource`] for GitHub Actions workflow runs. Fields map 1:1.
//! - [`RepositoryHost`] for the repository listing and pull-request queries
//!   behind the user-wide views.
//!
//! Requests authenticate with `Authorization: token {token}` when the caller
//! supplied one, and go out anonymously otherwise.

use async_trait::async_trait;
use serde::Deserialize;
use status::{
    Account, Credentials, Label, Platform, ProviderId, PullRequest, PullRequestQuery, RepoRef,
    Repository, RepositoryHost, Run, RunRequest, RunSource, StatusResult, Upstream, Username,
    UNKNOWN_CONCLUSION,
};
use tracing::{debug, instrument};

use crate::config::endpoint;
use crate::http::{get_json, with_token};
use crate::ProviderError;

/// Page size for the repository listing (GitHub's maximum).
const REPOSITORY_PAGE_SIZE: usize = 100;

const ACCEPT: &str = "application/vnd.github+json";

// ---------------------------------------------------------------------------
// Upstream payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WorkflowRunsPage {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    id: u64,
    name: Option<String>,
    status: Option<String>,
    conclusion: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    html_url: Option<String>,
    head_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    avatar_url: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubLabel {
    name: String,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubPull {
    id: u64,
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    #[serde(default)]
    state: String,
    user: Option<GitHubUser>,
    created_at: Option<String>,
    updated_at: Option<String>,
    html_url: Option<String>,
    base: Option<BranchRef>,
    head: Option<BranchRef>,
    mergeable: Option<bool>,
    mergeable_state: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    labels: Vec<GitHubLabel>,
    #[serde(default)]
    assignees: Vec<GitHubUser>,
    #[serde(default)]
    requested_reviewers: Vec<GitHubUser>,
}

#[derive(Debug, Deserialize)]
struct Permissions {
    #[serde(default)]
    admin: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubRepository {
    id: u64,
    name: String,
    full_name: String,
    description: Option<String>,
    html_url: Option<String>,
    language: Option<String>,
    updated_at: Option<String>,
    permissions: Option<Permissions>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalize_run(run: WorkflowRun) -> Run {
    Run {
        id: ProviderId::from(run.id),
        name: run.name,
        status: run.status,
        conclusion: run
            .conclusion
            .unwrap_or_else(|| UNKNOWN_CONCLUSION.to_string()),
        created_at: run.created_at,
        updated_at: run.updated_at,
        url: run.html_url,
        branch: run.head_branch,
        platform: Platform::GitHubActions,
    }
}

fn normalize_account(user: GitHubUser) -> Account {
    Account {
        login: user.login,
        avatar: user.avatar_url,
        url: user.html_url,
    }
}

fn normalize_pull(pull: GitHubPull) -> PullRequest {
    PullRequest {
        id: ProviderId::from(pull.id),
        number: pull.number,
        title: pull.title,
        body: pull.body,
        state: pull.state,
        author: pull.user.map(normalize_account),
        created_at: pull.created_at,
        updated_at: pull.updated_at,
        url: pull.html_url,
        base_branch: pull.base.and_then(|b| b.name),
        head_branch: pull.head.and_then(|b| b.name),
        mergeable: pull.mergeable,
        mergeable_state: pull.mergeable_state,
        draft: pull.draft,
        labels: pull
            .labels
            .into_iter()
            .map(|label| Label {
                name: label.name,
                color: label.color,
            })
            .collect(),
        assignees: pull.assignees.into_iter().map(normalize_account).collect(),
        requested_reviewers: pull
            .requested_reviewers
            .into_iter()
            .map(normalize_account)
            .collect(),
        repository: None,
    }
}

fn normalize_repository(repo: GitHubRepository) -> Repository {
    Repository {
        id: ProviderId::from(repo.id),
        name: repo.name,
        full_name: repo.full_name,
        description: repo.description,
        url: repo.html_url,
        language: repo.language,
        updated_at: repo.updated_at,
        has_actions: repo.permissions.is_some_and(|p| p.admin),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// GitHub REST client implementing [`RunSource`] and [`RepositoryHost`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }

    fn get(
        &self,
        segments: &[&str],
        credentials: &Credentials,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let url = endpoint(&self.api_url, segments)?;
        debug!(%url, "GitHub request");
        let request = self.http.get(url).header(reqwest::header::ACCEPT, ACCEPT);
        Ok(with_token(request, credentials))
    }
}

#[async_trait]
impl RunSource for GitHubClient {
    fn platform(&self) -> Platform {
        Platform::GitHubActions
    }

    #[instrument(skip(self, request), fields(repo = %request.repo, limit = request.limit))]
    async fn fetch_runs(&self, request: &RunRequest) -> StatusResult<Vec<Run>> {
        let failed = |e: ProviderError| e.for_upstream(Upstream::Ci(Platform::GitHubActions));
        let repo = &request.repo;
        let builder = self
            .get(
                &["repos", repo.owner.as_str(), repo.name.as_str(), "actions", "runs"],
                &request.credentials,
            )
            .map_err(failed)?;
        let page: WorkflowRunsPage = get_json(builder.query(&[("per_page", request.limit)]))
            .await
            .map_err(failed)?;

        Ok(page
            .workflow_runs
            .into_iter()
            .take(request.limit)
            .map(normalize_run)
            .collect())
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    #[instrument(skip(self, credentials), fields(username = %username))]
    async fn list_repositories(
        &self,
        username: &Username,
        credentials: &Credentials,
    ) -> StatusResult<Vec<Repository>> {
        let failed = |e: ProviderError| e.for_upstream(Upstream::RepositoryHost);
        let builder = self
            .get(&["users", username.as_str(), "repos"], credentials)
            .map_err(failed)?;
        let repos: Vec<GitHubRepository> = get_json(builder.query(&[
            ("sort", "updated".to_string()),
            ("per_page", REPOSITORY_PAGE_SIZE.to_string()),
        ]))
        .await
        .map_err(failed)?;

        Ok(repos.into_iter().map(normalize_repository).collect())
    }

    #[instrument(skip(self, query, credentials), fields(repo = %repo, state = query.state.as_str()))]
    async fn list_pull_requests(
        &self,
        repo: &RepoRef,
        query: &PullRequestQuery,
        credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>> {
        let failed = |e: ProviderError| e.for_upstream(Upstream::RepositoryHost);
        let builder = self
            .get(
                &["repos", repo.owner.as_str(), repo.name.as_str(), "pulls"],
                credentials,
            )
            .map_err(failed)?;
        let pulls: Vec<GitHubPull> = get_json(builder.query(&[
            ("state", query.state.as_str().to_string()),
            ("sort", "created".to_string()),
            ("direction", "desc".to_string()),
            ("per_page", query.per_page.to_string()),
        ]))
        .await
        .map_err(failed)?;

        Ok(pulls.into_iter().map(normalize_pull).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn workflow_run_fields_map_one_to_one() {
        let page: WorkflowRunsPage = serde_json::from_value(json!({
            "total_count": 1,
            "workflow_runs": [{
                "id": 30433642,
                "name": "Build",
                "status": "completed",
                "conclusion": "success",
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:05:00Z",
                "html_url": "https://github.com/octo/hello/actions/runs/30433642",
                "head_branch": "main",
                "event": "push"
            }]
        }))
        .unwrap();

        let run = normalize_run(page.workflow_runs.into_iter().next().unwrap());

        assert_eq!(run.id, ProviderId::Number(30433642));
        assert_eq!(run.name.as_deref(), Some("Build"));
        assert_eq!(run.status.as_deref(), Some("completed"));
        assert_eq!(run.conclusion, "success");
        assert_eq!(run.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(run.updated_at.as_deref(), Some("2024-05-01T10:05:00Z"));
        assert_eq!(run.branch.as_deref(), Some("main"));
        assert_eq!(run.platform, Platform::GitHubActions);
    }

    #[test]
    fn page_without_workflow_runs_does_not_decode() {
        let body = json!({"message": "Not Found"});
        let decoded = serde_json::from_value::<WorkflowRunsPage>(body);
        assert!(decoded.is_err());
    }

    #[test]
    fn pending_run_has_unknown_conclusion() {
        let run: WorkflowRun = serde_json::from_value(json!({
            "id": 1,
            "status": "queued",
            "conclusion": null
        }))
        .unwrap();

        let run = normalize_run(run);

        assert_eq!(run.conclusion, UNKNOWN_CONCLUSION);
        assert_eq!(run.status.as_deref(), Some("queued"));
        assert!(run.name.is_none());
    }

    #[test]
    fn pull_request_payload_is_normalized() {
        let pull: GitHubPull = serde_json::from_value(json!({
            "id": 1001,
            "number": 42,
            "title": "Add caching",
            "body": null,
            "state": "open",
            "user": {"login": "octocat", "avatar_url": "https://a/1", "html_url": "https://github.com/octocat"},
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-02T10:00:00Z",
            "html_url": "https://github.com/octo/hello/pull/42",
            "base": {"ref": "main"},
            "head": {"ref": "feature/cache"},
            "draft": true,
            "labels": [{"name": "enhancement", "color": "a2eeef"}],
            "assignees": [{"login": "hubot"}],
            "requested_reviewers": [{"login": "monalisa", "avatar_url": null}]
        }))
        .unwrap();

        let pr = normalize_pull(pull);

        assert_eq!(pr.number, 42);
        assert_eq!(pr.author.as_ref().unwrap().login, "octocat");
        assert_eq!(pr.base_branch.as_deref(), Some("main"));
        assert_eq!(pr.head_branch.as_deref(), Some("feature/cache"));
        assert!(pr.draft);
        assert!(pr.mergeable.is_none());
        assert_eq!(pr.labels[0].name, "enhancement");
        assert_eq!(pr.assignees[0].login, "hubot");
        assert_eq!(pr.requested_reviewers[0].login, "monalisa");
        assert!(pr.repository.is_none());
    }

    #[test]
    fn has_actions_follows_admin_permission() {
        let repos: Vec<GitHubRepository> = serde_json::from_value(json!([
            {"id": 1, "name": "a", "full_name": "o/a", "permissions": {"admin": true, "push": true}},
            {"id": 2, "name": "b", "full_name": "o/b", "permissions": {"admin": false}},
            {"id": 3, "name": "c", "full_name": "o/c"}
        ]))
        .unwrap();

        let flags: Vec<bool> = repos
            .into_iter()
            .map(normalize_repository)
            .map(|r| r.has_actions)
            .collect();

        assert_eq!(flags, [true, false, false]);
    }
}
