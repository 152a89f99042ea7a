//! In-memory fakes for the port traits (testing only)
//!
//! Provides [`FakeRunSource`] and [`FakeRepositoryHost`], which return canned
//! outcomes and count every call so tests can assert that validation failures
//! never reach an upstream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{PullRequestQuery, RepositoryHost, RunRequest, RunSource};
use crate::{
    Credentials, Platform, ProviderId, PullRequest, RepoRef, Repository, Run, StatusError,
    StatusResult, Upstream, Username, UNKNOWN_CONCLUSION,
};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// A minimal [`Run`] created at `created_at`.
pub fn run_at(platform: Platform, id: u64, created_at: &str) -> Run {
    Run {
        id: ProviderId::from(id),
        name: Some(format!("run {id}")),
        status: Some("completed".to_string()),
        conclusion: UNKNOWN_CONCLUSION.to_string(),
        created_at: Some(created_at.to_string()),
        updated_at: Some(created_at.to_string()),
        url: None,
        branch: Some("main".to_string()),
        platform,
    }
}

/// A repository descriptor for `owner/name`.
pub fn repository(owner: &str, name: &str) -> Repository {
    Repository {
        id: ProviderId::from(name.len() as u64),
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        description: None,
        url: Some(format!("https://github.com/{owner}/{name}")),
        language: Some("Rust".to_string()),
        updated_at: None,
        has_actions: false,
    }
}

/// An open pull request `#number` created at `created_at`.
pub fn pull_request(number: u64, created_at: &str) -> PullRequest {
    PullRequest {
        id: ProviderId::from(number * 1000),
        number,
        title: format!("PR {number}"),
        body: None,
        state: "open".to_string(),
        author: None,
        created_at: Some(created_at.to_string()),
        updated_at: Some(created_at.to_string()),
        url: None,
        base_branch: Some("main".to_string()),
        head_branch: Some(format!("feature-{number}")),
        mergeable: None,
        mergeable_state: None,
        draft: false,
        labels: Vec::new(),
        assignees: Vec::new(),
        requested_reviewers: Vec::new(),
        repository: None,
    }
}

// ---------------------------------------------------------------------------
// FakeRunSource
// ---------------------------------------------------------------------------

/// A [`RunSource`] returning a fixed outcome.
#[derive(Debug)]
pub struct FakeRunSource {
    platform: Platform,
    outcome: StatusResult<Vec<Run>>,
    requires_base_url: bool,
    calls: AtomicUsize,
    last_request: Mutex<Option<RunRequest>>,
}

impl FakeRunSource {
    pub fn succeeding(platform: Platform, runs: Vec<Run>) -> Self {
        Self {
            platform,
            outcome: Ok(runs),
            requires_base_url: false,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(platform: Platform) -> Self {
        Self {
            outcome: Err(StatusError::provider(
                Upstream::Ci(platform),
                "HTTP 503 Service Unavailable",
            )),
            ..Self::succeeding(platform, Vec::new())
        }
    }

    /// Marks the source as needing a base URL, like Jenkins.
    pub fn requiring_base_url(mut self) -> Self {
        self.requires_base_url = true;
        self
    }

    /// Number of `fetch_runs` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RunRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunSource for FakeRunSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn requires_base_url(&self) -> bool {
        self.requires_base_url
    }

    async fn fetch_runs(&self, request: &RunRequest) -> StatusResult<Vec<Run>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.outcome
            .clone()
            .map(|runs| runs.into_iter().take(request.limit).collect())
    }
}

// ---------------------------------------------------------------------------
// FakeRepositoryHost
// ---------------------------------------------------------------------------

/// A [`RepositoryHost`] serving canned repositories and pull requests.
///
/// Pull-request outcomes are keyed by `owner/name`; repositories without an
/// entry have no pull requests.
#[derive(Debug)]
pub struct FakeRepositoryHost {
    repositories: StatusResult<Vec<Repository>>,
    pulls: HashMap<String, StatusResult<Vec<PullRequest>>>,
    repository_calls: AtomicUsize,
    pull_queries: Mutex<Vec<(String, PullRequestQuery)>>,
}

impl FakeRepositoryHost {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self {
            repositories: Ok(repositories),
            pulls: HashMap::new(),
            repository_calls: AtomicUsize::new(0),
            pull_queries: Mutex::new(Vec::new()),
        }
    }

    /// A host whose repository listing fails.
    pub fn unavailable() -> Self {
        Self {
            repositories: Err(StatusError::provider(
                Upstream::RepositoryHost,
                "HTTP 502 Bad Gateway",
            )),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_pulls(mut self, full_name: &str, pulls: Vec<PullRequest>) -> Self {
        self.pulls.insert(full_name.to_string(), Ok(pulls));
        self
    }

    pub fn with_failing_pulls(mut self, full_name: &str) -> Self {
        self.pulls.insert(
            full_name.to_string(),
            Err(StatusError::provider(Upstream::RepositoryHost, "HTTP 500")),
        );
        self
    }

    pub fn repository_calls(&self) -> usize {
        self.repository_calls.load(Ordering::SeqCst)
    }

    /// Every pull-request query received, in call order.
    pub fn pull_queries(&self) -> Vec<(String, PullRequestQuery)> {
        self.pull_queries.lock().unwrap().clone()
    }

    /// Total upstream calls of either kind.
    pub fn total_calls(&self) -> usize {
        self.repository_calls() + self.pull_queries.lock().unwrap().len()
    }
}

#[async_trait]
impl RepositoryHost for FakeRepositoryHost {
    async fn list_repositories(
        &self,
        _username: &Username,
        _credentials: &Credentials,
    ) -> StatusResult<Vec<Repository>> {
        self.repository_calls.fetch_add(1, Ordering::SeqCst);
        self.repositories.clone()
    }

    async fn list_pull_requests(
        &self,
        repo: &RepoRef,
        query: &PullRequestQuery,
        _credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>> {
        let key = repo.full_name();
        self.pull_queries.lock().unwrap().push((key.clone(), *query));
        match self.pulls.get(&key) {
            Some(outcome) => outcome
                .clone()
                .map(|pulls| pulls.into_iter().take(query.per_page).collect()),
            None => Ok(Vec::new()),
        }
    }
}
