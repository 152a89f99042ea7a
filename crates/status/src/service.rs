//! The operation surface consumed by the HTTP layer.
//!
//! [`StatusService`] validates raw caller input, then dispatches to a single
//! provider, the [`RunAggregator`], or the [`RepositoryFanout`]. A missing
//! required parameter is reported before any port is invoked.

use std::sync::Arc;

use tracing::instrument;

use crate::aggregator::RunAggregator;
use crate::errors::require;
use crate::fanout::RepositoryFanout;
use crate::ports::{RepositoryHost, RunRequest, RunSource};
use crate::{
    Credentials, JenkinsUrl, Owner, Platform, PullRequest, PullRequestState, RepoName, RepoRef,
    Repository, Run, StatusError, StatusResult, Username,
};

/// Runs returned by a single-provider query.
pub const SINGLE_PROVIDER_LIMIT: usize = 5;

/// Builds a [`RepoRef`] from raw query values.
pub fn repo_ref(owner: Option<&str>, repo: Option<&str>) -> StatusResult<RepoRef> {
    let owner = require(owner.and_then(Owner::new), "owner")?;
    let name = require(repo.and_then(RepoName::new), "repo")?;
    Ok(RepoRef::new(owner, name))
}

/// Entry point for every status operation.
pub struct StatusService {
    github: Arc<dyn RunSource>,
    travis: Arc<dyn RunSource>,
    jenkins: Arc<dyn RunSource>,
    aggregator: RunAggregator,
    fanout: RepositoryFanout,
}

impl StatusService {
    /// Wires the service. The combined view aggregates GitHub Actions and
    /// Travis CI only; Jenkins needs a caller-supplied base URL that the
    /// combined view does not take.
    pub fn new(
        github: Arc<dyn RunSource>,
        travis: Arc<dyn RunSource>,
        jenkins: Arc<dyn RunSource>,
        host: Arc<dyn RepositoryHost>,
    ) -> Self {
        let aggregator = RunAggregator::new(vec![github.clone(), travis.clone()]);
        Self {
            github,
            travis,
            jenkins,
            aggregator,
            fanout: RepositoryFanout::new(host),
        }
    }

    /// Sets how many repositories the user-wide pull-request view queries at
    /// once. Defaults to one.
    pub fn with_pr_concurrency(mut self, concurrency: usize) -> Self {
        self.fanout = self.fanout.with_concurrency(concurrency);
        self
    }

    fn source(&self, platform: Platform) -> &Arc<dyn RunSource> {
        match platform {
            Platform::GitHubActions => &self.github,
            Platform::TravisCi => &self.travis,
            Platform::Jenkins => &self.jenkins,
        }
    }

    /// The [`SINGLE_PROVIDER_LIMIT`] most recent runs from one provider.
    ///
    /// `jenkins_url` is required when the provider needs a base URL and
    /// ignored otherwise. Upstream failures are returned whole.
    #[instrument(skip(self, jenkins_url, credentials), fields(repo = %repo, platform = %platform))]
    pub async fn provider_runs(
        &self,
        platform: Platform,
        repo: &RepoRef,
        jenkins_url: Option<&str>,
        credentials: &Credentials,
    ) -> StatusResult<Vec<Run>> {
        let source = self.source(platform);
        let base_url = if source.requires_base_url() {
            Some(require(jenkins_url.and_then(JenkinsUrl::new), "jenkinsUrl")?)
        } else {
            None
        };

        let request = RunRequest {
            repo: repo.clone(),
            credentials: credentials.clone(),
            base_url,
            limit: SINGLE_PROVIDER_LIMIT,
        };
        let mut runs = source.fetch_runs(&request).await?;
        runs.truncate(SINGLE_PROVIDER_LIMIT);
        Ok(runs)
    }

    /// The combined GitHub Actions + Travis CI feed. Never fails.
    pub async fn combined_runs(&self, repo: &RepoRef, credentials: &Credentials) -> Vec<Run> {
        self.aggregator.aggregate(repo, credentials).await
    }

    /// Repositories owned by `username`.
    pub async fn repositories(
        &self,
        username: Option<&str>,
        credentials: &Credentials,
    ) -> StatusResult<Vec<Repository>> {
        let username = require_username(username)?;
        self.fanout.repos_for(&username, credentials).await
    }

    /// Pull requests of one repository, in upstream (newest-first) order.
    pub async fn pull_requests(
        &self,
        repo: &RepoRef,
        state: PullRequestState,
        credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>> {
        self.fanout.list_prs(repo, state, credentials).await
    }

    /// Open pull requests across every repository owned by `username`, each
    /// tagged with its repository, newest first.
    pub async fn all_pull_requests(
        &self,
        username: Option<&str>,
        credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>> {
        let username = require_username(username)?;
        self.fanout.list_all_prs(&username, credentials).await
    }
}

fn require_username(username: Option<&str>) -> Result<Username, StatusError> {
    require(username.and_then(Username::new), "username")
}
