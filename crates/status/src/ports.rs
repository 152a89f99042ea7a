//! Port traits implemented by the infrastructure crates.
//!
//! The aggregation logic in this crate only ever talks to upstream systems
//! through these traits. The `providers` crate implements them over HTTP;
//! [`crate::fakes`] implements them in memory for tests.
//!
//! Implementations perform exactly one outbound call per method invocation,
//! never retry, and report any upstream fault as
//! [`crate::StatusError::ProviderFailure`].

use async_trait::async_trait;

use crate::{
    Credentials, JenkinsUrl, Platform, PullRequest, PullRequestState, RepoRef, Repository, Run,
    StatusResult, Username,
};

/// Parameters for one [`RunSource::fetch_runs`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub repo: RepoRef,
    pub credentials: Credentials,

    /// Controller base URL for sources that need one (Jenkins). Ignored by
    /// the others.
    pub base_url: Option<JenkinsUrl>,

    /// Maximum number of runs to return, most recent first.
    pub limit: usize,
}

/// One CI provider able to list recent runs for a repository.
#[async_trait]
pub trait RunSource: Send + Sync {
    /// The platform every returned [`Run`] is tagged with.
    fn platform(&self) -> Platform;

    /// Whether [`RunRequest::base_url`] must be supplied.
    ///
    /// Callers check this before invoking [`RunSource::fetch_runs`] so a
    /// missing URL is reported without any outbound call.
    fn requires_base_url(&self) -> bool {
        false
    }

    /// Fetches at most `request.limit` runs, in the provider's own order.
    async fn fetch_runs(&self, request: &RunRequest) -> StatusResult<Vec<Run>>;
}

/// Parameters for one [`RepositoryHost::list_pull_requests`] call.
///
/// Results are always requested sorted by creation time, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestQuery {
    pub state: PullRequestState,
    pub per_page: usize,
}

/// The code host that owns repositories and pull requests (GitHub).
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Lists the repositories owned by `username`.
    async fn list_repositories(
        &self,
        username: &Username,
        credentials: &Credentials,
    ) -> StatusResult<Vec<Repository>>;

    /// Lists pull requests of one repository, passed through in upstream order.
    async fn list_pull_requests(
        &self,
        repo: &RepoRef,
        query: &PullRequestQuery,
        credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>>;
}
