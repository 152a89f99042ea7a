//! Repository listing and pull-request fan-out for one user.
//!
//! [`RepositoryFanout`] resolves the repositories a user owns and queries each
//! one for open pull requests. Repositories are queried one at a time by
//! default, which bounds upstream load per incoming request to a single call.
//! A larger concurrency can be configured; the result is the same either way
//! because outcomes are collected in repository order and sorted afterwards.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, instrument};

use crate::aggregator::collect_isolated;
use crate::ordering::sort_newest_first;
use crate::ports::{PullRequestQuery, RepositoryHost};
use crate::{
    Credentials, Owner, PullRequest, PullRequestState, RepoName, RepoRef, Repository, StatusError,
    StatusResult, Username,
};

/// Page size for the single-repository pull-request listing.
pub const PR_PAGE_SIZE: usize = 20;

/// Page size per repository in the user-wide pull-request view.
pub const USER_PR_PAGE_SIZE: usize = 5;

/// Fans pull-request queries out across a user's repositories.
pub struct RepositoryFanout {
    host: Arc<dyn RepositoryHost>,
    concurrency: usize,
}

impl RepositoryFanout {
    /// Creates a fan-out that queries repositories sequentially.
    pub fn new(host: Arc<dyn RepositoryHost>) -> Self {
        Self {
            host,
            concurrency: 1,
        }
    }

    /// Allows up to `concurrency` pull-request queries in flight at once.
    /// Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Lists the repositories owned by `username`.
    #[instrument(skip(self, credentials), fields(username = %username))]
    pub async fn repos_for(
        &self,
        username: &Username,
        credentials: &Credentials,
    ) -> StatusResult<Vec<Repository>> {
        self.host.list_repositories(username, credentials).await
    }

    /// Lists pull requests of one repository, newest first as returned upstream.
    #[instrument(skip(self, credentials), fields(repo = %repo, state = state.as_str()))]
    pub async fn list_prs(
        &self,
        repo: &RepoRef,
        state: PullRequestState,
        credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>> {
        let query = PullRequestQuery {
            state,
            per_page: PR_PAGE_SIZE,
        };
        self.host.list_pull_requests(repo, &query, credentials).await
    }

    /// Lists open pull requests across every repository owned by `username`.
    ///
    /// A repository whose query fails contributes nothing. Failure to list the
    /// repositories themselves is returned as-is, since there is nothing to
    /// fan out over.
    #[instrument(skip(self, credentials), fields(username = %username, concurrency = self.concurrency))]
    pub async fn list_all_prs(
        &self,
        username: &Username,
        credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>> {
        let repositories = self.repos_for(username, credentials).await?;
        debug!(repositories = repositories.len(), "querying pull requests");

        let outcomes: Vec<_> = stream::iter(repositories)
            .map(|repository| async move {
                let outcome = self.open_prs_for(username, &repository, credentials).await;
                (repository.full_name, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut pulls = collect_isolated(outcomes);
        sort_newest_first(&mut pulls);
        Ok(pulls)
    }

    async fn open_prs_for(
        &self,
        username: &Username,
        repository: &Repository,
        credentials: &Credentials,
    ) -> StatusResult<Vec<PullRequest>> {
        let repo = repo_ref_for(username, repository)?;
        let query = PullRequestQuery {
            state: PullRequestState::Open,
            per_page: USER_PR_PAGE_SIZE,
        };
        let pulls = self
            .host
            .list_pull_requests(&repo, &query, credentials)
            .await?;

        let summary = repository.summary();
        Ok(pulls
            .into_iter()
            .map(|mut pull| {
                pull.repository = Some(summary.clone());
                pull
            })
            .collect())
    }
}

/// Resolves the `owner/name` pair to query, preferring the repository's own
/// `full_name` and falling back to the listed user as owner.
fn repo_ref_for(username: &Username, repository: &Repository) -> StatusResult<RepoRef> {
    let (owner, name) = match repository.full_name.split_once('/') {
        Some((owner, name)) => (Owner::new(owner), RepoName::new(name)),
        None => (
            Owner::new(username.as_str()),
            RepoName::new(repository.name.as_str()),
        ),
    };
    match (owner, name) {
        (Some(owner), Some(name)) => Ok(RepoRef::new(owner, name)),
        _ => Err(StatusError::unhandled(format!(
            "repository '{}' has no usable owner/name",
            repository.full_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{pull_request, repository, FakeRepositoryHost};

    fn alice() -> Username {
        Username::new("alice").unwrap()
    }

    #[tokio::test]
    async fn list_all_prs_isolates_a_failing_repository() {
        let host = Arc::new(
            FakeRepositoryHost::new(vec![repository("alice", "r1"), repository("alice", "r2")])
                .with_pulls(
                    "alice/r1",
                    vec![
                        pull_request(1, "2024-04-01T00:00:00Z"),
                        pull_request(2, "2024-04-03T00:00:00Z"),
                    ],
                )
                .with_failing_pulls("alice/r2"),
        );
        let fanout = RepositoryFanout::new(host.clone());

        let pulls = fanout
            .list_all_prs(&alice(), &Credentials::anonymous())
            .await
            .unwrap();

        assert_eq!(pulls.len(), 2);
        assert_eq!(pulls[0].number, 2);
        assert_eq!(pulls[1].number, 1);
        for pull in &pulls {
            assert_eq!(pull.repository.as_ref().unwrap().full_name, "alice/r1");
        }
        assert_eq!(host.pull_queries().len(), 2);
    }

    #[tokio::test]
    async fn list_all_prs_queries_repositories_in_order_with_small_pages() {
        let host = Arc::new(FakeRepositoryHost::new(vec![
            repository("alice", "a"),
            repository("alice", "b"),
            repository("alice", "c"),
        ]));
        let fanout = RepositoryFanout::new(host.clone());

        fanout
            .list_all_prs(&alice(), &Credentials::anonymous())
            .await
            .unwrap();

        let queries = host.pull_queries();
        let names: Vec<&str> = queries.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["alice/a", "alice/b", "alice/c"]);
        assert!(queries.iter().all(|(_, q)| q.per_page == USER_PR_PAGE_SIZE
            && q.state == PullRequestState::Open));
    }

    #[tokio::test]
    async fn bounded_concurrency_gives_the_same_result() {
        let build = || {
            Arc::new(
                FakeRepositoryHost::new(vec![
                    repository("alice", "a"),
                    repository("alice", "b"),
                    repository("alice", "c"),
                ])
                .with_pulls("alice/a", vec![pull_request(1, "2024-01-01T00:00:00Z")])
                .with_failing_pulls("alice/b")
                .with_pulls("alice/c", vec![pull_request(3, "2024-02-01T00:00:00Z")]),
            )
        };

        let sequential = RepositoryFanout::new(build())
            .list_all_prs(&alice(), &Credentials::anonymous())
            .await
            .unwrap();
        let concurrent = RepositoryFanout::new(build())
            .with_concurrency(3)
            .list_all_prs(&alice(), &Credentials::anonymous())
            .await
            .unwrap();

        assert_eq!(sequential, concurrent);
        assert_eq!(
            sequential.iter().map(|p| p.number).collect::<Vec<_>>(),
            [3, 1]
        );
    }

    #[tokio::test]
    async fn list_all_prs_can_run_on_a_spawned_task() {
        let host = Arc::new(
            FakeRepositoryHost::new(vec![repository("alice", "r1")])
                .with_pulls("alice/r1", vec![pull_request(4, "2024-04-04T00:00:00Z")]),
        );
        let fanout = Arc::new(RepositoryFanout::new(host).with_concurrency(2));

        let task = tokio::spawn({
            let fanout = fanout.clone();
            async move {
                fanout
                    .list_all_prs(&alice(), &Credentials::anonymous())
                    .await
            }
        });
        let pulls = task.await.unwrap().unwrap();

        assert_eq!(pulls.len(), 1);
        assert_eq!(pulls[0].repository.as_ref().unwrap().full_name, "alice/r1");
    }

    #[tokio::test]
    async fn repository_listing_failure_is_surfaced() {
        let fanout = RepositoryFanout::new(Arc::new(FakeRepositoryHost::unavailable()));

        let err = fanout
            .list_all_prs(&alice(), &Credentials::anonymous())
            .await
            .unwrap_err();

        assert!(matches!(err, StatusError::ProviderFailure { .. }));
    }

    #[tokio::test]
    async fn list_prs_requests_a_full_page_without_repository_tag() {
        let host = Arc::new(
            FakeRepositoryHost::new(Vec::new())
                .with_pulls("alice/r1", vec![pull_request(9, "2024-01-01T00:00:00Z")]),
        );
        let fanout = RepositoryFanout::new(host.clone());
        let repo = RepoRef::new(Owner::new("alice").unwrap(), RepoName::new("r1").unwrap());

        let pulls = fanout
            .list_prs(&repo, PullRequestState::Closed, &Credentials::anonymous())
            .await
            .unwrap();

        assert_eq!(pulls.len(), 1);
        assert!(pulls[0].repository.is_none());
        let query = host.pull_queries()[0].1;
        assert_eq!(query.per_page, PR_PAGE_SIZE);
        assert_eq!(query.state, PullRequestState::Closed);
    }

    #[test]
    fn repo_ref_falls_back_to_the_listed_user() {
        let mut repo = repository("alice", "tool");
        repo.full_name = "tool".to_string();
        let resolved = repo_ref_for(&alice(), &repo).unwrap();
        assert_eq!(resolved.full_name(), "alice/tool");
    }
}
