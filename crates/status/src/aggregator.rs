//! Combined run feed across several CI providers for one repository.
//!
//! [`RunAggregator`] queries each configured [`RunSource`] concurrently, drops
//! the contribution of any source that fails, then merges, orders and caps
//! the surviving runs. Partial availability is the expected steady state, so
//! the aggregate itself never fails.

use std::fmt::Display;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{instrument, warn};

use crate::ordering::sort_newest_first;
use crate::ports::{RunRequest, RunSource};
use crate::{Credentials, RepoRef, Run, StatusResult};

/// Runs requested from each provider in the combined view.
pub const COMBINED_PER_SOURCE_LIMIT: usize = 3;

/// Maximum number of runs in the combined view.
pub const COMBINED_CAP: usize = 10;

/// Folds fan-out branch outcomes into one list, treating a failed branch as
/// an empty contribution.
///
/// `branch` identifies the source or repository in the warning emitted for
/// each dropped branch. Successful contributions keep their relative order.
pub fn collect_isolated<K, T, I>(outcomes: I) -> Vec<T>
where
    K: Display,
    I: IntoIterator<Item = (K, StatusResult<Vec<T>>)>,
{
    let mut collected = Vec::new();
    for (branch, outcome) in outcomes {
        match outcome {
            Ok(items) => collected.extend(items),
            Err(error) => warn!(branch = %branch, %error, "dropping failed fan-out branch"),
        }
    }
    collected
}

/// Merges recent runs from several providers into one newest-first feed.
pub struct RunAggregator {
    sources: Vec<Arc<dyn RunSource>>,
    per_source_limit: usize,
    cap: usize,
}

impl RunAggregator {
    /// Creates an aggregator over `sources` with the default limits
    /// ([`COMBINED_PER_SOURCE_LIMIT`] per source, [`COMBINED_CAP`] total).
    ///
    /// Sources that require a base URL should not be included: the combined
    /// view has no way to supply one, so they would always contribute nothing.
    pub fn new(sources: Vec<Arc<dyn RunSource>>) -> Self {
        Self {
            sources,
            per_source_limit: COMBINED_PER_SOURCE_LIMIT,
            cap: COMBINED_CAP,
        }
    }

    /// Overrides the per-source request size and the total cap.
    pub fn with_limits(mut self, per_source_limit: usize, cap: usize) -> Self {
        self.per_source_limit = per_source_limit;
        self.cap = cap;
        self
    }

    /// Returns at most `cap` runs across all sources, newest first.
    ///
    /// All sources are polled concurrently on the current task; none waits
    /// on another before starting. A failing source is logged and skipped.
    #[instrument(skip(self, credentials), fields(repo = %repo, sources = self.sources.len()))]
    pub async fn aggregate(&self, repo: &RepoRef, credentials: &Credentials) -> Vec<Run> {
        let request = RunRequest {
            repo: repo.clone(),
            credentials: credentials.clone(),
            base_url: None,
            limit: self.per_source_limit,
        };

        let branches = self.sources.iter().map(|source| {
            let request = &request;
            async move { (source.platform(), source.fetch_runs(request).await) }
        });
        let outcomes = join_all(branches).await;

        let mut runs = collect_isolated(outcomes);
        sort_newest_first(&mut runs);
        runs.truncate(self.cap);
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{run_at, FakeRunSource};
    use crate::{Owner, Platform, RepoName, StatusError, Upstream};

    fn repo() -> RepoRef {
        RepoRef::new(Owner::new("octo").unwrap(), RepoName::new("hello").unwrap())
    }

    fn github_runs(count: u64) -> Vec<Run> {
        (0..count)
            .map(|i| {
                run_at(
                    Platform::GitHubActions,
                    100 + i,
                    &format!("2024-06-{:02}T12:00:00Z", 20 - i),
                )
            })
            .collect()
    }

    fn travis_runs(count: u64) -> Vec<Run> {
        (0..count)
            .map(|i| {
                run_at(
                    Platform::TravisCi,
                    200 + i,
                    &format!("2024-06-{:02}T18:00:00Z", 20 - i),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn merges_sources_newest_first() {
        let github = Arc::new(FakeRunSource::succeeding(Platform::GitHubActions, github_runs(3)));
        let travis = Arc::new(FakeRunSource::succeeding(Platform::TravisCi, travis_runs(3)));
        let aggregator = RunAggregator::new(vec![github.clone(), travis.clone()]);

        let runs = aggregator.aggregate(&repo(), &Credentials::anonymous()).await;

        assert_eq!(runs.len(), 6);
        let platforms: Vec<Platform> = runs.iter().map(|r| r.platform).collect();
        assert_eq!(
            platforms,
            [
                Platform::TravisCi,
                Platform::GitHubActions,
                Platform::TravisCi,
                Platform::GitHubActions,
                Platform::TravisCi,
                Platform::GitHubActions,
            ]
        );
        assert_eq!(github.last_request().unwrap().limit, COMBINED_PER_SOURCE_LIMIT);
        assert_eq!(travis.calls(), 1);
    }

    #[tokio::test]
    async fn caps_the_merged_feed() {
        let github = Arc::new(FakeRunSource::succeeding(Platform::GitHubActions, github_runs(8)));
        let travis = Arc::new(FakeRunSource::succeeding(Platform::TravisCi, travis_runs(8)));
        let aggregator = RunAggregator::new(vec![github, travis]).with_limits(8, COMBINED_CAP);

        let runs = aggregator.aggregate(&repo(), &Credentials::anonymous()).await;

        assert_eq!(runs.len(), COMBINED_CAP);
        assert!(runs.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn failing_github_leaves_only_travis_runs() {
        let github = Arc::new(FakeRunSource::failing(Platform::GitHubActions));
        let travis = Arc::new(FakeRunSource::succeeding(Platform::TravisCi, travis_runs(3)));
        let aggregator = RunAggregator::new(vec![github, travis]);

        let runs = aggregator.aggregate(&repo(), &Credentials::anonymous()).await;

        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.platform == Platform::TravisCi));
    }

    #[tokio::test]
    async fn failing_travis_leaves_only_github_runs() {
        let github = Arc::new(FakeRunSource::succeeding(Platform::GitHubActions, github_runs(2)));
        let travis = Arc::new(FakeRunSource::failing(Platform::TravisCi));
        let aggregator = RunAggregator::new(vec![github, travis]);

        let runs = aggregator.aggregate(&repo(), &Credentials::anonymous()).await;

        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.platform == Platform::GitHubActions));
    }

    #[tokio::test]
    async fn all_sources_failing_yields_empty_feed() {
        let aggregator = RunAggregator::new(vec![
            Arc::new(FakeRunSource::failing(Platform::GitHubActions)),
            Arc::new(FakeRunSource::failing(Platform::TravisCi)),
        ]);

        let runs = aggregator.aggregate(&repo(), &Credentials::anonymous()).await;

        assert!(runs.is_empty());
    }

    #[tokio::test]
    async fn repeated_calls_produce_identical_output() {
        let aggregator = RunAggregator::new(vec![
            Arc::new(FakeRunSource::succeeding(Platform::GitHubActions, github_runs(3))),
            Arc::new(FakeRunSource::succeeding(Platform::TravisCi, travis_runs(3))),
        ]);

        let first = aggregator.aggregate(&repo(), &Credentials::anonymous()).await;
        let second = aggregator.aggregate(&repo(), &Credentials::anonymous()).await;

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn collect_isolated_skips_errors_and_keeps_order() {
        let outcomes = vec![
            ("a", Ok(vec![1, 2])),
            (
                "b",
                Err(StatusError::provider(Upstream::RepositoryHost, "boom")),
            ),
            ("c", Ok(vec![3])),
        ];
        assert_eq!(collect_isolated(outcomes), [1, 2, 3]);
    }
}
