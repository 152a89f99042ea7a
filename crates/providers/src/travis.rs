//! Travis CI adapter.
//!
//! Travis reports a single `state` per build, so it fills both `status` and
//! `conclusion`. Builds map their start and finish timestamps onto
//! `createdAt` and `updatedAt`; either may be absent for builds that have
//! not started or finished.
//!
//! The builds listing comes in two shapes. Older responses carry a sibling
//! `commits` array joined to builds by `commit_id`; newer ones embed the
//! commit and branch in each build. Both are accepted.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use status::{
    Platform, ProviderId, Run, RunRequest, RunSource, StatusResult, Upstream, UNKNOWN_CONCLUSION,
};
use tracing::{debug, instrument};

use crate::config::endpoint;
use crate::http::{get_json, with_token};
use crate::ProviderError;

const ACCEPT: &str = "application/vnd.travis-ci.2.1+json";

// ---------------------------------------------------------------------------
// Upstream payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BuildsPayload {
    Wrapped {
        builds: Vec<TravisBuild>,
        #[serde(default)]
        commits: Vec<TravisCommit>,
    },
    Bare(Vec<TravisBuild>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BranchField {
    Name(String),
    Object { name: Option<String> },
}

impl BranchField {
    fn into_name(self) -> Option<String> {
        match self {
            Self::Name(name) => Some(name),
            Self::Object { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TravisCommit {
    id: Option<u64>,
    message: Option<String>,
    branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TravisBuild {
    id: u64,
    number: Option<String>,
    state: Option<String>,
    started_at: Option<String>,
    finished_at: Option<String>,
    message: Option<String>,
    commit_id: Option<u64>,
    commit: Option<TravisCommit>,
    branch: Option<BranchField>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Builds carry `number` as a string; fall back to the id when it is absent.
fn fallback_name(build: &TravisBuild) -> String {
    match &build.number {
        Some(number) => format!("Build #{number}"),
        None => format!("Build #{}", build.id),
    }
}

fn normalize_build(
    build: TravisBuild,
    commits: &HashMap<u64, TravisCommit>,
    web_url: &str,
    slug: &str,
) -> Run {
    let linked = build.commit_id.and_then(|id| commits.get(&id));
    let message = build
        .message
        .clone()
        .or_else(|| build.commit.as_ref().and_then(|c| c.message.clone()))
        .or_else(|| linked.and_then(|c| c.message.clone()))
        .filter(|m| !m.trim().is_empty());
    let name = message.unwrap_or_else(|| fallback_name(&build));

    let branch = build
        .branch
        .and_then(BranchField::into_name)
        .or_else(|| build.commit.and_then(|c| c.branch))
        .or_else(|| linked.and_then(|c| c.branch.clone()));

    Run {
        id: ProviderId::from(build.id),
        name: Some(name),
        status: build.state.clone(),
        conclusion: build
            .state
            .unwrap_or_else(|| UNKNOWN_CONCLUSION.to_string()),
        created_at: build.started_at,
        updated_at: build.finished_at,
        url: Some(format!(
            "{}/{}/builds/{}",
            web_url.trim_end_matches('/'),
            slug,
            build.id
        )),
        branch,
        platform: Platform::TravisCi,
    }
}

fn normalize_payload(payload: BuildsPayload, web_url: &str, slug: &str, limit: usize) -> Vec<Run> {
    let (builds, commits) = match payload {
        BuildsPayload::Wrapped { builds, commits } => (builds, commits),
        BuildsPayload::Bare(builds) => (builds, Vec::new()),
    };
    let commits: HashMap<u64, TravisCommit> = commits
        .into_iter()
        .filter_map(|c| c.id.map(|id| (id, c)))
        .collect();

    builds
        .into_iter()
        .take(limit)
        .map(|build| normalize_build(build, &commits, web_url, slug))
        .collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Travis CI builds client implementing [`RunSource`].
#[derive(Debug, Clone)]
pub struct TravisClient {
    http: reqwest::Client,
    api_url: String,
    web_url: String,
}

impl TravisClient {
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        web_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            web_url: web_url.into(),
        }
    }
}

#[async_trait]
impl RunSource for TravisClient {
    fn platform(&self) -> Platform {
        Platform::TravisCi
    }

    #[instrument(skip(self, request), fields(repo = %request.repo, limit = request.limit))]
    async fn fetch_runs(&self, request: &RunRequest) -> StatusResult<Vec<Run>> {
        let failed = |e: ProviderError| e.for_upstream(Upstream::Ci(Platform::TravisCi));
        let repo = &request.repo;
        let url = endpoint(
            &self.api_url,
            &["repos", repo.owner.as_str(), repo.name.as_str(), "builds"],
        )
        .map_err(failed)?;
        debug!(%url, "Travis CI request");

        let builder = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .query(&[("limit", request.limit)]);
        let payload: BuildsPayload = get_json(with_token(builder, &request.credentials))
            .await
            .map_err(failed)?;

        Ok(normalize_payload(
            payload,
            &self.web_url,
            &request.repo.full_name(),
            request.limit,
        ))
    }
}
