//! Jenkins adapter.
//!
//! Jenkins has no fixed host, so every request carries the controller base
//! URL. The job path is synthesized as `{owner}-{repo}`. Builds expose a
//! single epoch-millisecond timestamp, which fills both `createdAt` and
//! `updatedAt`, and no branch, so `branch` is always [`UNAVAILABLE_BRANCH`].
//!
//! A supplied credential is sent as `Authorization: Basic {base64(token)}`:
//! the whole token string is the Basic payload. It is not split into a user
//! and password.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use status::{
    Credentials, Platform, ProviderId, Run, RunRequest, RunSource, StatusError, StatusResult,
    Upstream, UNAVAILABLE_BRANCH, UNKNOWN_CONCLUSION,
};
use tracing::{debug, instrument};

use crate::config::endpoint;
use crate::http::get_json;
use crate::ProviderError;

/// `status` reported while a build is still running.
pub const IN_PROGRESS: &str = "in_progress";

// ---------------------------------------------------------------------------
// Upstream payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JobPayload {
    builds: Vec<JenkinsBuild>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JenkinsBuild {
    number: u64,
    url: Option<String>,
    #[serde(default)]
    building: bool,
    result: Option<String>,
    /// Milliseconds since the Unix epoch.
    timestamp: Option<i64>,
    full_display_name: Option<String>,
    display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn to_iso8601(epoch_millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(epoch_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn normalize_build(build: JenkinsBuild) -> Run {
    let conclusion = build
        .result
        .clone()
        .unwrap_or_else(|| UNKNOWN_CONCLUSION.to_string());
    let status = if build.building {
        IN_PROGRESS.to_string()
    } else {
        conclusion.clone()
    };
    let timestamp = build.timestamp.and_then(to_iso8601);
    let name = build
        .full_display_name
        .or(build.display_name)
        .unwrap_or_else(|| format!("Build #{}", build.number));

    Run {
        id: ProviderId::from(build.number),
        name: Some(name),
        status: Some(status),
        conclusion,
        created_at: timestamp.clone(),
        updated_at: timestamp,
        url: build.url,
        branch: Some(UNAVAILABLE_BRANCH.to_string()),
        platform: Platform::Jenkins,
    }
}

fn basic_authorization(credentials: &Credentials) -> Option<String> {
    credentials
        .as_token()
        .map(|token| format!("Basic {}", STANDARD.encode(token)))
}

/// `tree` filter limiting the job payload to the fields we read and the
/// `limit` most recent builds.
fn tree_filter(limit: usize) -> String {
    format!(
        "builds[number,url,building,result,timestamp,fullDisplayName,displayName]{{0,{limit}}}"
    )
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Jenkins job client implementing [`RunSource`].
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    http: reqwest::Client,
}

impl JenkinsClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RunSource for JenkinsClient {
    fn platform(&self) -> Platform {
        Platform::Jenkins
    }

    fn requires_base_url(&self) -> bool {
        true
    }

    #[instrument(skip(self, request), fields(repo = %request.repo, limit = request.limit))]
    async fn fetch_runs(&self, request: &RunRequest) -> StatusResult<Vec<Run>> {
        let base_url = request
            .base_url
            .as_ref()
            .ok_or_else(|| StatusError::missing("jenkinsUrl"))?;
        let failed = |e: ProviderError| e.for_upstream(Upstream::Ci(Platform::Jenkins));
        let job_name = format!("{}-{}", request.repo.owner, request.repo.name);
        let url = endpoint(base_url.as_str(), &["job", job_name.as_str(), "api", "json"])
            .map_err(failed)?;
        debug!(%url, "Jenkins request");

        let mut builder = self.http.get(url).query(&[("tree", tree_filter(request.limit))]);
        if let Some(authorization) = basic_authorization(&request.credentials) {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let job: JobPayload = get_json(builder).await.map_err(failed)?;

        Ok(job
            .builds
            .into_iter()
            .take(request.limit)
            .map(normalize_build)
            .collect())
    }
}
