//! Route handlers.
//!
//! Handlers only translate HTTP input into [`StatusService`] calls: they pull
//! the repository, username, Jenkins URL and credential out of the request
//! and serialize whatever the service returns.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use status::{
    repo_ref, Credentials, Platform, PullRequest, PullRequestState, Repository, Run, StatusService,
};
use tracing::info;

use crate::response::{ApiError, ErrorBody};

/// Shared handler state.
pub type AppState = Arc<StatusService>;

pub const WELCOME: &str = "Welcome to the CI Status Dashboard API!";

/// Query parameters of repository-scoped routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoParams {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub jenkins_url: Option<String>,
    pub state: Option<String>,
}

/// Query parameters of user-scoped routes.
#[derive(Debug, Default, Deserialize)]
pub struct UserParams {
    pub username: Option<String>,
    pub token: Option<String>,
}

/// Resolves the caller's credential.
///
/// `Authorization: Bearer <token>` (or `token <token>`) wins over the `token`
/// query parameter.
pub fn credentials(headers: &HeaderMap, query_token: Option<&str>) -> Credentials {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            let scheme = scheme.to_ascii_lowercase();
            (scheme == "bearer" || scheme == "token").then(|| token.trim().to_string())
        });

    match from_header {
        Some(token) if !token.is_empty() => Credentials::token(token),
        _ => query_token.map(Credentials::token).unwrap_or_default(),
    }
}

pub async fn welcome() -> &'static str {
    WELCOME
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not Found")))
}

/// Combined GitHub Actions + Travis CI feed.
pub async fn combined_runs(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RepoParams>,
) -> Result<Json<Vec<Run>>, ApiError> {
    let repo = repo_ref(params.owner.as_deref(), params.repo.as_deref())?;
    let credentials = credentials(&headers, params.token.as_deref());
    info!(%repo, "combined runs");

    Ok(Json(service.combined_runs(&repo, &credentials).await))
}

async fn provider_runs(
    service: &StatusService,
    platform: Platform,
    headers: &HeaderMap,
    params: &RepoParams,
) -> Result<Json<Vec<Run>>, ApiError> {
    let repo = repo_ref(params.owner.as_deref(), params.repo.as_deref())?;
    let credentials = credentials(headers, params.token.as_deref());
    info!(%repo, %platform, "provider runs");

    let runs = service
        .provider_runs(platform, &repo, params.jenkins_url.as_deref(), &credentials)
        .await?;
    Ok(Json(runs))
}

pub async fn github_runs(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RepoParams>,
) -> Result<Json<Vec<Run>>, ApiError> {
    provider_runs(&service, Platform::GitHubActions, &headers, &params).await
}

pub async fn travis_runs(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RepoParams>,
) -> Result<Json<Vec<Run>>, ApiError> {
    provider_runs(&service, Platform::TravisCi, &headers, &params).await
}

pub async fn jenkins_runs(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RepoParams>,
) -> Result<Json<Vec<Run>>, ApiError> {
    provider_runs(&service, Platform::Jenkins, &headers, &params).await
}

/// Pull requests of one repository.
pub async fn pull_requests(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RepoParams>,
) -> Result<Json<Vec<PullRequest>>, ApiError> {
    let repo = repo_ref(params.owner.as_deref(), params.repo.as_deref())?;
    let state = match params.state.as_deref() {
        None | Some("") => PullRequestState::default(),
        Some(raw) => raw.parse::<PullRequestState>().map_err(ApiError::BadRequest)?,
    };
    let credentials = credentials(&headers, params.token.as_deref());
    info!(%repo, state = state.as_str(), "pull requests");

    Ok(Json(service.pull_requests(&repo, state, &credentials).await?))
}

pub async fn user_repositories(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<Repository>>, ApiError> {
    let credentials = credentials(&headers, params.token.as_deref());
    let repos = service
        .repositories(params.username.as_deref(), &credentials)
        .await?;
    Ok(Json(repos))
}

/// Open pull requests across every repository a user owns.
pub async fn user_pull_requests(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<PullRequest>>, ApiError> {
    let credentials = credentials(&headers, params.token.as_deref());
    let pulls = service
        .all_pull_requests(params.username.as_deref(), &credentials)
        .await?;
    Ok(Json(pulls))
}
