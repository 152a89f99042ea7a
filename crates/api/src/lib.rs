//! CI status HTTP surface.
//!
//! Exposes the [`status::StatusService`] operations as JSON routes. Route
//! names are this crate's choice; the inputs, their validation, and the
//! response shapes come from the `status` crate.
//!
//! ## Routes
//!
//! | Route | Query | Returns |
//! |-------|-------|---------|
//! | `GET /` | | welcome text |
//! | `GET /api/statuses`, `GET /api/runs` | `owner`, `repo` | combined runs |
//! | `GET /api/runs/github`, `/travis` | `owner`, `repo` | one provider's runs |
//! | `GET /api/runs/jenkins` | `owner`, `repo`, `jenkinsUrl` | Jenkins runs |
//! | `GET /api/pulls` | `owner`, `repo`, `state` | one repository's pull requests |
//! | `GET /api/user/repos` | `username` | repositories |
//! | `GET /api/user/pulls` | `username` | pull requests across repositories |
//!
//! Every route also accepts a credential as `Authorization: Bearer <token>`
//! or a `token` query parameter.
//!
//! ## Architectural Layer
//!
//! **Infrastructure (inbound).** No aggregation rules live here.

pub mod handlers;
pub mod response;

use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

pub use handlers::AppState;
pub use response::{ApiError, ErrorBody};

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        info_span!(
            "http",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    Router::new()
        .route("/", get(handlers::welcome))
        .route("/api/statuses", get(handlers::combined_runs))
        .route("/api/runs", get(handlers::combined_runs))
        .route("/api/runs/github", get(handlers::github_runs))
        .route("/api/runs/travis", get(handlers::travis_runs))
        .route("/api/runs/jenkins", get(handlers::jenkins_runs))
        .route("/api/pulls", get(handlers::pull_requests))
        .route("/api/user/repos", get(handlers::user_repositories))
        .route("/api/user/pulls", get(handlers::user_pull_requests))
        .fallback(handlers::not_found)
        .layer(trace)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
