//! A local stand-in for upstream provider APIs.
//!
//! Serves canned JSON per request path on `127.0.0.1:0` and records every
//! request so tests can assert on paths, query strings and auth headers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct StubState {
    routes: HashMap<String, Canned>,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug, Default)]
pub struct StubUpstream {
    routes: HashMap<String, Canned>,
}

impl StubUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `path` with `200 OK` and `body`.
    pub fn json(self, path: &str, body: Value) -> Self {
        self.respond(path, StatusCode::OK, body.to_string(), None)
    }

    /// Answers `path` with an arbitrary status and raw body.
    pub fn status(self, path: &str, status: StatusCode, body: &str) -> Self {
        self.respond(path, status, body.to_string(), None)
    }

    /// Answers `path` with `body` after waiting `delay`.
    pub fn delayed(self, path: &str, delay: Duration, body: Value) -> Self {
        self.respond(path, StatusCode::OK, body.to_string(), Some(delay))
    }

    fn respond(mut self, path: &str, status: StatusCode, body: String, delay: Option<Duration>) -> Self {
        self.routes.insert(path.to_string(), Canned { status, body, delay });
        self
    }

    pub async fn start(self) -> RunningUpstream {
        let state = Arc::new(StubState {
            routes: self.routes,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningUpstream {
            url: format!("http://{addr}"),
            state,
        }
    }
}

pub struct RunningUpstream {
    pub url: String,
    state: Arc<StubState>,
}

impl RunningUpstream {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {requests:?}");
        requests.into_iter().next().unwrap()
    }
}

async fn handle(State(state): State<Arc<StubState>>, uri: Uri, headers: HeaderMap) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        accept: header_value(header::ACCEPT),
    });

    match state.routes.get(uri.path()).cloned() {
        Some(canned) => {
            if let Some(delay) = canned.delay {
                tokio::time::sleep(delay).await;
            }
            (
                canned.status,
                [(header::CONTENT_TYPE, "application/json")],
                canned.body,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#).into_response(),
    }
}
