//! Transport-level failures, before they are folded into the domain taxonomy.

use status::{StatusError, Upstream};
use thiserror::Error;

/// Longest slice of an upstream error body kept in a failure message.
const BODY_EXCERPT_LEN: usize = 200;

/// Errors raised while talking to an upstream provider.
///
/// Every variant becomes [`StatusError::ProviderFailure`] at the port
/// boundary via [`ProviderError::for_upstream`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the JSON shape this adapter expects.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured or caller-supplied base URL cannot carry a path.
    #[error("invalid base URL '{0}'")]
    InvalidUrl(String),
}

impl ProviderError {
    pub(crate) fn status(status: reqwest::StatusCode, body: &str) -> Self {
        let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
        Self::Status {
            status: status.as_u16(),
            body: excerpt,
        }
    }

    /// Converts into the domain error for `upstream`.
    pub fn for_upstream(self, upstream: Upstream) -> StatusError {
        StatusError::provider(upstream, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use status::Platform;

    #[test]
    fn status_errors_keep_a_bounded_body_excerpt() {
        let body = "x".repeat(1000);
        let err = ProviderError::status(reqwest::StatusCode::BAD_GATEWAY, &body);
        match &err {
            ProviderError::Status { status, body } => {
                assert_eq!(*status, 502);
                assert_eq!(body.len(), BODY_EXCERPT_LEN);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn converts_to_provider_failure() {
        let err = ProviderError::status(reqwest::StatusCode::NOT_FOUND, "Not Found")
            .for_upstream(Upstream::Ci(Platform::Jenkins));
        assert_eq!(
            err,
            StatusError::provider(Upstream::Ci(Platform::Jenkins), "HTTP 404: Not Found")
        );
    }
}
