//! Error → HTTP response mapping.
//!
//! Every failure is answered with `{"error": "<message>"}`:
//!
//! | Condition | Status |
//! |-----------|--------|
//! | `MissingParameter`, malformed query value | 400 |
//! | `ProviderFailure` | 502 |
//! | `Unhandled` | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use status::StatusError;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Failure of one API request.
#[derive(Debug)]
pub enum ApiError {
    Status(StatusError),
    /// A query value was present but not acceptable.
    BadRequest(String),
}

impl From<StatusError> for ApiError {
    fn from(err: StatusError) -> Self {
        Self::Status(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Status(StatusError::MissingParameter { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Status(StatusError::ProviderFailure { .. }) => StatusCode::BAD_GATEWAY,
            Self::Status(StatusError::Unhandled { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Self::Status(err) => {
                match &err {
                    StatusError::ProviderFailure { .. } => warn!(error = %err, "upstream failure"),
                    StatusError::Unhandled { .. } => error!(error = %err, "internal failure"),
                    StatusError::MissingParameter { .. } => {}
                }
                err.to_string()
            }
            Self::BadRequest(message) => message,
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}
