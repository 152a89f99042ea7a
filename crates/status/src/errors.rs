//! Error taxonomy shared by every layer.
//!
//! [`StatusError`] distinguishes three conditions:
//!
//! - [`StatusError::MissingParameter`] is raised before any upstream call is
//!   attempted. It is never retried.
//! - [`StatusError::ProviderFailure`] covers one failed upstream call. Single
//!   target operations surface it whole. Aggregating operations catch it and
//!   treat the failing provider or repository as having contributed nothing.
//! - [`StatusError::Unhandled`] is any other fault during normalization.
//!
//! Nothing in this workspace retries. Callers that need resilience re-issue
//! the request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Platform;

/// Which upstream a failure came from.
///
/// Repository listing and pull-request queries go to GitHub's REST API rather
/// than to a CI platform, so they get their own tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upstream {
    Ci(Platform),
    RepositoryHost,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ci(platform) => write!(f, "{platform}"),
            Self::RepositoryHost => f.write_str("GitHub"),
        }
    }
}

/// Errors surfaced by the status operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StatusError {
    /// A required input (e.g. `username`, `jenkinsUrl`) was absent or blank.
    #[error("Missing required parameter: {name}")]
    MissingParameter {
        /// Name of the parameter as the caller supplies it.
        name: String,
    },

    /// An upstream call failed: transport error, non-success status, or a
    /// body that could not be decoded.
    #[error("{upstream} request failed: {message}")]
    ProviderFailure { upstream: Upstream, message: String },

    #[error("Internal error: {message}")]
    Unhandled { message: String },
}

impl StatusError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    pub fn provider(upstream: Upstream, message: impl Into<String>) -> Self {
        Self::ProviderFailure {
            upstream,
            message: message.into(),
        }
    }

    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::Unhandled {
            message: message.into(),
        }
    }
}

/// Convenience result alias.
pub type StatusResult<T> = std::result::Result<T, StatusError>;

/// Returns the value when present, else [`StatusError::MissingParameter`].
///
/// Blank input is rejected earlier, by the identifier constructors returning
/// `None`.
pub fn require<T>(value: Option<T>, name: &str) -> StatusResult<T> {
    value.ok_or_else(|| StatusError::missing(name))
}
