//! CI status upstream adapters.
//!
//! Implements the [`status::RunSource`] and [`status::RepositoryHost`] ports
//! over HTTP:
//!
//! | Adapter | Implements | Upstream |
//! |---------|------------|----------|
//! | [`GitHubClient`] | `RunSource` (Actions), `RepositoryHost` | GitHub REST API |
//! | [`TravisClient`] | `RunSource` | Travis CI builds API |
//! | [`JenkinsClient`] | `RunSource` | Jenkins JSON API, base URL per request |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request construction, authentication headers, payload
//! decoding and normalization live here. The [`status`] crate sees only the
//! port traits and the normalized records.
//!
//! Each adapter call makes exactly one outbound request. There are no
//! retries. The shared client enforces the configured timeout.

pub mod config;
pub mod error;
pub mod github;
mod http;
pub mod jenkins;
pub mod travis;

use std::sync::Arc;

pub use config::ProviderConfig;
pub use error::ProviderError;
pub use github::GitHubClient;
pub use jenkins::JenkinsClient;
pub use travis::TravisClient;

/// All adapters, sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct Providers {
    pub github: Arc<GitHubClient>,
    pub travis: Arc<TravisClient>,
    pub jenkins: Arc<JenkinsClient>,
}

impl Providers {
    /// Builds every adapter from `config`.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = config.http_client()?;
        Ok(Self {
            github: Arc::new(GitHubClient::new(http.clone(), &config.github_api_url)),
            travis: Arc::new(TravisClient::new(
                http.clone(),
                &config.travis_api_url,
                &config.travis_web_url,
            )),
            jenkins: Arc::new(JenkinsClient::new(http)),
        })
    }
}
