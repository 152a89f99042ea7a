//! Upstream endpoints and the shared HTTP client.

use std::time::Duration;

use reqwest::Url;

use crate::ProviderError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TRAVIS_API_URL: &str = "https://api.travis-ci.com";
pub const DEFAULT_TRAVIS_WEB_URL: &str = "https://app.travis-ci.com";

/// Outbound request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where each provider lives and how long to wait for it.
///
/// Jenkins has no entry: its base URL is supplied per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub github_api_url: String,
    pub travis_api_url: String,
    /// Used to build deep links to Travis builds.
    pub travis_web_url: String,
    /// Upper bound on every outbound request, connection included.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            travis_api_url: DEFAULT_TRAVIS_API_URL.to_string(),
            travis_web_url: DEFAULT_TRAVIS_WEB_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("ci-status/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ProviderConfig {
    /// Builds the `reqwest` client shared by all adapters.
    pub fn http_client(&self) -> Result<reqwest::Client, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }
}

/// Appends `segments` to `base` as percent-encoded path segments.
///
/// A trailing slash on `base` is ignored. Reserved characters such as `#`,
/// `?` and `/` inside a segment are escaped rather than changing the target.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ProviderError> {
    let invalid = || ProviderError::InvalidUrl(base.to_string());
    let mut url = Url::parse(base).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|()| invalid())?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
