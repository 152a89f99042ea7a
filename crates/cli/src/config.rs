//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use providers::config::{DEFAULT_GITHUB_API_URL, DEFAULT_TRAVIS_API_URL, DEFAULT_TRAVIS_WEB_URL};
use providers::ProviderConfig;

#[derive(Debug, Parser)]
#[command(name = "ci-status")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Aggregates CI runs and pull requests from GitHub Actions, Travis CI and Jenkins", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "CI_STATUS_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// GitHub REST API base URL (change for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    pub github_api_url: String,

    /// Travis CI API base URL
    #[arg(long, env = "TRAVIS_API_URL", default_value = DEFAULT_TRAVIS_API_URL)]
    pub travis_api_url: String,

    /// Travis CI web UI base URL, used for build links
    #[arg(long, env = "TRAVIS_WEB_URL", default_value = DEFAULT_TRAVIS_WEB_URL)]
    pub travis_web_url: String,

    /// Timeout for each outbound provider request, in seconds
    #[arg(long, env = "CI_STATUS_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Repositories queried at once by the user-wide pull request view
    #[arg(long, env = "CI_STATUS_PR_CONCURRENCY", default_value_t = 1)]
    pub pr_concurrency: usize,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "CI_STATUS_LOG_JSON")]
    pub json: bool,

    /// OTLP collector endpoint; spans are exported only when set
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Cli {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            github_api_url: self.github_api_url.clone(),
            travis_api_url: self.travis_api_url.clone(),
            travis_web_url: self.travis_web_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..ProviderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_flow_into_provider_config() {
        let cli = Cli::try_parse_from([
            "ci-status",
            "--port",
            "8080",
            "--github-api-url",
            "https://ghe.example.com/api/v3",
            "--timeout-secs",
            "5",
            "--pr-concurrency",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.listen_addr().port(), 8080);
        assert_eq!(cli.pr_concurrency, 4);
        let config = cli.provider_config();
        assert_eq!(config.github_api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
