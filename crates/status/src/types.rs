//! Normalized records returned to the dashboard.
//!
//! Every provider payload is translated into one of these shapes. Records are
//! built fresh per request and never mutated afterwards; nothing here is
//! cached or persisted.
//!
//! Field names serialize in camelCase. Optional fields serialize as `null`
//! rather than being skipped, so consumers always see the same key set.

use serde::{Deserialize, Serialize};

use crate::ProviderId;

/// `conclusion` value used when a provider has not reported an outcome.
pub const UNKNOWN_CONCLUSION: &str = "unknown";

/// `branch` value for providers that do not associate runs with a branch.
pub const UNAVAILABLE_BRANCH: &str = "N/A";

// ---------------------------------------------------------------------------
// Platform discriminator
// ---------------------------------------------------------------------------

/// The CI provider a [`Run`] came from.
///
/// `status` and `conclusion` keep each provider's own vocabulary, so this
/// discriminator is required to interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "GitHub Actions")]
    GitHubActions,
    #[serde(rename = "Travis CI")]
    TravisCi,
    #[serde(rename = "Jenkins")]
    Jenkins,
}

impl Platform {
    /// Display label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::GitHubActions => "GitHub Actions",
            Self::TravisCi => "Travis CI",
            Self::Jenkins => "Jenkins",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// One CI execution, normalized across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Provider-scoped identifier; not comparable across platforms.
    pub id: ProviderId,

    /// Job name, commit message, or a synthesized `Build #N` label.
    pub name: Option<String>,

    /// Provider-native execution state (e.g. `queued`, `in_progress`).
    pub status: Option<String>,

    /// Provider-native outcome, [`UNKNOWN_CONCLUSION`] when not reported.
    pub conclusion: String,

    /// ISO-8601 timestamp, `None` when the provider did not report one.
    pub created_at: Option<String>,

    pub updated_at: Option<String>,

    /// Deep link to the run in the provider's web UI.
    pub url: Option<String>,

    /// Source branch, or [`UNAVAILABLE_BRANCH`] for providers without one.
    pub branch: Option<String>,

    pub platform: Platform,
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// A user reference attached to a pull request (author, assignee, reviewer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    pub avatar: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: Option<String>,
}

/// Repository summary attached to pull requests in the user-wide view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub url: Option<String>,
}

/// A pull request, normalized from the upstream payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: ProviderId,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub author: Option<Account>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub url: Option<String>,
    pub base_branch: Option<String>,
    pub head_branch: Option<String>,
    /// Listing endpoints usually leave this unset until GitHub computes it.
    pub mergeable: Option<bool>,
    pub mergeable_state: Option<String>,
    pub draft: bool,
    pub labels: Vec<Label>,
    pub assignees: Vec<Account>,
    pub requested_reviewers: Vec<Account>,

    /// Present only in the user-wide fan-out view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositorySummary>,
}

/// Which pull requests to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    #[default]
    Open,
    Closed,
    All,
}

impl PullRequestState {
    /// The value GitHub expects in the `state` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl std::str::FromStr for PullRequestState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(format!("unsupported pull request state '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

/// One repository owned by a user, as listed by the repository host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: ProviderId,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub language: Option<String>,
    pub updated_at: Option<String>,

    /// Coarse proxy: `true` when the caller has admin permission. Workflow
    /// configuration is not probed.
    pub has_actions: bool,
}

impl Repository {
    /// Summary attached to pull requests in the user-wide view.
    pub fn summary(&self) -> RepositorySummary {
        RepositorySummary {
            name: self.name.clone(),
            full_name: self.full_name.clone(),
            url: self.url.clone(),
        }
    }
}
