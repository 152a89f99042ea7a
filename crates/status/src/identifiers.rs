//! Newtype identifiers for the inputs every operation is keyed by.
//!
//! Owners, repository names, usernames and Jenkins base URLs are all plain
//! strings upstream. Wrapping each in its own type keeps a username from being
//! passed where an owner is expected, and pushes the "required parameter is
//! present" check to the single place a value is constructed.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.len() == v.len() {
                    Some(Self(v))
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The account (user or organisation) that owns a repository.
    Owner
}

string_id! {
    /// A repository name without its owner prefix (e.g. `"linux"`).
    RepoName
}

string_id! {
    /// A GitHub login whose repositories are listed by the user-wide views.
    Username
}

// ---------------------------------------------------------------------------
// Jenkins base URL
// ---------------------------------------------------------------------------

/// Base URL of a Jenkins controller, e.g. `https://ci.example.com`.
///
/// Trailing slashes are stripped so job paths can be appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JenkinsUrl(String);

impl JenkinsUrl {
    /// Creates a [`JenkinsUrl`], returning `None` if the value is blank.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let trimmed = v.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the base URL without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JenkinsUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Repository reference
// ---------------------------------------------------------------------------

/// An `owner/name` pair identifying one repository on every provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: Owner,
    pub name: RepoName,
}

impl RepoRef {
    pub fn new(owner: Owner, name: RepoName) -> Self {
        Self { owner, name }
    }

    /// Returns `"owner/name"`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Provider-scoped record identifiers
// ---------------------------------------------------------------------------

/// An identifier assigned by an upstream provider.
///
/// Values are only meaningful within one provider and are never compared
/// across platforms. Serialized exactly as the upstream value (number or
/// string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderId {
    Number(u64),
    Text(String),
}

impl From<u64> for ProviderId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A caller-supplied API token, forwarded to upstream providers per request.
///
/// Never stored beyond the request that carried it. `Debug` output redacts
/// the value so tokens cannot leak through `tracing` fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(Option<String>);

impl Credentials {
    /// Credentials carrying no token; upstream calls are made anonymously.
    pub fn anonymous() -> Self {
        Self(None)
    }

    /// Wraps a token. Blank tokens are treated as anonymous.
    pub fn token(token: impl Into<String>) -> Self {
        let t = token.into();
        if t.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(t))
        }
    }

    /// Returns the token, if any.
    pub fn as_token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Credentials(<redacted>)"),
            None => f.write_str("Credentials(anonymous)"),
        }
    }
}
