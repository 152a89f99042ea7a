//! Core aggregation domain for the CI status dashboard.
//!
//! This crate contains the normalized record types, the error taxonomy, the
//! port traits upstream adapters implement, and the fan-out/merge logic that
//! combines their results. Infrastructure crates implement the traits defined
//! here; they never add aggregation rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Input newtypes (`Owner`, `Username`, `JenkinsUrl`, etc.) and `Credentials` |
//! | [`types`] | Normalized records (`Run`, `PullRequest`, `Repository`) |
//! | [`errors`] | `StatusError` taxonomy |
//! | [`ports`] | `RunSource` and `RepositoryHost` traits |
//! | [`ordering`] | Newest-first ordering by `createdAt` |
//! | [`aggregator`] | Multi-provider run aggregation |
//! | [`fanout`] | Per-user repository and pull-request fan-out |
//! | [`service`] | `StatusService`, the operation surface used by the HTTP layer |
//! | [`fakes`] | In-memory port implementations for tests |

pub mod aggregator;
pub mod errors;
pub mod fakes;
pub mod fanout;
pub mod identifiers;
pub mod ordering;
pub mod ports;
pub mod service;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use aggregator::{RunAggregator, COMBINED_CAP, COMBINED_PER_SOURCE_LIMIT};
pub use errors::{StatusError, StatusResult, Upstream};
pub use fanout::{RepositoryFanout, PR_PAGE_SIZE, USER_PR_PAGE_SIZE};
pub use identifiers::{Credentials, JenkinsUrl, Owner, ProviderId, RepoName, RepoRef, Username};
pub use ports::{PullRequestQuery, RepositoryHost, RunRequest, RunSource};
pub use service::{repo_ref, StatusService, SINGLE_PROVIDER_LIMIT};
pub use types::{
    Account, Label, Platform, PullRequest, PullRequestState, Repository, RepositorySummary, Run,
    UNAVAILABLE_BRANCH, UNKNOWN_CONCLUSION,
};
