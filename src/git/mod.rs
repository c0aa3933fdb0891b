//! Repository publishing
//!
//! The release loop depends on the [Publisher] trait, which commits, tags and
//! pushes one [RepositoryTarget](crate::domain::RepositoryTarget).
//!
//! - [publisher::GitPublisher]: drives the `git` CLI through a
//!   [CommandRunner](crate::runner::CommandRunner)
//! - [mock::MockPublisher]: scripted results for testing the release loop
//! - [repository::WorkingCopy]: `git2` preflight that a path is a working copy
//!   with the expected remote
//!
//! Output text from git is interpreted only in [classify].

pub mod classify;
pub mod mock;
pub mod publisher;
pub mod repository;

pub use classify::{classify, GitOutcome, GitStep};
pub use mock::MockPublisher;
pub use publisher::GitPublisher;
pub use repository::WorkingCopy;

use crate::boundary::BoundaryWarning;
use crate::domain::RepositoryTarget;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Commit hash a pushed tag resolves to
pub type CommitHash = String;

/// How a failed pull before publishing is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// A failed pull aborts the publish
    #[default]
    Strict,
    /// A failed pull is reported as a warning and publishing continues
    BestEffort,
}

/// Result of a successful publish
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Published {
    /// Hash the tag resolves to; `None` when the target carried no tag
    pub commit: Option<CommitHash>,
    pub warnings: Vec<BoundaryWarning>,
}

impl Published {
    pub fn tagged(commit: impl Into<CommitHash>) -> Self {
        Published {
            commit: Some(commit.into()),
            warnings: Vec::new(),
        }
    }
}

/// Publishes a working copy to its remote
///
/// ## Error Handling
///
/// A tag collision is returned as
/// [ReleaseError::AlreadyExists](crate::error::ReleaseError::AlreadyExists)
/// and nothing else; callers rely on that to retry with a new version.
/// Every other failure aborts the publish.
pub trait Publisher {
    fn publish(&self, target: &RepositoryTarget) -> Result<Published>;
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn publish(&self, target: &RepositoryTarget) -> Result<Published> {
        (**self).publish(target)
    }
}
