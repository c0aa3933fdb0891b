use std::fmt;
use std::path::PathBuf;

use crate::domain::Version;

/// Non-fatal conditions met while releasing.
/// These are reported to the user but never stop the release.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Commit found nothing to record; the remote already reflects local state
    NothingToCommit { path: PathBuf },
    /// Best-effort pull failed and was skipped
    SyncSkipped { path: PathBuf, reason: String },
    /// The candidate tag already exists on the remote
    TagCollision { tag: String, next: Version },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NothingToCommit { path } => {
                write!(f, "Nothing to commit in '{}'", path.display())
            }
            BoundaryWarning::SyncSkipped { path, reason } => {
                let first_line = reason.lines().next().unwrap_or_default();
                write!(
                    f,
                    "Could not update '{}' from remote: {}",
                    path.display(),
                    first_line
                )
            }
            BoundaryWarning::TagCollision { tag, next } => {
                write!(
                    f,
                    "Tag '{}' already exists on the remote (next candidate: {})",
                    tag, next
                )
            }
        }
    }
}
