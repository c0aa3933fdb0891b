use crate::error::{ReleaseError, Result};
use git2::{BranchType, Repository as Git2Repo};
use std::path::{Path, PathBuf};

/// A local working copy verified to be publishable
///
/// Opening checks that the path is a non-bare repository with the
/// configured remote and a local branch to push.
pub struct WorkingCopy {
    repo: Git2Repo,
    path: PathBuf,
    remote: String,
}

impl WorkingCopy {
    pub fn open<P: AsRef<Path>>(path: P, remote: &str, branch: &str) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::open(path).map_err(|e| {
            ReleaseError::invalid_argument(format!(
                "{} is not a git working copy: {}",
                path.display(),
                e.message()
            ))
        })?;

        if repo.is_bare() {
            return Err(ReleaseError::invalid_argument(format!(
                "{} is a bare repository",
                path.display()
            )));
        }

        if let Err(e) = repo.find_remote(remote) {
            return Err(ReleaseError::invalid_argument(format!(
                "no remote '{}' configured in {}: {}",
                remote,
                path.display(),
                e.message()
            )));
        }

        if repo.find_branch(branch, BranchType::Local).is_err() {
            return Err(ReleaseError::invalid_argument(format!(
                "branch '{}' not found in {}",
                branch,
                path.display()
            )));
        }

        Ok(WorkingCopy {
            repo,
            path: path.to_path_buf(),
            remote: remote.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// URL of the configured remote
    pub fn remote_url(&self) -> Result<Option<String>> {
        let remote = self.repo.find_remote(&self.remote)?;
        Ok(remote.url().map(str::to_string))
    }
}
