use crate::domain::{ResourceId, Version};
use crate::error::{ReleaseError, Result};
use std::path::{Path, PathBuf};

/// A working copy to publish: where it lives, what to commit, how to tag it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    /// Root of the working copy
    pub path: PathBuf,
    /// Paths staged and committed; empty means the whole working copy
    pub commit_paths: Vec<PathBuf>,
    /// Commit message. `{version}` is replaced when the target is prepared
    /// for a release.
    pub message: String,
    pub tag: Option<String>,
    /// Run `git add` on `commit_paths` before committing
    pub stage: bool,
    pub commit: bool,
}

impl RepositoryTarget {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RepositoryTarget {
            path: path.into(),
            commit_paths: Vec::new(),
            message: message.into(),
            tag: None,
            stage: false,
            commit: true,
        }
    }

    pub fn commit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.commit_paths.push(path.into());
        self
    }

    pub fn staged(mut self) -> Self {
        self.stage = true;
        self
    }

    pub fn without_commit(mut self) -> Self {
        self.commit = false;
        self
    }

    /// Copy of this target carrying a concrete tag and rendered message
    pub fn for_release(&self, tag: &str, version: &Version) -> Self {
        RepositoryTarget {
            message: self.message.replace("{version}", &version.to_string()),
            tag: Some(tag.to_string()),
            ..self.clone()
        }
    }
}

/// Local directory layout of organisation, product and proto repositories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout { root: root.into() }
    }

    pub fn product_repo(&self, id: &ResourceId) -> Result<PathBuf> {
        let product = require_product(id)?;
        Ok(self
            .root
            .join(&id.organisation)
            .join("products")
            .join(product))
    }

    pub fn proto_repo(&self, id: &ResourceId) -> PathBuf {
        self.root.join(&id.organisation).join("proto")
    }

    pub fn proto_product_dir(&self, id: &ResourceId) -> Result<PathBuf> {
        let product = require_product(id)?;
        Ok(self.proto_repo(id).join(&id.organisation).join(product))
    }

    /// Targets released by `product build`: product repository, then protos
    pub fn product_targets(&self, id: &ResourceId) -> Result<Vec<RepositoryTarget>> {
        let product_repo = self.product_repo(id)?;
        let message = format!("update({}): {{version}}", id);

        Ok(vec![
            RepositoryTarget::new(&product_repo, &message).commit_path(&product_repo),
            RepositoryTarget::new(self.proto_repo(id), &message)
                .commit_path(self.proto_product_dir(id)?),
        ])
    }

    /// Targets released by `neuron build`: product repository, then protos
    pub fn neuron_targets(&self, id: &ResourceId) -> Result<Vec<RepositoryTarget>> {
        let neuron_path = id.neuron_path().ok_or_else(|| {
            ReleaseError::invalid_argument(format!("{} does not name a neuron", id))
        })?;
        let message = format!("update({}): {{version}}", id);

        Ok(vec![
            RepositoryTarget::new(self.product_repo(id)?, &message)
                .commit_path(self.product_repo(id)?.join(Path::new(&neuron_path))),
            RepositoryTarget::new(self.proto_repo(id), &message)
                .commit_path(self.proto_product_dir(id)?.join(Path::new(&neuron_path)))
                .staged(),
        ])
    }
}

fn require_product(id: &ResourceId) -> Result<&str> {
    id.product
        .as_deref()
        .ok_or_else(|| ReleaseError::invalid_argument(format!("{} does not name a product", id)))
}
