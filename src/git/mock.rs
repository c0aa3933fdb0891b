use crate::domain::RepositoryTarget;
use crate::error::{ReleaseError, Result};
use crate::git::{Published, Publisher};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Mock publisher for testing the release loop without git
///
/// Results are consumed in call order. Once the script runs out every
/// publish succeeds with a hash derived from the target's tag.
#[derive(Default)]
pub struct MockPublisher {
    script: RefCell<VecDeque<Result<Published>>>,
    published: RefCell<Vec<RepositoryTarget>>,
}

impl MockPublisher {
    /// Create a mock that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful publish resolving to `commit`
    pub fn succeed_with(self, commit: impl Into<String>) -> Self {
        self.script
            .borrow_mut()
            .push_back(Ok(Published::tagged(commit)));
        self
    }

    /// Queue a tag collision
    pub fn collide(self) -> Self {
        self.script
            .borrow_mut()
            .push_back(Err(ReleaseError::AlreadyExists(
                "! [rejected] (already exists)".to_string(),
            )));
        self
    }

    /// Queue an arbitrary failure
    pub fn fail_with(self, err: ReleaseError) -> Self {
        self.script.borrow_mut().push_back(Err(err));
        self
    }

    /// Targets received so far, in order
    pub fn published(&self) -> Vec<RepositoryTarget> {
        self.published.borrow().clone()
    }

    /// Tags received so far, in order
    pub fn tags(&self) -> Vec<String> {
        self.published
            .borrow()
            .iter()
            .filter_map(|t| t.tag.clone())
            .collect()
    }
}

impl Publisher for MockPublisher {
    fn publish(&self, target: &RepositoryTarget) -> Result<Published> {
        self.published.borrow_mut().push(target.clone());
        self.script.borrow_mut().pop_front().unwrap_or_else(|| {
            let commit = target.tag.as_ref().map(|t| format!("sha-{}", t));
            Ok(Published {
                commit,
                warnings: Vec::new(),
            })
        })
    }
}
