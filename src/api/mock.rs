use crate::api::{CreateVersionRequest, Operation, ResourceApi};
use crate::domain::{ResourceId, Version};
use crate::error::{ReleaseError, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// In-memory resource API for testing the release loop
///
/// `create_version` answers with a pending operation unless a response was
/// queued. `get_operation` pops scripted polls and reports the operation as
/// complete once the script runs out.
#[derive(Default)]
pub struct MockResourceApi {
    versions: RefCell<HashMap<String, Version>>,
    created: RefCell<Vec<CreateVersionRequest>>,
    create_responses: RefCell<VecDeque<Result<Operation>>>,
    polls: RefCell<VecDeque<Result<Operation>>>,
    poll_count: Cell<usize>,
}

impl MockResourceApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the current version of a resource
    pub fn with_version(self, resource: &ResourceId, version: Version) -> Self {
        self.versions
            .borrow_mut()
            .insert(resource.resource_name(), version);
        self
    }

    /// Queue the response to the next `create_version`
    pub fn respond_with(self, response: Result<Operation>) -> Self {
        self.create_responses.borrow_mut().push_back(response);
        self
    }

    /// Queue the response to the next `get_operation`
    pub fn poll(self, response: Result<Operation>) -> Self {
        self.polls.borrow_mut().push_back(response);
        self
    }

    /// Queue `n` polls reporting the operation as still running
    pub fn pending_polls(self, name: &str, n: usize) -> Self {
        (0..n).fold(self, |api, _| api.poll(Ok(Operation::pending(name))))
    }

    /// Create requests received so far
    pub fn created(&self) -> Vec<CreateVersionRequest> {
        self.created.borrow().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_count.get()
    }
}

impl ResourceApi for MockResourceApi {
    fn current_version(&self, resource: &ResourceId) -> Result<Option<Version>> {
        Ok(self
            .versions
            .borrow()
            .get(&resource.resource_name())
            .copied())
    }

    fn create_version(&self, request: &CreateVersionRequest) -> Result<Operation> {
        self.created.borrow_mut().push(request.clone());
        let response = self.create_responses.borrow_mut().pop_front();
        let op = response.unwrap_or_else(|| {
            Ok(Operation::pending(format!(
                "operations/{}-{}",
                request.resource, request.version
            )))
        })?;
        if op.done && op.error.is_none() {
            self.versions
                .borrow_mut()
                .insert(request.resource.resource_name(), request.version);
        }
        Ok(op)
    }

    fn get_operation(&self, name: &str) -> Result<Operation> {
        self.poll_count.set(self.poll_count.get() + 1);
        if name.is_empty() {
            return Err(ReleaseError::invalid_argument("operation name is empty"));
        }
        self.polls
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Operation::completed(name)))
    }
}
