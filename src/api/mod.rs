//! Remote resource API
//!
//! The release loop needs three calls from the Products/Operations services:
//! read a resource's current version, record a new version, and read a
//! long-running operation. They are abstracted by [ResourceApi].
//!
//! - [http::HttpResourceApi]: blocking JSON client over the REST mapping
//! - [mock::MockResourceApi]: in-memory implementation for testing

pub mod http;
pub mod mock;

pub use http::HttpResourceApi;
pub use mock::MockResourceApi;

use crate::domain::{ResourceId, Version};
use crate::error::{ReleaseError, Result};
use crate::git::CommitHash;
use serde::{Deserialize, Serialize};

/// Terminal error payload of an operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Handle to a remote long-running operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationStatus>,
}

impl Operation {
    pub fn pending(name: impl Into<String>) -> Self {
        Operation {
            name: name.into(),
            done: false,
            error: None,
        }
    }

    pub fn completed(name: impl Into<String>) -> Self {
        Operation {
            done: true,
            ..Operation::pending(name)
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Operation {
            done: true,
            error: Some(OperationStatus {
                code: 0,
                message: message.into(),
            }),
            ..Operation::pending(name)
        }
    }

    /// Terminal result of a finished operation; `None` while still running
    pub fn outcome(&self) -> Option<Result<()>> {
        if !self.done {
            return None;
        }
        Some(match &self.error {
            Some(status) => Err(ReleaseError::operation(status.message.clone())),
            None => Ok(()),
        })
    }
}

/// Request to record a released version of a product or neuron
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVersionRequest {
    pub resource: ResourceId,
    pub version: Version,
    /// Commit hashes of the released repositories, primary first
    pub commit_hashes: Vec<CommitHash>,
}

/// Calls the orchestration depends on from the remote service
pub trait ResourceApi {
    /// Latest recorded version of a product or neuron, if any
    fn current_version(&self, resource: &ResourceId) -> Result<Option<Version>>;

    /// Record a new version; the returned operation completes asynchronously
    fn create_version(&self, request: &CreateVersionRequest) -> Result<Operation>;

    fn get_operation(&self, name: &str) -> Result<Operation>;
}

impl<A: ResourceApi + ?Sized> ResourceApi for &A {
    fn current_version(&self, resource: &ResourceId) -> Result<Option<Version>> {
        (**self).current_version(resource)
    }

    fn create_version(&self, request: &CreateVersionRequest) -> Result<Operation> {
        (**self).create_version(request)
    }

    fn get_operation(&self, name: &str) -> Result<Operation> {
        (**self).get_operation(name)
    }
}
