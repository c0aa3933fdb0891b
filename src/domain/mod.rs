//! Domain logic - pure release rules independent of git and the remote API

pub mod identifier;
pub mod tag;
pub mod target;
pub mod version;

pub use identifier::{ResourceId, ResourceKind};
pub use tag::{random_salt, TagPattern};
pub use target::{Layout, RepositoryTarget};
pub use version::{bump, ReleaseKind, Version};
