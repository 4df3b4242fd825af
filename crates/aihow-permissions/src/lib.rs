//! Permission Store for AIhow admins
//!
//! Fine-grained authorization independent of roles: each admin holds a set of
//! `{resource, action, conditions}` grants, checked with wildcard support.
//! Grants can be snapshotted to a repository so they survive restarts.

pub mod checker;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;

pub use checker::{check_conditions, PermissionChecker};
pub use error::{PermissionError, Result};
pub use models::{Action, Conditions, Permission, WILDCARD};
pub use storage::{FileGrantRepository, GrantRepository, InMemoryGrantRepository};
pub use store::{GrantSnapshot, PermissionStore};
