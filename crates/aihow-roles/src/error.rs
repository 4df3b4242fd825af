//! Error types for the role registry

use thiserror::Error;

/// Result type for role registry operations
pub type Result<T> = std::result::Result<T, RoleError>;

/// Errors that can occur while building or querying the role registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidRoutePattern { pattern: String, reason: String },

    #[error("Duplicate role definition: {0}")]
    DuplicateRole(String),
}
