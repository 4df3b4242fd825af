//! Error types for the permission store

use thiserror::Error;

/// Result type for permission store operations
pub type Result<T> = std::result::Result<T, PermissionError>;

/// Errors that can occur in the permission store
///
/// Permission checks themselves never fail; these cover parsing and grant
/// persistence.
#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
