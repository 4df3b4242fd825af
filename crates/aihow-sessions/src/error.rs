//! Error types for session management

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Admin {admin_id} already has the maximum of {max} active sessions")]
    TooManySessions { admin_id: String, max: usize },

    #[error("Session is not valid: {0}")]
    SessionInvalid(String),

    #[error("Session not found: {0}")]
    NotFound(String),
}
