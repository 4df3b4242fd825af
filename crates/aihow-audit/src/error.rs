//! Error types for the audit crate

use thiserror::Error;

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that can occur while recording or querying audit entries
#[derive(Error, Debug)]
pub enum AuditError {
    /// Returned by `AuditLogger::log_event` whenever an entry could not be
    /// built or persisted. The audited operation must be treated as failed.
    #[error("Audit logging failed: {0}")]
    LoggingFailed(#[source] Box<AuditError>),

    #[error("Invalid audit event: {0}")]
    InvalidEvent(String),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Audit queue is full")]
    QueueFull,

    #[error("Audit queue is closed")]
    QueueClosed,

    #[error("Audit persistence failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<AuditError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
