//! Error types for the admin gate and configuration

use aihow_audit::AuditError;
use aihow_permissions::PermissionError;
use aihow_roles::RoleError;
use aihow_sessions::SessionError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GateError>;

/// Why an admin request was not carried out
#[derive(Error, Debug)]
pub enum GateError {
    /// The admin is not allowed to do this. The denial has been audited.
    #[error("Access denied for {admin_id}: {reason}")]
    Denied { admin_id: String, reason: String },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Role error: {0}")]
    Role(#[from] RoleError),

    /// The audit record could not be written, so the request counts as failed
    #[error("{0}")]
    Audit(#[from] AuditError),

    /// The admin operation itself failed. The failure has been audited.
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl GateError {
    pub fn is_denied(&self) -> bool {
        matches!(self, GateError::Denied { .. })
    }
}

/// Errors raised while loading configuration or wiring services from it
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid role configuration: {0}")]
    Role(#[from] RoleError),

    #[error("Invalid audit configuration: {0}")]
    Audit(#[from] AuditError),

    #[error("Failed to load grants: {0}")]
    Grants(#[from] PermissionError),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
