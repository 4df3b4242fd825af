//! Audit log data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuditError, Result};

/// Field-level changes made by an admin action, e.g.
/// `{"status": {"from": "draft", "to": "published"}}`
pub type Changes = serde_json::Map<String, serde_json::Value>;

/// Where and when an admin action came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMetadata {
    pub ip: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditMetadata {
    /// Metadata stamped with the current time
    pub fn now(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Description of an admin action, before it is recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub admin_id: String,
    pub action: String,
    pub resource: String,
    #[serde(default)]
    pub changes: Changes,
    pub metadata: AuditMetadata,
}

impl AuditEvent {
    pub fn new(
        admin_id: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        metadata: AuditMetadata,
    ) -> Self {
        Self {
            admin_id: admin_id.into(),
            action: action.into(),
            resource: resource.into(),
            changes: Changes::new(),
            metadata,
        }
    }

    /// Record a single changed field
    pub fn with_change(mut self, field: impl Into<String>, value: serde_json::Value) -> Self {
        self.changes.insert(field.into(), value);
        self
    }

    pub fn with_changes(mut self, changes: Changes) -> Self {
        self.changes = changes;
        self
    }

    /// Validate the event data
    pub fn validate(&self) -> Result<()> {
        if self.admin_id.trim().is_empty() {
            return Err(AuditError::InvalidEvent(
                "adminId cannot be empty".to_string(),
            ));
        }

        if self.action.trim().is_empty() {
            return Err(AuditError::InvalidEvent(
                "action cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Error details attached to a failed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditErrorInfo {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AuditErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Outcome of an audited action
///
/// Serialized as `"status": "success"` or `"status": "failure", "error": {..}`;
/// a failure always carries its error and a success never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Failure { error: AuditErrorInfo },
}

impl AuditStatus {
    pub fn failure(message: impl Into<String>, code: Option<&str>) -> Self {
        let mut error = AuditErrorInfo::new(message);
        error.code = code.map(str::to_string);
        AuditStatus::Failure { error }
    }

    pub fn kind(&self) -> AuditStatusKind {
        match self {
            AuditStatus::Success => AuditStatusKind::Success,
            AuditStatus::Failure { .. } => AuditStatusKind::Failure,
        }
    }

    pub fn error(&self) -> Option<&AuditErrorInfo> {
        match self {
            AuditStatus::Success => None,
            AuditStatus::Failure { error } => Some(error),
        }
    }
}

/// Status without its payload, for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatusKind {
    Success,
    Failure,
}

impl std::fmt::Display for AuditStatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatusKind::Success => write!(f, "success"),
            AuditStatusKind::Failure => write!(f, "failure"),
        }
    }
}

/// A recorded, immutable audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Links entries belonging to one logical operation
    pub correlation_id: String,
    #[serde(flatten)]
    pub event: AuditEvent,
    #[serde(flatten)]
    pub status: AuditStatus,
}

impl AuditLogEntry {
    /// Create a new entry with a fresh id
    pub fn new(event: AuditEvent, status: AuditStatus, correlation_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            correlation_id,
            event,
            status,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.event.metadata.timestamp
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, AuditStatus::Success)
    }

    /// One-line human readable summary
    pub fn description(&self) -> String {
        format!(
            "{} performed '{}' on '{}' ({})",
            self.event.admin_id,
            self.event.action,
            self.event.resource,
            self.status.kind()
        )
    }
}
