//! Audit log querying and filtering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AuditLogEntry, AuditStatusKind};

/// Filter criteria for audit log queries
///
/// Every populated field must match; unset fields match everything. Date
/// bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    pub admin_id: Option<String>,
    pub action: Option<String>,
    pub resource: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<AuditStatusKind>,
    pub correlation_id: Option<String>,
}

impl AuditFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin_id(mut self, admin_id: impl Into<String>) -> Self {
        self.admin_id = Some(admin_id.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_start_date(mut self, date: DateTime<Utc>) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: DateTime<Utc>) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_status(mut self, status: AuditStatusKind) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Check if an entry matches this filter
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        let event = &entry.event;

        if let Some(ref admin_id) = self.admin_id {
            if event.admin_id != *admin_id {
                return false;
            }
        }

        if let Some(ref action) = self.action {
            if event.action != *action {
                return false;
            }
        }

        if let Some(ref resource) = self.resource {
            if event.resource != *resource {
                return false;
            }
        }

        let timestamp = entry.timestamp();
        if let Some(start_date) = self.start_date {
            if timestamp < start_date {
                return false;
            }
        }

        if let Some(end_date) = self.end_date {
            if timestamp > end_date {
                return false;
            }
        }

        if let Some(status) = self.status {
            if entry.status.kind() != status {
                return false;
            }
        }

        if let Some(ref correlation_id) = self.correlation_id {
            if entry.correlation_id != *correlation_id {
                return false;
            }
        }

        true
    }

    /// Apply the filter to a slice, preserving order
    pub fn apply<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a AuditLogEntry>,
    ) -> Vec<AuditLogEntry> {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect()
    }
}
