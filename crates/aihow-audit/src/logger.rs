//! Audit logger implementation

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::{build_persister, AuditConfig};
use crate::correlation::current_correlation_id;
use crate::error::{AuditError, Result};
use crate::filter::AuditFilter;
use crate::models::{AuditEvent, AuditLogEntry, AuditStatus};
use crate::persister::{AuditPersister, MemoryPersister};

/// Records admin actions as immutable audit entries
///
/// Logging is fail-closed: if an entry cannot be stored, `log_event` returns
/// [`AuditError::LoggingFailed`] and the caller must treat the audited
/// operation as failed.
#[derive(Clone)]
pub struct AuditLogger {
    persister: Arc<dyn AuditPersister>,
    console_output: bool,
}

impl AuditLogger {
    /// Create a logger writing to the given persister
    pub fn new(persister: Arc<dyn AuditPersister>) -> Self {
        Self {
            persister,
            console_output: false,
        }
    }

    /// Logger backed by a fresh [`MemoryPersister`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPersister::new()))
    }

    /// Build the persister described by `config` and wrap it
    pub async fn from_config(config: &AuditConfig) -> Result<Self> {
        let persister = build_persister(config).await?;
        Ok(Self::new(persister).with_console_output(config.console_output))
    }

    /// Mirror every stored entry to the tracing subscriber
    pub fn with_console_output(mut self, enabled: bool) -> Self {
        self.console_output = enabled;
        self
    }

    /// Record an event with the given outcome
    pub async fn log_event(&self, event: AuditEvent, status: AuditStatus) -> Result<AuditLogEntry> {
        if let Err(e) = event.validate() {
            error!(error = %e, "Rejected audit event");
            return Err(AuditError::LoggingFailed(Box::new(e)));
        }

        let entry = AuditLogEntry::new(event, status, current_correlation_id());

        if let Err(e) = self.persister.append(&entry).await {
            error!(
                entry_id = %entry.id,
                admin_id = %entry.event.admin_id,
                action = %entry.event.action,
                error = %e,
                "Audit logging failed"
            );
            return Err(AuditError::LoggingFailed(Box::new(e)));
        }

        if self.console_output {
            self.output_to_console(&entry);
        } else {
            debug!(entry_id = %entry.id, "Recorded audit entry");
        }

        Ok(entry)
    }

    /// Record a successful action
    pub async fn log_success(&self, event: AuditEvent) -> Result<AuditLogEntry> {
        self.log_event(event, AuditStatus::Success).await
    }

    /// Record a failed action with its error message and optional code
    pub async fn log_failure(
        &self,
        event: AuditEvent,
        message: impl Into<String>,
        code: Option<&str>,
    ) -> Result<AuditLogEntry> {
        self.log_event(event, AuditStatus::failure(message, code))
            .await
    }

    /// Entries matching every populated filter field, in insertion order
    pub async fn get_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>> {
        self.persister.query(filter).await
    }

    /// Remove every entry. Test and reset use only.
    pub async fn clear_audit_logs(&self) -> Result<()> {
        self.persister.clear().await?;
        info!("Cleared audit log");
        Ok(())
    }

    fn output_to_console(&self, entry: &AuditLogEntry) {
        let error_message = entry.status.error().map(|e| e.message.as_str());
        let error_code = entry.status.error().and_then(|e| e.code.as_deref());

        info!(
            target: "aihow_audit::console",
            id = %entry.id,
            correlation_id = %entry.correlation_id,
            admin_id = %entry.event.admin_id,
            action = %entry.event.action,
            resource = %entry.event.resource,
            ip = %entry.event.metadata.ip,
            status = %entry.status.kind(),
            error = ?error_message,
            code = ?error_code,
            "{}",
            entry.description()
        );
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("console_output", &self.console_output)
            .finish_non_exhaustive()
    }
}
