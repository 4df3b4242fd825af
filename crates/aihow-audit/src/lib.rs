//! Audit logging for AIhow admin actions
//!
//! Every admin action, successful or not, is recorded as an append-only
//! [`AuditLogEntry`]. Logging is fail-closed: a write that cannot be stored is
//! returned to the caller as [`AuditError::LoggingFailed`].
//!
//! Storage is pluggable through [`AuditPersister`]:
//!
//! - [`MemoryPersister`] keeps entries in process memory
//! - [`JsonlFilePersister`] appends JSON lines to a file
//! - [`QueuedPersister`] wraps either one with a bounded queue and retries
//!
//! # Example
//!
//! ```
//! use aihow_audit::{create_audit_event, AuditFilter, AuditLogger, Changes, RequestHeaders};
//!
//! # tokio_test::block_on(async {
//! let logger = AuditLogger::in_memory();
//! let headers = RequestHeaders::new().with_header("X-Forwarded-For", "203.0.113.7");
//! let event = create_audit_event("a1", "update", "tools/42", Changes::new(), &headers);
//!
//! logger.log_success(event).await.unwrap();
//!
//! let logs = logger
//!     .get_audit_logs(&AuditFilter::new().with_admin_id("a1"))
//!     .await
//!     .unwrap();
//! assert_eq!(logs[0].event.metadata.ip, "203.0.113.7");
//! # });
//! ```

pub mod config;
pub mod correlation;
pub mod error;
pub mod file;
pub mod filter;
pub mod logger;
pub mod models;
pub mod persister;
pub mod queue;
pub mod request;

pub use config::{build_persister, AuditBackend, AuditConfig};
pub use correlation::{current_correlation_id, with_correlation_id};
pub use error::{AuditError, Result};
pub use file::JsonlFilePersister;
pub use filter::AuditFilter;
pub use logger::AuditLogger;
pub use models::{
    AuditErrorInfo, AuditEvent, AuditLogEntry, AuditMetadata, AuditStatus, AuditStatusKind,
    Changes,
};
pub use persister::{AuditPersister, MemoryPersister};
pub use queue::{QueueConfig, QueuedPersister, RetryPolicy};
pub use request::{create_audit_event, RequestHeaders, UNKNOWN};
