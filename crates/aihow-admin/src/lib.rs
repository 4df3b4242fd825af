//! AIhow admin back-office authorization
//!
//! Ties the role registry, permission store, audit logger and session manager
//! together behind [`AdminGate`], and loads their settings from
//! [`AdminConfig`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use aihow_admin::{AdminContext, AdminGate};
//! use aihow_audit::AuditLogger;
//! use aihow_permissions::PermissionStore;
//! use aihow_roles::{RoleRegistry, CONTENT_ADMIN};
//! use aihow_sessions::{AdminSessionConfig, AdminSessionManager};
//!
//! # tokio_test::block_on(async {
//! let sessions = Arc::new(AdminSessionManager::new(AdminSessionConfig::default()));
//! let gate = AdminGate::new(
//!     Arc::new(RoleRegistry::builtin().unwrap()),
//!     Arc::new(PermissionStore::new()),
//!     Arc::new(AuditLogger::in_memory()),
//!     sessions.clone(),
//! );
//!
//! let session = sessions.create_session("a1").unwrap();
//! let ctx = AdminContext::new("a1", CONTENT_ADMIN, session.session_id);
//!
//! assert!(gate.authorize_route(&ctx, "/admin/tools/42").await.is_ok());
//! assert!(gate.authorize_route(&ctx, "/admin/system/settings").await.is_err());
//! # });
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod gate;

pub use config::{AdminConfig, ConfigLoader};
pub use context::AdminContext;
pub use error::{ConfigError, GateError, Result};
pub use gate::{AdminGate, ACCESS_DENIED, MANAGE_ADMINS, OPERATION_FAILED, SESSION_INVALID};
