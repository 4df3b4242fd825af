//! Authorization gate for admin requests
//!
//! Every admin request passes through [`AdminGate`]: the session is validated
//! and touched, the role or grant check runs, and denials and operation
//! outcomes are written to the audit log. An audit write that fails turns the
//! whole request into a failure.

use std::future::Future;
use std::sync::Arc;

use aihow_audit::{create_audit_event, AuditLogger, Changes};
use aihow_permissions::{FileGrantRepository, GrantRepository, Permission, PermissionStore};
use aihow_roles::RoleRegistry;
use aihow_sessions::{AdminSessionManager, SessionError};
use parking_lot::Mutex;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::AdminConfig;
use crate::context::AdminContext;
use crate::error::{ConfigError, GateError, Result};

/// Error code recorded for audited denials
pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
/// Error code recorded when the session is missing, expired or revoked
pub const SESSION_INVALID: &str = "SESSION_INVALID";
/// Error code recorded when an authorized operation fails
pub const OPERATION_FAILED: &str = "OPERATION_FAILED";

/// Capability required to change another admin's grants
pub const MANAGE_ADMINS: &str = "manage_admins";

pub struct AdminGate {
    roles: Arc<RoleRegistry>,
    permissions: Arc<PermissionStore>,
    audit: Arc<AuditLogger>,
    sessions: Arc<AdminSessionManager>,
    grants: Option<Arc<dyn GrantRepository>>,
    // Held across mutate and save so snapshots reach the repository in order
    grants_lock: Mutex<()>,
}

impl AdminGate {
    pub fn new(
        roles: Arc<RoleRegistry>,
        permissions: Arc<PermissionStore>,
        audit: Arc<AuditLogger>,
        sessions: Arc<AdminSessionManager>,
    ) -> Self {
        Self {
            roles,
            permissions,
            audit,
            sessions,
            grants: None,
            grants_lock: Mutex::new(()),
        }
    }

    /// Persist grant changes made through the gate to `repository`
    pub fn with_grant_repository(mut self, repository: Arc<dyn GrantRepository>) -> Self {
        self.grants = Some(repository);
        self
    }

    /// Wire every service from configuration, restoring saved grants
    pub async fn from_config(config: &AdminConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let roles = Arc::new(config.role_registry()?);
        let audit = Arc::new(AuditLogger::from_config(&config.audit).await?);
        let sessions = Arc::new(AdminSessionManager::new(config.session.clone()));
        let permissions = Arc::new(PermissionStore::new());

        let mut gate = Self::new(roles, permissions, audit, sessions);
        if let Some(path) = &config.grants_path {
            let repository = FileGrantRepository::new(path);
            gate.permissions.restore(repository.load_grants()?);
            gate = gate.with_grant_repository(Arc::new(repository));
        }

        info!(
            roles = gate.roles.len(),
            admins_with_grants = gate.permissions.admin_count(),
            "Admin gate ready"
        );
        Ok(gate)
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn permissions(&self) -> &PermissionStore {
        &self.permissions
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn sessions(&self) -> &AdminSessionManager {
        &self.sessions
    }

    /// Allow the request only if the admin's role may open `route`
    pub async fn authorize_route(&self, ctx: &AdminContext, route: &str) -> Result<()> {
        self.check_session(ctx, "access_route", route).await?;

        if self.roles.can_access_route(&ctx.role, route)? {
            debug!(admin_id = %ctx.admin_id, route, "Route access granted");
            return Ok(());
        }

        self.deny(
            ctx,
            "access_route",
            route,
            format!("role {} may not access {}", ctx.role, route),
        )
        .await
    }

    /// Allow the request only if the admin's role holds `capability`
    pub async fn authorize_capability(&self, ctx: &AdminContext, capability: &str) -> Result<()> {
        self.check_session(ctx, "use_capability", capability).await?;

        if self.roles.has_permission(&ctx.role, capability)? {
            debug!(admin_id = %ctx.admin_id, capability, "Capability granted");
            return Ok(());
        }

        self.deny(
            ctx,
            "use_capability",
            capability,
            format!("role {} lacks capability {}", ctx.role, capability),
        )
        .await
    }

    /// Allow the request only if the admin holds a grant covering `permission`
    pub async fn authorize_resource(
        &self,
        ctx: &AdminContext,
        permission: &Permission,
    ) -> Result<()> {
        let action = permission.action.to_string();
        self.check_session(ctx, &action, &permission.resource)
            .await?;

        if self.permissions.check_permission(&ctx.admin_id, permission) {
            debug!(admin_id = %ctx.admin_id, %permission, "Resource access granted");
            return Ok(());
        }

        self.deny(
            ctx,
            &action,
            &permission.resource,
            format!("no grant covers {}", permission),
        )
        .await
    }

    /// Run an admin operation that needs `capability` and audit its outcome
    ///
    /// The outcome is only returned once its audit entry is stored.
    pub async fn perform<T, E, F, Fut>(
        &self,
        ctx: &AdminContext,
        capability: &str,
        action: &str,
        resource: &str,
        changes: Changes,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        self.authorize_capability(ctx, capability).await?;

        let event = create_audit_event(&ctx.admin_id, action, resource, changes, &ctx.headers);
        match op().await {
            Ok(value) => {
                self.audit.log_success(event).await?;
                Ok(value)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(
                    admin_id = %ctx.admin_id,
                    action,
                    resource,
                    error = %message,
                    "Admin operation failed"
                );
                self.audit
                    .log_failure(event, message.clone(), Some(OPERATION_FAILED))
                    .await?;
                Err(GateError::OperationFailed(message))
            }
        }
    }

    /// Grant `permission` to `target_admin`. Requires `manage_admins`.
    ///
    /// Returns whether the grant was new.
    pub async fn grant_permission(
        &self,
        ctx: &AdminContext,
        target_admin: &str,
        permission: Permission,
    ) -> Result<bool> {
        let resource = format!("admins/{}", target_admin);
        let changes = grant_changes(&permission);

        self.perform(
            ctx,
            MANAGE_ADMINS,
            "grant_permission",
            &resource,
            changes,
            move || async move {
                self.update_grants(|store| store.grant_permission(target_admin, permission))
            },
        )
        .await
    }

    /// Revoke grants matching `permission` from `target_admin`. Requires
    /// `manage_admins`.
    pub async fn revoke_permission(
        &self,
        ctx: &AdminContext,
        target_admin: &str,
        permission: &Permission,
    ) -> Result<usize> {
        let resource = format!("admins/{}", target_admin);
        let changes = grant_changes(permission);

        self.perform(
            ctx,
            MANAGE_ADMINS,
            "revoke_permission",
            &resource,
            changes,
            move || async move {
                self.update_grants(|store| store.revoke_permission(target_admin, permission))
            },
        )
        .await
    }

    fn update_grants<R>(
        &self,
        mutate: impl FnOnce(&PermissionStore) -> R,
    ) -> aihow_permissions::Result<R> {
        let _guard = self.grants_lock.lock();
        let result = mutate(&self.permissions);
        if let Some(repository) = &self.grants {
            repository.save_grants(&self.permissions.snapshot())?;
        }
        Ok(result)
    }

    async fn check_session(&self, ctx: &AdminContext, action: &str, resource: &str) -> Result<()> {
        if self.sessions.validate_admin_session(&ctx.session_id) {
            if let Err(e) = self.sessions.track_admin_activity(&ctx.session_id) {
                return self.reject_session(ctx, action, resource, e).await;
            }
            return Ok(());
        }

        let error = SessionError::SessionInvalid(ctx.session_id.clone());
        self.reject_session(ctx, action, resource, error).await
    }

    async fn reject_session(
        &self,
        ctx: &AdminContext,
        action: &str,
        resource: &str,
        error: SessionError,
    ) -> Result<()> {
        warn!(admin_id = %ctx.admin_id, session_id = %ctx.session_id, "Rejected admin session");
        let event =
            create_audit_event(&ctx.admin_id, action, resource, Changes::new(), &ctx.headers);
        self.audit
            .log_failure(event, error.to_string(), Some(SESSION_INVALID))
            .await?;
        Err(GateError::Session(error))
    }

    async fn deny(
        &self,
        ctx: &AdminContext,
        action: &str,
        resource: &str,
        reason: String,
    ) -> Result<()> {
        warn!(admin_id = %ctx.admin_id, action, resource, %reason, "Access denied");
        let event =
            create_audit_event(&ctx.admin_id, action, resource, Changes::new(), &ctx.headers);
        self.audit
            .log_failure(event, reason.clone(), Some(ACCESS_DENIED))
            .await?;

        Err(GateError::Denied {
            admin_id: ctx.admin_id.clone(),
            reason,
        })
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("roles", &self.roles.len())
            .field("sessions", &self.sessions)
            .field("persist_grants", &self.grants.is_some())
            .finish_non_exhaustive()
    }
}

fn grant_changes(permission: &Permission) -> Changes {
    let mut changes = Changes::new();
    changes.insert(
        "permission".to_string(),
        serde_json::to_value(permission).unwrap_or_else(|_| json!(permission.to_string())),
    );
    changes
}
