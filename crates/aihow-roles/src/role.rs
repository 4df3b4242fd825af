//! Role data models

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{error::Result, route_pattern::RoutePattern};

/// Full access to everything
pub const SUPER_ADMIN: &str = "SUPER_ADMIN";
/// Admin accounts, settings and audit trail
pub const SYSTEM_ADMIN: &str = "SYSTEM_ADMIN";
/// Directory content, tool listings and moderation
pub const CONTENT_ADMIN: &str = "CONTENT_ADMIN";

/// Wildcard capability / route granting everything
pub const ALL: &str = "*";

/// Serializable description of a role, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role name, e.g. `CONTENT_ADMIN`
    pub name: String,
    /// Informational rank (higher is more privileged)
    #[serde(default)]
    pub level: u32,
    /// Capability tokens; `"*"` grants all
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Route glob patterns; `"*"` allows every route
    #[serde(default)]
    pub allowed_routes: Vec<String>,
}

impl RoleDefinition {
    /// Create a new role definition
    pub fn new(name: &str, level: u32, permissions: &[&str], allowed_routes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            level,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            allowed_routes: allowed_routes.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// The three roles shipped with the admin back-office
pub fn builtin_definitions() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition::new(SUPER_ADMIN, 3, &[ALL], &[ALL]),
        RoleDefinition::new(
            SYSTEM_ADMIN,
            2,
            &[
                "manage_admins",
                "manage_roles",
                "view_audit_logs",
                "manage_settings",
                "view_analytics",
            ],
            &[
                "/admin",
                "/admin/system/*",
                "/admin/users/*",
                "/admin/audit/*",
            ],
        ),
        RoleDefinition::new(
            CONTENT_ADMIN,
            1,
            &[
                "manage_content",
                "moderate_content",
                "manage_tools",
                "view_analytics",
            ],
            &["/admin", "/admin/content/*", "/admin/tools/*"],
        ),
    ]
}

/// An immutable role with compiled route patterns
#[derive(Debug, Clone)]
pub struct Role {
    name: String,
    level: u32,
    permissions: BTreeSet<String>,
    allowed_routes: Vec<RoutePattern>,
}

impl Role {
    /// Build a role from its definition, compiling every route pattern
    pub fn from_definition(definition: RoleDefinition) -> Result<Self> {
        let allowed_routes = definition
            .allowed_routes
            .iter()
            .map(|pattern| RoutePattern::compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: definition.name,
            level: definition.level,
            permissions: definition.permissions.into_iter().collect(),
            allowed_routes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Capability tokens in sorted order
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Route patterns in definition order
    pub fn allowed_routes(&self) -> impl Iterator<Item = &str> {
        self.allowed_routes.iter().map(RoutePattern::as_str)
    }

    /// Check whether this role holds a capability
    ///
    /// Only the literal `"*"` token is a wildcard; there is no prefix or
    /// hierarchical matching between tokens.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(ALL) || self.permissions.contains(permission)
    }

    /// Check whether this role may access a route
    pub fn can_access_route(&self, route: &str) -> bool {
        self.allowed_routes.iter().any(|pattern| pattern.matches(route))
    }

    /// Convert back into a serializable definition
    pub fn to_definition(&self) -> RoleDefinition {
        RoleDefinition {
            name: self.name.clone(),
            level: self.level,
            permissions: self.permissions.iter().cloned().collect(),
            allowed_routes: self.allowed_routes().map(str::to_string).collect(),
        }
    }
}
