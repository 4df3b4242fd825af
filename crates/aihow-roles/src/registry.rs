//! Role registry

use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{Result, RoleError},
    role::{builtin_definitions, Role, RoleDefinition},
};

/// Immutable table of roles keyed by name
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: HashMap<String, Role>,
}

impl RoleRegistry {
    /// Registry holding the built-in `SUPER_ADMIN`, `SYSTEM_ADMIN` and
    /// `CONTENT_ADMIN` roles
    pub fn builtin() -> Result<Self> {
        Self::from_definitions(builtin_definitions())
    }

    /// Build a registry from role definitions
    ///
    /// Fails on duplicate role names or invalid route patterns.
    pub fn from_definitions(definitions: Vec<RoleDefinition>) -> Result<Self> {
        let mut roles = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            if roles.contains_key(&definition.name) {
                return Err(RoleError::DuplicateRole(definition.name));
            }
            let role = Role::from_definition(definition)?;
            roles.insert(role.name().to_string(), role);
        }

        debug!(count = roles.len(), "Role registry built");
        Ok(Self { roles })
    }

    /// Look up a role by name
    pub fn get(&self, name: &str) -> Result<&Role> {
        self.roles
            .get(name)
            .ok_or_else(|| RoleError::UnknownRole(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Check whether a role holds a capability token
    pub fn has_permission(&self, role: &str, permission: &str) -> Result<bool> {
        let allowed = self.get(role)?.has_permission(permission);
        debug!(role, permission, allowed, "Capability check");
        Ok(allowed)
    }

    /// Check whether a role may access a route
    pub fn can_access_route(&self, role: &str, route: &str) -> Result<bool> {
        let allowed = self.get(role)?.can_access_route(route);
        debug!(role, route, allowed, "Route check");
        Ok(allowed)
    }

    /// All roles, most privileged first (ties broken by name)
    pub fn roles(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.values().collect();
        roles.sort_by(|a, b| b.level().cmp(&a.level()).then_with(|| a.name().cmp(b.name())));
        roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
