//! Per-admin permission store

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{checker::PermissionChecker, models::Permission};

/// Serializable copy of every grant, keyed by admin id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrantSnapshot {
    pub grants: BTreeMap<String, Vec<Permission>>,
}

/// In-memory store of fine-grained grants
///
/// All mutations go through one lock, so concurrent grant/revoke calls on
/// the same admin never lose updates. An admin with no remaining grants has
/// no entry at all.
#[derive(Debug, Default)]
pub struct PermissionStore {
    grants: RwLock<HashMap<String, Vec<Permission>>>,
}

impl PermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated from a snapshot
    pub fn from_snapshot(snapshot: GrantSnapshot) -> Self {
        let store = Self::new();
        store.restore(snapshot);
        store
    }

    /// Check whether an admin holds a permission
    pub fn check_permission(&self, admin_id: &str, permission: &Permission) -> bool {
        let grants = self.grants.read();
        let allowed = grants
            .get(admin_id)
            .is_some_and(|granted| PermissionChecker::is_authorized(granted, permission));

        debug!(admin_id, %permission, allowed, "Permission check");
        allowed
    }

    /// Grant a permission to an admin
    ///
    /// Returns `false` if an identical grant already existed.
    pub fn grant_permission(&self, admin_id: &str, permission: Permission) -> bool {
        let mut grants = self.grants.write();
        let granted = grants.entry(admin_id.to_string()).or_default();

        if granted.contains(&permission) {
            return false;
        }

        info!(admin_id, %permission, "Permission granted");
        granted.push(permission);
        true
    }

    /// Revoke every grant structurally matching `permission`
    ///
    /// Returns the number of grants removed. The admin's entry is dropped
    /// once it holds nothing.
    pub fn revoke_permission(&self, admin_id: &str, permission: &Permission) -> usize {
        let mut grants = self.grants.write();
        let Some(granted) = grants.get_mut(admin_id) else {
            return 0;
        };

        let before = granted.len();
        granted.retain(|stored| !PermissionChecker::matches_for_revocation(stored, permission));
        let removed = before - granted.len();

        if granted.is_empty() {
            grants.remove(admin_id);
        }

        if removed > 0 {
            info!(admin_id, %permission, removed, "Permission revoked");
        }
        removed
    }

    /// Remove every grant held by an admin
    pub fn revoke_all(&self, admin_id: &str) -> usize {
        let removed = self
            .grants
            .write()
            .remove(admin_id)
            .map_or(0, |granted| granted.len());

        if removed > 0 {
            info!(admin_id, removed, "All permissions revoked");
        }
        removed
    }

    /// Grants held by an admin, in grant order
    pub fn permissions_for(&self, admin_id: &str) -> Vec<Permission> {
        self.grants
            .read()
            .get(admin_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of admins holding at least one grant
    pub fn admin_count(&self) -> usize {
        self.grants.read().len()
    }

    /// Copy every grant into a serializable snapshot
    pub fn snapshot(&self) -> GrantSnapshot {
        let grants = self
            .grants
            .read()
            .iter()
            .map(|(admin_id, granted)| (admin_id.clone(), granted.clone()))
            .collect();
        GrantSnapshot { grants }
    }

    /// Replace every grant with the contents of a snapshot
    ///
    /// Duplicate and empty entries in the snapshot are dropped.
    pub fn restore(&self, snapshot: GrantSnapshot) {
        let mut restored: HashMap<String, Vec<Permission>> = HashMap::new();
        for (admin_id, permissions) in snapshot.grants {
            let mut unique: Vec<Permission> = Vec::with_capacity(permissions.len());
            for permission in permissions {
                if !unique.contains(&permission) {
                    unique.push(permission);
                }
            }
            if !unique.is_empty() {
                restored.insert(admin_id, unique);
            }
        }

        debug!(admins = restored.len(), "Permission store restored");
        *self.grants.write() = restored;
    }
}
