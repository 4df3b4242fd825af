//! Property-based tests for aihow-permissions
//!
//! These tests verify correctness properties that should hold across all inputs.

use std::sync::Arc;

use aihow_permissions::{Action, Permission, PermissionStore};
use proptest::prelude::*;

fn admin_strategy() -> impl Strategy<Value = String> {
    r"a[0-9]{1,4}".prop_map(|s| s.to_string())
}

fn resource_strategy() -> impl Strategy<Value = String> {
    r"[a-z_]{1,12}".prop_map(|s| s.to_string())
}

fn concrete_action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Create),
        Just(Action::Read),
        Just(Action::Update),
        Just(Action::Delete),
    ]
}

proptest! {
    /// Granting then checking the same permission succeeds; revoking it
    /// makes the check fail again.
    #[test]
    fn prop_grant_check_revoke(
        admin in admin_strategy(),
        resource in resource_strategy(),
        action in concrete_action_strategy(),
    ) {
        let store = PermissionStore::new();
        let perm = Permission::new(resource, action);

        store.grant_permission(&admin, perm.clone());
        prop_assert!(store.check_permission(&admin, &perm));

        store.revoke_permission(&admin, &perm);
        prop_assert!(!store.check_permission(&admin, &perm));
    }

    /// A `{*, *}` grant authorizes any resource/action pair for that admin only.
    #[test]
    fn prop_full_wildcard_authorizes_everything(
        admin in admin_strategy(),
        other in admin_strategy(),
        resource in resource_strategy(),
        action in concrete_action_strategy(),
    ) {
        prop_assume!(admin != other);
        let store = PermissionStore::new();
        store.grant_permission(&admin, Permission::all());

        let requested = Permission::new(resource, action);
        prop_assert!(store.check_permission(&admin, &requested));
        prop_assert!(!store.check_permission(&other, &requested));
    }

    /// After the last grant is revoked the admin behaves exactly like an
    /// admin that never had any grant.
    #[test]
    fn prop_empty_set_equals_unknown_admin(
        resources in prop::collection::vec(resource_strategy(), 1..6),
        candidate_resource in resource_strategy(),
        candidate_action in concrete_action_strategy(),
    ) {
        let store = PermissionStore::new();
        for resource in &resources {
            store.grant_permission("a1", Permission::new(resource.clone(), Action::Read));
        }
        for resource in &resources {
            store.revoke_permission("a1", &Permission::new(resource.clone(), Action::Read));
        }

        let candidate = Permission::new(candidate_resource, candidate_action);
        prop_assert_eq!(
            store.check_permission("a1", &candidate),
            store.check_permission("never-seen", &candidate)
        );
        prop_assert_eq!(store.admin_count(), 0);
    }

    /// Repeated grants of the same permission never create duplicates.
    #[test]
    fn prop_grants_have_set_semantics(
        resource in resource_strategy(),
        action in concrete_action_strategy(),
        repeats in 1usize..10,
    ) {
        let store = PermissionStore::new();
        for _ in 0..repeats {
            store.grant_permission("a1", Permission::new(resource.clone(), action));
        }
        prop_assert_eq!(store.permissions_for("a1").len(), 1);
    }
}

#[test]
fn test_update_grant_does_not_imply_delete() {
    let store = PermissionStore::new();
    store.grant_permission("a1", Permission::new("users", Action::Update));

    assert!(store.check_permission("a1", &Permission::new("users", Action::Update)));
    assert!(!store.check_permission("a1", &Permission::new("users", Action::Delete)));

    store.revoke_permission("a1", &Permission::new("users", Action::Update));
    assert!(!store.check_permission("a1", &Permission::new("users", Action::Update)));
}

#[test]
fn test_concurrent_grants_are_not_lost() {
    let store = Arc::new(PermissionStore::new());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..50 {
                    store.grant_permission(
                        "a1",
                        Permission::new(format!("resource_{}_{}", worker, i), Action::Read),
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.permissions_for("a1").len(), 8 * 50);
}

#[test]
fn test_concurrent_grant_and_revoke_leave_consistent_state() {
    let store = Arc::new(PermissionStore::new());
    let perm = Permission::new("tools", Action::Update);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            let perm = perm.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    if worker % 2 == 0 {
                        store.grant_permission("a1", perm.clone());
                    } else {
                        store.revoke_permission("a1", &perm);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let granted = store.permissions_for("a1");
    assert!(granted.len() <= 1);
    assert_eq!(store.check_permission("a1", &perm), granted.len() == 1);
    assert_eq!(store.admin_count(), granted.len());
}
