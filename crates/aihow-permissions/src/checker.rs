//! Permission checking logic

use crate::models::{Action, Conditions, Permission, WILDCARD};

/// Check whether `existing` conditions authorize `requested` conditions
///
/// - both absent: compatible
/// - exactly one absent: incompatible
/// - both present: every requested key must be present in `existing` with an
///   equal value, or with the value `"*"`. Keys only in `existing` are ignored.
///
/// The check is asymmetric; argument order matters.
pub fn check_conditions(existing: Option<&Conditions>, requested: Option<&Conditions>) -> bool {
    match (existing, requested) {
        (None, None) => true,
        (Some(_), None) | (None, Some(_)) => false,
        (Some(existing), Some(requested)) => requested.iter().all(|(key, value)| {
            existing
                .get(key)
                .is_some_and(|granted| granted == value || granted.as_str() == Some(WILDCARD))
        }),
    }
}

/// Stateless evaluation of a requested permission against a grant set
pub struct PermissionChecker;

impl PermissionChecker {
    /// Check whether any grant authorizes the requested permission
    ///
    /// A grant with the same resource and action authorizes the request when
    /// its conditions are compatible. Failing that, a grant on resource `"*"`
    /// authorizes the request when its action is equal or `"*"`; conditions
    /// are not consulted for resource wildcards.
    pub fn is_authorized(granted: &[Permission], requested: &Permission) -> bool {
        let direct = granted.iter().any(|perm| {
            perm.resource == requested.resource
                && perm.action == requested.action
                && check_conditions(perm.conditions.as_ref(), requested.conditions.as_ref())
        });

        direct
            || granted.iter().any(|perm| {
                perm.is_wildcard_resource()
                    && (perm.action == requested.action || perm.action == Action::Any)
            })
    }

    /// Whether `stored` is structurally equal to `target` for revocation
    pub fn matches_for_revocation(stored: &Permission, target: &Permission) -> bool {
        stored.resource == target.resource
            && stored.action == target.action
            && check_conditions(stored.conditions.as_ref(), target.conditions.as_ref())
    }
}
