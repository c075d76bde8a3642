//! Grant/revoke planning for resource permissions.
//!
//! Data sets and data sources share the same permissions API shape: it takes deltas, not a
//! desired list. [`diff_permissions`] turns the current and desired lists into the two
//! deltas, per principal and per action.

use crate::api::ResourcePermission;
use std::collections::{BTreeMap, BTreeSet};

fn by_principal(permissions: &[ResourcePermission]) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut out: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for permission in permissions {
        out.entry(permission.principal.as_str())
            .or_default()
            .extend(permission.actions.iter().map(String::as_str));
    }
    out
}

fn to_permissions(deltas: BTreeMap<&str, BTreeSet<&str>>) -> Vec<ResourcePermission> {
    deltas
        .into_iter()
        .filter(|(_, actions)| !actions.is_empty())
        .map(|(principal, actions)| ResourcePermission {
            principal: principal.to_string(),
            actions: actions.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

/// Returns `(grant, revoke)`. Both are empty when the lists hold the same actions.
pub fn diff_permissions(
    current: &[ResourcePermission],
    desired: &[ResourcePermission],
) -> (Vec<ResourcePermission>, Vec<ResourcePermission>) {
    let current = by_principal(current);
    let desired = by_principal(desired);

    let grant = desired
        .iter()
        .map(|(principal, actions)| {
            let held = current.get(principal);
            let missing = actions
                .iter()
                .filter(|a| !held.is_some_and(|h| h.contains(*a)))
                .copied()
                .collect();
            (*principal, missing)
        })
        .collect();

    let revoke = current
        .iter()
        .map(|(principal, actions)| {
            let wanted = desired.get(principal);
            let stale = actions
                .iter()
                .filter(|a| !wanted.is_some_and(|w| w.contains(*a)))
                .copied()
                .collect();
            (*principal, stale)
        })
        .collect();

    (to_permissions(grant), to_permissions(revoke))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn permission(principal: &str, actions: &[&str]) -> ResourcePermission {
        ResourcePermission {
            principal: principal.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_same_actions_in_another_order_need_nothing() {
        let current = [permission("alice", &["Describe", "Update"])];
        let desired = [permission("alice", &["Update", "Describe"])];
        let (grant, revoke) = diff_permissions(&current, &desired);
        assert!(grant.is_empty());
        assert!(revoke.is_empty());
    }

    #[test]
    fn test_new_principal_is_granted_and_dropped_one_revoked() {
        let current = [permission("alice", &["Describe"])];
        let desired = [permission("bob", &["Describe", "Update"])];
        let (grant, revoke) = diff_permissions(&current, &desired);
        assert_eq!(grant, vec![permission("bob", &["Describe", "Update"])]);
        assert_eq!(revoke, vec![permission("alice", &["Describe"])]);
    }

    #[test]
    fn test_actions_are_diffed_per_principal() {
        let current = [permission("alice", &["Describe", "Delete"])];
        let desired = [permission("alice", &["Describe", "Update"])];
        let (grant, revoke) = diff_permissions(&current, &desired);
        assert_eq!(grant, vec![permission("alice", &["Update"])]);
        assert_eq!(revoke, vec![permission("alice", &["Delete"])]);
    }
}
