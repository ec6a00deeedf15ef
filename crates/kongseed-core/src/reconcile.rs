//! The reconciler: set-difference between desired and current composite keys.

use std::collections::HashSet;

use uuid::Uuid;

use crate::kinds::EntityKind;
use crate::scope::Scope;

/// What one kind needs to converge.
#[derive(Debug, Clone)]
pub struct Plan<K: EntityKind> {
    /// Number of distinct desired keys.
    pub desired: usize,
    /// Desired keys with no current in-scope row, in desired order.
    pub to_create: Vec<K::Key>,
    /// Delete keys of in-scope rows whose key is not desired.
    pub to_delete: Vec<Uuid>,
}

impl<K: EntityKind> Plan<K> {
    pub fn is_converged(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Diffs `desired` against the `current` rows of `K`.
///
/// Rows outside `scope` are ignored entirely: they never suppress a create
/// and are never proposed for deletion.
pub fn reconcile<K: EntityKind>(
    current: &[K::Record],
    desired: Vec<K::Key>,
    scope: &Scope,
) -> Plan<K> {
    let in_scope: Vec<&K::Record> = current.iter().filter(|r| K::in_scope(r, scope)).collect();
    let present: HashSet<K::Key> = in_scope.iter().filter_map(|r| K::key_of(r)).collect();

    let mut seen = HashSet::with_capacity(desired.len());
    let mut unique = Vec::with_capacity(desired.len());
    for key in desired {
        if seen.insert(key.clone()) {
            unique.push(key);
        }
    }

    let mut deleted = HashSet::new();
    let to_delete = in_scope
        .iter()
        .filter(|r| K::key_of(r).is_none_or(|key| !seen.contains(&key)))
        .map(|r| K::record_id(r))
        .filter(|id| deleted.insert(*id))
        .collect();

    Plan {
        desired: unique.len(),
        to_create: unique.into_iter().filter(|k| !present.contains(k)).collect(),
        to_delete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{RoleEndpointKind, ServiceKind, WorkspaceKind};
    use crate::model::{
        RoleEndpointKey, RoleEndpointRecord, ServiceKey, ServiceRecord, WorkspaceKey,
        WorkspaceRecord,
    };

    fn ws(name: &str) -> WorkspaceRecord {
        WorkspaceRecord {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    fn wkey(name: &str) -> WorkspaceKey {
        WorkspaceKey { name: name.into() }
    }

    #[test]
    fn test_create_is_desired_minus_current() {
        let current = [ws("perf-workspace-0")];
        let scope = Scope::new(&current, ["perf-workspace-0", "perf-workspace-1"]);
        let plan = reconcile::<WorkspaceKind>(
            &current,
            vec![wkey("perf-workspace-0"), wkey("perf-workspace-1")],
            &scope,
        );
        assert_eq!(plan.desired, 2);
        assert_eq!(plan.to_create, vec![wkey("perf-workspace-1")]);
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_duplicate_desired_keys_are_created_once() {
        let scope = Scope::default();
        let plan = reconcile::<WorkspaceKind>(&[], vec![wkey("a"), wkey("a"), wkey("b")], &scope);
        assert_eq!(plan.to_create, vec![wkey("a"), wkey("b")]);
        assert_eq!(plan.desired, 2);
    }

    #[test]
    fn test_empty_desired_deletes_everything_in_scope() {
        let ours = ws("perf-workspace-0");
        let theirs = ws("other-workspace-0");
        let current = [ours.clone(), theirs];
        let scope = Scope::new(&current, ["perf-workspace-0"]);
        let plan = reconcile::<WorkspaceKind>(&current, Vec::new(), &scope);
        assert!(plan.to_create.is_empty());
        assert_eq!(plan.to_delete, vec![ours.id]);
    }

    #[test]
    fn test_out_of_scope_rows_never_suppress_or_delete() {
        let ours = ws("perf-workspace-0");
        let theirs = ws("other-workspace-0");
        let scope = Scope::new(&[ours.clone(), theirs.clone()], ["perf-workspace-0"]);
        let foreign_svc = ServiceRecord {
            id: Uuid::new_v4(),
            name: Some("perf-workspace-0-svc-0".into()),
            ws_id: theirs.id,
        };
        let plan = reconcile::<ServiceKind>(
            &[foreign_svc],
            vec![ServiceKey {
                name: "perf-workspace-0-svc-0".into(),
                ws_id: ours.id,
            }],
            &scope,
        );
        assert_eq!(plan.to_create.len(), 1);
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_unnamed_rows_in_scope_are_orphans() {
        let ours = ws("perf-workspace-0");
        let scope = Scope::new(std::slice::from_ref(&ours), ["perf-workspace-0"]);
        let unnamed = ServiceRecord {
            id: Uuid::new_v4(),
            name: None,
            ws_id: ours.id,
        };
        let plan = reconcile::<ServiceKind>(&[unnamed.clone()], Vec::new(), &scope);
        assert_eq!(plan.to_delete, vec![unnamed.id]);
    }

    #[test]
    fn test_endpoint_deletes_are_deduplicated_by_role() {
        let ours = ws("perf-workspace-0");
        let scope = Scope::new(std::slice::from_ref(&ours), ["perf-workspace-0"]);
        let role_id = Uuid::new_v4();
        let endpoint = |path: &str| RoleEndpointRecord {
            role_id,
            workspace: "perf-workspace-0".into(),
            endpoint: path.into(),
        };
        let plan = reconcile::<RoleEndpointKind>(
            &[endpoint("*"), endpoint("/services")],
            Vec::<RoleEndpointKey>::new(),
            &scope,
        );
        assert_eq!(plan.to_delete, vec![role_id]);
        assert!(!plan.is_converged());
    }
}
