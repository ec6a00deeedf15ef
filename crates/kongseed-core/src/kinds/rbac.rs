//! RBAC roles and role endpoints.
//!
//! Roles carry a workspace identifier and are scoped by it; endpoints carry
//! a workspace *name* and are scoped by that instead. Both predicates read the
//! same active-workspace set.

use kongseed_storage::{Row, Table};
use uuid::Uuid;

use super::{EntityKind, Parents};
use crate::context::EntityCache;
use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::model::{RoleEndpointKey, RoleEndpointRecord, RoleKey, RoleRecord};
use crate::naming::SUPER_ADMIN_ROLE;
use crate::scope::Scope;

/// Endpoint granted to the super-admin role.
pub const ALL_ENDPOINTS: &str = "*";

#[derive(Debug, Clone, Copy)]
pub struct RoleKind;

impl EntityKind for RoleKind {
    type Record = RoleRecord;
    type Key = RoleKey;

    const TABLE: Table = Table::RbacRoles;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>> {
        cache.roles.as_ref()
    }

    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>> {
        &mut cache.roles
    }

    fn in_scope(record: &Self::Record, scope: &Scope) -> bool {
        scope.contains_workspace_id(record.ws_id)
    }

    fn key_of(record: &Self::Record) -> Option<Self::Key> {
        Some(RoleKey {
            name: record.name.clone(),
            ws_id: record.ws_id,
        })
    }

    fn record_id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn derive_desired(desired: &DesiredState, parents: &Parents<'_>) -> Vec<Self::Key> {
        if !desired.rbac {
            return Vec::new();
        }
        parents
            .scope
            .workspaces()
            .iter()
            .map(|ws| RoleKey {
                name: SUPER_ADMIN_ROLE.to_string(),
                ws_id: ws.id,
            })
            .collect()
    }

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row> {
        Ok(hydrator.role(key))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoleEndpointKind;

impl EntityKind for RoleEndpointKind {
    type Record = RoleEndpointRecord;
    type Key = RoleEndpointKey;

    const TABLE: Table = Table::RbacRoleEndpoints;
    const NEEDS_ROLES: bool = true;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>> {
        cache.role_endpoints.as_ref()
    }

    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>> {
        &mut cache.role_endpoints
    }

    fn in_scope(record: &Self::Record, scope: &Scope) -> bool {
        scope.contains_workspace_name(&record.workspace)
    }

    fn key_of(record: &Self::Record) -> Option<Self::Key> {
        Some(RoleEndpointKey {
            role_id: record.role_id,
            workspace: record.workspace.clone(),
            endpoint: record.endpoint.clone(),
        })
    }

    fn record_id(record: &Self::Record) -> Uuid {
        record.role_id
    }

    fn derive_desired(desired: &DesiredState, parents: &Parents<'_>) -> Vec<Self::Key> {
        if !desired.rbac {
            return Vec::new();
        }
        parents
            .roles
            .iter()
            .filter(|role| role.name == SUPER_ADMIN_ROLE)
            .filter_map(|role| {
                parents
                    .scope
                    .workspace_name(role.ws_id)
                    .map(|workspace| RoleEndpointKey {
                        role_id: role.id,
                        workspace: workspace.to_string(),
                        endpoint: ALL_ENDPOINTS.to_string(),
                    })
            })
            .collect()
    }

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row> {
        Ok(hydrator.role_endpoint(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;
    use crate::desired::RouteOptions;
    use crate::model::WorkspaceRecord;

    fn fixture(rbac: bool) -> (DesiredState, Scope, WorkspaceRecord) {
        let mut config = SeedConfig::new("perf", 1);
        config.rbac = rbac;
        let desired = DesiredState::from_config(&config, RouteOptions::default());
        let ours = WorkspaceRecord {
            id: Uuid::new_v4(),
            name: "perf-workspace-0".into(),
        };
        let theirs = WorkspaceRecord {
            id: Uuid::new_v4(),
            name: "tenant-a".into(),
        };
        let scope = Scope::new(&[ours.clone(), theirs], desired.workspace_names());
        (desired, scope, ours)
    }

    #[test]
    fn test_one_super_admin_per_active_workspace() {
        let (desired, scope, ours) = fixture(true);
        let parents = Parents {
            scope: &scope,
            services: &[],
            roles: &[],
        };
        assert_eq!(
            RoleKind::derive_desired(&desired, &parents),
            vec![RoleKey {
                name: SUPER_ADMIN_ROLE.into(),
                ws_id: ours.id,
            }]
        );
    }

    #[test]
    fn test_endpoints_follow_super_admin_roles_only() {
        let (desired, scope, ours) = fixture(true);
        let admin = RoleRecord {
            id: Uuid::new_v4(),
            name: SUPER_ADMIN_ROLE.into(),
            ws_id: ours.id,
        };
        let reader = RoleRecord {
            id: Uuid::new_v4(),
            name: "read-only".into(),
            ws_id: ours.id,
        };
        let roles = [admin.clone(), reader];
        let parents = Parents {
            scope: &scope,
            services: &[],
            roles: &roles,
        };
        assert_eq!(
            RoleEndpointKind::derive_desired(&desired, &parents),
            vec![RoleEndpointKey {
                role_id: admin.id,
                workspace: "perf-workspace-0".into(),
                endpoint: ALL_ENDPOINTS.into(),
            }]
        );
    }

    #[test]
    fn test_disabled_rbac_desires_nothing() {
        let (desired, scope, ours) = fixture(false);
        let roles = [RoleRecord {
            id: Uuid::new_v4(),
            name: SUPER_ADMIN_ROLE.into(),
            ws_id: ours.id,
        }];
        let parents = Parents {
            scope: &scope,
            services: &[],
            roles: &roles,
        };
        assert!(RoleKind::derive_desired(&desired, &parents).is_empty());
        assert!(RoleEndpointKind::derive_desired(&desired, &parents).is_empty());
    }

    #[test]
    fn test_scoping_predicates() {
        let (_, scope, ours) = fixture(true);
        let role = |ws_id| RoleRecord {
            id: Uuid::new_v4(),
            name: SUPER_ADMIN_ROLE.into(),
            ws_id,
        };
        assert!(RoleKind::in_scope(&role(ours.id), &scope));
        assert!(!RoleKind::in_scope(&role(Uuid::new_v4()), &scope));

        let endpoint = |workspace: &str| RoleEndpointRecord {
            role_id: Uuid::new_v4(),
            workspace: workspace.into(),
            endpoint: ALL_ENDPOINTS.into(),
        };
        assert!(RoleEndpointKind::in_scope(&endpoint("perf-workspace-0"), &scope));
        assert!(!RoleEndpointKind::in_scope(&endpoint("tenant-a"), &scope));
    }
}
