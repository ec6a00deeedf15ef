//! Per-run context: the store handle and a typed cache of current entities.

use kongseed_storage::{EntityStore, Table};
use tracing::debug;

use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::kinds::{EntityKind, WorkspaceKind};
use crate::model::{
    ConsumerRecord, PluginRecord, RoleEndpointRecord, RoleRecord, RouteRecord, ServiceRecord,
    WorkspaceRecord,
};
use crate::readers;
use crate::scope::Scope;

/// Current entities per kind, filled lazily and dropped after every mutation
/// of that kind.
#[derive(Debug, Default)]
pub struct EntityCache {
    pub(crate) workspaces: Option<Vec<WorkspaceRecord>>,
    pub(crate) roles: Option<Vec<RoleRecord>>,
    pub(crate) role_endpoints: Option<Vec<RoleEndpointRecord>>,
    pub(crate) services: Option<Vec<ServiceRecord>>,
    pub(crate) routes: Option<Vec<RouteRecord>>,
    pub(crate) consumers: Option<Vec<ConsumerRecord>>,
    pub(crate) plugins: Option<Vec<PluginRecord>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self, table: Table) {
        match table {
            Table::Workspaces => self.workspaces = None,
            Table::RbacRoles => self.roles = None,
            Table::RbacRoleEndpoints => self.role_endpoints = None,
            Table::Services => self.services = None,
            Table::Routes => self.routes = None,
            Table::Consumers => self.consumers = None,
            Table::Plugins => self.plugins = None,
        }
        debug!(table = %table, "Invalidated cached entities");
    }

    pub fn is_loaded(&self, table: Table) -> bool {
        match table {
            Table::Workspaces => self.workspaces.is_some(),
            Table::RbacRoles => self.roles.is_some(),
            Table::RbacRoleEndpoints => self.role_endpoints.is_some(),
            Table::Services => self.services.is_some(),
            Table::Routes => self.routes.is_some(),
            Table::Consumers => self.consumers.is_some(),
            Table::Plugins => self.plugins.is_some(),
        }
    }
}

pub struct RunContext<'a> {
    store: &'a dyn EntityStore,
    desired: &'a DesiredState,
    cache: EntityCache,
}

impl<'a> RunContext<'a> {
    pub fn new(store: &'a dyn EntityStore, desired: &'a DesiredState) -> Self {
        Self {
            store,
            desired,
            cache: EntityCache::new(),
        }
    }

    pub fn store(&self) -> &'a dyn EntityStore {
        self.store
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Current rows of `K`, read from the store on first use.
    pub async fn records<'b, K: EntityKind>(&'b mut self) -> SeedResult<&'b [K::Record]>
    where
        K::Record: 'b,
    {
        if !self.cache.is_loaded(K::TABLE) {
            let fresh = readers::read_all::<K::Record>(self.store).await?;
            debug!(table = %K::TABLE, rows = fresh.len(), "Refreshed cached entities");
            *K::slot_mut(&mut self.cache) = Some(fresh);
        }
        Ok(K::slot(&self.cache).map(Vec::as_slice).unwrap_or_default())
    }

    /// Current rows of `K` that belong to an active workspace.
    pub async fn scoped<K: EntityKind>(&mut self, scope: &Scope) -> SeedResult<Vec<K::Record>> {
        Ok(self
            .records::<K>()
            .await?
            .iter()
            .filter(|r| K::in_scope(r, scope))
            .cloned()
            .collect())
    }

    /// Active workspaces as of the current cache.
    pub async fn scope(&mut self) -> SeedResult<Scope> {
        let desired = self.desired;
        let workspaces = self.records::<WorkspaceKind>().await?;
        Ok(Scope::new(workspaces, desired.workspace_names()))
    }

    pub fn invalidate(&mut self, table: Table) {
        self.cache.invalidate(table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;
    use crate::desired::RouteOptions;
    use crate::kinds::ServiceKind;
    use kongseed_db_memory::InMemoryStore;
    use kongseed_storage::Row;
    use uuid::Uuid;

    fn workspace_row(id: Uuid, name: &str) -> Row {
        vec![id.into(), name.into(), serde_json::json!({}).into()]
    }

    #[tokio::test]
    async fn test_records_are_cached_until_invalidated() {
        let store = InMemoryStore::new();
        let desired = DesiredState::from_config(&SeedConfig::new("perf", 1), RouteOptions::default());
        let mut ctx = RunContext::new(&store, &desired);

        assert!(ctx.records::<WorkspaceKind>().await.unwrap().is_empty());
        assert!(ctx.cache().is_loaded(Table::Workspaces));

        store
            .bulk_insert(
                Table::Workspaces,
                Table::Workspaces.insert_columns(),
                &[workspace_row(Uuid::new_v4(), "perf-workspace-0")],
            )
            .await
            .unwrap();
        // stale until invalidated
        assert!(ctx.records::<WorkspaceKind>().await.unwrap().is_empty());

        ctx.invalidate(Table::Workspaces);
        assert!(!ctx.cache().is_loaded(Table::Workspaces));
        assert_eq!(ctx.records::<WorkspaceKind>().await.unwrap().len(), 1);
        assert_eq!(ctx.scope().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scoped_filters_foreign_workspaces() {
        let store = InMemoryStore::new();
        let ours = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        store
            .bulk_insert(
                Table::Workspaces,
                Table::Workspaces.insert_columns(),
                &[
                    workspace_row(ours, "perf-workspace-0"),
                    workspace_row(theirs, "other-workspace-0"),
                ],
            )
            .await
            .unwrap();
        let desired = DesiredState::from_config(&SeedConfig::new("perf", 1), RouteOptions::default());
        let hydrator_scope = Scope::default();
        let ts = "2024-01-01 00:00:00+00";
        let hydrator = crate::hydrate::Hydrator::new(&desired, &hydrator_scope, ts);
        let rows: Vec<Row> = [ours, theirs]
            .iter()
            .map(|ws| {
                hydrator.service(&crate::model::ServiceKey {
                    name: "svc".into(),
                    ws_id: *ws,
                })
            })
            .collect();
        store
            .bulk_insert(Table::Services, Table::Services.insert_columns(), &rows)
            .await
            .unwrap();

        let mut ctx = RunContext::new(&store, &desired);
        let scope = ctx.scope().await.unwrap();
        let services = ctx.scoped::<ServiceKind>(&scope).await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].ws_id, ours);
    }
}
