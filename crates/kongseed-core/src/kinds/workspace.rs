use kongseed_storage::{Row, Table};
use uuid::Uuid;

use super::{EntityKind, Parents};
use crate::context::EntityCache;
use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::model::{WorkspaceKey, WorkspaceRecord};
use crate::scope::Scope;

/// Workspaces: the root of every scope.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceKind;

impl EntityKind for WorkspaceKind {
    type Record = WorkspaceRecord;
    type Key = WorkspaceKey;

    const TABLE: Table = Table::Workspaces;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>> {
        cache.workspaces.as_ref()
    }

    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>> {
        &mut cache.workspaces
    }

    fn in_scope(record: &Self::Record, scope: &Scope) -> bool {
        scope.contains_workspace_id(record.id)
    }

    fn key_of(record: &Self::Record) -> Option<Self::Key> {
        Some(WorkspaceKey {
            name: record.name.clone(),
        })
    }

    fn record_id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn derive_desired(desired: &DesiredState, _parents: &Parents<'_>) -> Vec<Self::Key> {
        desired
            .workspace_names()
            .map(|name| WorkspaceKey {
                name: name.to_string(),
            })
            .collect()
    }

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row> {
        Ok(hydrator.workspace(key))
    }
}
