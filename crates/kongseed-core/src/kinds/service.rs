use kongseed_storage::{Row, Table};
use uuid::Uuid;

use super::{EntityKind, Parents};
use crate::context::EntityCache;
use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::model::{ServiceKey, ServiceRecord};
use crate::naming;
use crate::scope::Scope;

#[derive(Debug, Clone, Copy)]
pub struct ServiceKind;

impl EntityKind for ServiceKind {
    type Record = ServiceRecord;
    type Key = ServiceKey;

    const TABLE: Table = Table::Services;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>> {
        cache.services.as_ref()
    }

    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>> {
        &mut cache.services
    }

    fn in_scope(record: &Self::Record, scope: &Scope) -> bool {
        scope.contains_workspace_id(record.ws_id)
    }

    fn key_of(record: &Self::Record) -> Option<Self::Key> {
        record.name.as_ref().map(|name| ServiceKey {
            name: name.clone(),
            ws_id: record.ws_id,
        })
    }

    fn record_id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn derive_desired(desired: &DesiredState, parents: &Parents<'_>) -> Vec<Self::Key> {
        parents
            .scope
            .workspaces()
            .iter()
            .flat_map(|ws| {
                (0..desired.services_per_workspace).map(move |index| ServiceKey {
                    name: naming::service_name(&ws.name, index),
                    ws_id: ws.id,
                })
            })
            .collect()
    }

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row> {
        Ok(hydrator.service(key))
    }
}
