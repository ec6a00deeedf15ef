use kongseed_storage::{Row, Table};
use uuid::Uuid;

use super::{EntityKind, Parents};
use crate::context::EntityCache;
use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::model::{ConsumerKey, ConsumerRecord};
use crate::naming;
use crate::scope::Scope;

#[derive(Debug, Clone, Copy)]
pub struct ConsumerKind;

impl EntityKind for ConsumerKind {
    type Record = ConsumerRecord;
    type Key = ConsumerKey;

    const TABLE: Table = Table::Consumers;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>> {
        cache.consumers.as_ref()
    }

    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>> {
        &mut cache.consumers
    }

    fn in_scope(record: &Self::Record, scope: &Scope) -> bool {
        scope.contains_workspace_id(record.ws_id)
    }

    fn key_of(record: &Self::Record) -> Option<Self::Key> {
        record.username.as_ref().map(|username| ConsumerKey {
            username: username.clone(),
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
                (0..desired.consumers_per_workspace).map(move |index| ConsumerKey {
                    username: naming::consumer_name(&ws.name, index),
                    ws_id: ws.id,
                })
            })
            .collect()
    }

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row> {
        Ok(hydrator.consumer(key))
    }
}
