use kongseed_storage::{Row, Table};
use uuid::Uuid;

use super::{EntityKind, Parents};
use crate::context::EntityCache;
use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::model::{PluginKey, PluginRecord};
use crate::scope::Scope;

/// Plugins: one per configured plugin kind per in-scope service.
///
/// Only plugin kinds with a configuration object are instantiated. Global
/// plugins (no service) in an active workspace never match a desired key.
#[derive(Debug, Clone, Copy)]
pub struct PluginKind;

impl EntityKind for PluginKind {
    type Record = PluginRecord;
    type Key = PluginKey;

    const TABLE: Table = Table::Plugins;
    const NEEDS_SERVICES: bool = true;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>> {
        cache.plugins.as_ref()
    }

    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>> {
        &mut cache.plugins
    }

    fn in_scope(record: &Self::Record, scope: &Scope) -> bool {
        scope.contains_workspace_id(record.ws_id)
    }

    fn key_of(record: &Self::Record) -> Option<Self::Key> {
        Some(PluginKey {
            name: record.name.clone(),
            service_id: record.service_id,
            ws_id: record.ws_id,
        })
    }

    fn record_id(record: &Self::Record) -> Uuid {
        record.id
    }

    fn derive_desired(desired: &DesiredState, parents: &Parents<'_>) -> Vec<Self::Key> {
        parents
            .services
            .iter()
            .flat_map(|svc| {
                desired.plugins.iter().map(move |(name, _)| PluginKey {
                    name: name.clone(),
                    service_id: Some(svc.id),
                    ws_id: svc.ws_id,
                })
            })
            .collect()
    }

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row> {
        hydrator.plugin(key)
    }
}
