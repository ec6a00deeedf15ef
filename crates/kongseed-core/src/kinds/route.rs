use kongseed_storage::{Row, Table};
use uuid::Uuid;

use super::{EntityKind, Parents};
use crate::context::EntityCache;
use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::model::{RouteKey, RouteRecord};
use crate::naming;
use crate::scope::Scope;

/// Routes hang off every in-scope service that has a name.
///
/// Unnamed or serviceless routes in an active workspace never match a
/// desired key.
#[derive(Debug, Clone, Copy)]
pub struct RouteKind;

impl EntityKind for RouteKind {
    type Record = RouteRecord;
    type Key = RouteKey;

    const TABLE: Table = Table::Routes;
    const NEEDS_SERVICES: bool = true;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>> {
        cache.routes.as_ref()
    }

    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>> {
        &mut cache.routes
    }

    fn in_scope(record: &Self::Record, scope: &Scope) -> bool {
        scope.contains_workspace_id(record.ws_id)
    }

    fn key_of(record: &Self::Record) -> Option<Self::Key> {
        let name = record.name.as_ref()?;
        let service_id = record.service_id?;
        Some(RouteKey {
            name: name.clone(),
            service_id,
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
            .filter_map(|svc| svc.name.as_deref().map(|name| (svc, name)))
            .flat_map(|(svc, name)| {
                (0..desired.routes_per_service).map(move |index| RouteKey {
                    name: naming::route_name(name, index),
                    service_id: svc.id,
                    ws_id: svc.ws_id,
                })
            })
            .collect()
    }

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row> {
        Ok(hydrator.route(key))
    }
}
