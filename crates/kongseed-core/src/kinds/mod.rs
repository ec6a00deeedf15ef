//! Per-kind reconciliation behaviour.
//!
//! Each gateway table is handled by a zero-sized marker type implementing
//! [`EntityKind`]. The runner visits them through a fixed ordered list.

use std::fmt::Debug;
use std::hash::Hash;

use kongseed_storage::{Row, Table};
use uuid::Uuid;

use crate::context::EntityCache;
use crate::desired::DesiredState;
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::model::{RoleRecord, ServiceRecord};
use crate::readers::FromRecord;
use crate::scope::Scope;

mod consumer;
mod plugin;
mod rbac;
mod route;
mod service;
mod workspace;

pub use consumer::ConsumerKind;
pub use plugin::PluginKind;
pub use rbac::{RoleEndpointKind, RoleKind};
pub use route::RouteKind;
pub use service::ServiceKind;
pub use workspace::WorkspaceKind;

/// Parent entities a kind's desired keys are derived from.
#[derive(Debug, Clone, Copy)]
pub struct Parents<'a> {
    pub scope: &'a Scope,
    /// In-scope services; empty unless the kind asks for them.
    pub services: &'a [ServiceRecord],
    /// In-scope roles; empty unless the kind asks for them.
    pub roles: &'a [RoleRecord],
}

pub trait EntityKind {
    type Record: FromRecord + Clone + Debug + Send + Sync;
    type Key: Clone + Eq + Hash + Debug;

    const TABLE: Table;
    /// Desired keys hang off current services.
    const NEEDS_SERVICES: bool = false;
    /// Desired keys hang off current RBAC roles.
    const NEEDS_ROLES: bool = false;

    fn slot(cache: &EntityCache) -> Option<&Vec<Self::Record>>;
    fn slot_mut(cache: &mut EntityCache) -> &mut Option<Vec<Self::Record>>;

    /// Whether a current row belongs to an active workspace.
    fn in_scope(record: &Self::Record, scope: &Scope) -> bool;

    /// Composite key of a current row. `None` when the row cannot match any
    /// desired key, e.g. an unnamed service.
    fn key_of(record: &Self::Record) -> Option<Self::Key>;

    /// Value matched by the table's delete key.
    fn record_id(record: &Self::Record) -> Uuid;

    fn derive_desired(desired: &DesiredState, parents: &Parents<'_>) -> Vec<Self::Key>;

    fn hydrate(key: &Self::Key, hydrator: &Hydrator<'_>) -> SeedResult<Row>;
}
