//! Deterministic entity names and fresh identifiers.
//!
//! A name is the only identity used for diffing; identifiers are generated
//! per instance and never compared across runs.

use uuid::Uuid;

/// Name of the RBAC role created in each workspace.
pub const SUPER_ADMIN_ROLE: &str = "workspace-super-admin";

/// A freshly generated identifier paired with a derived name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntity {
    pub id: Uuid,
    pub name: String,
}

/// Returns a new random 128-bit identifier.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Produces `quantity` entities named `<prefix>-<kind>-<index>`.
pub fn name_gen(prefix: &str, kind: &str, quantity: u32) -> Vec<NamedEntity> {
    (0..quantity)
        .map(|index| NamedEntity {
            id: new_id(),
            name: format!("{prefix}-{kind}-{index}"),
        })
        .collect()
}

pub fn workspace_name(prefix: &str, index: u32) -> String {
    format!("{prefix}-workspace-{index}")
}

pub fn service_name(workspace: &str, index: u32) -> String {
    format!("{workspace}-svc-{index}")
}

pub fn route_name(service: &str, index: u32) -> String {
    format!("{service}-route-{index}")
}

pub fn consumer_name(workspace: &str, index: u32) -> String {
    format!("{workspace}-consumer-{index}")
}

pub fn role_comment(workspace: &str) -> String {
    format!("Full access to all endpoints in the {workspace} workspace")
}

/// Cache key Kong derives for a plugin bound to a service.
pub fn plugin_cache_key(plugin: &str, service_id: Uuid, ws_id: Uuid) -> String {
    format!("plugins:{plugin}::{service_id}:::{ws_id}")
}
