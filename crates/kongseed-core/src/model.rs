//! Typed records read from the store and the composite keys used for diffing.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRecord {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceKey {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: Uuid,
    pub name: String,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleKey {
    pub name: String,
    pub ws_id: Uuid,
}

/// Role endpoints have no identifier of their own; they are deleted by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEndpointRecord {
    pub role_id: Uuid,
    /// Workspace name, not identifier.
    pub workspace: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleEndpointKey {
    pub role_id: Uuid,
    pub workspace: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub name: Option<String>,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub name: String,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub id: Uuid,
    pub name: Option<String>,
    /// `None` for routes not attached to a service.
    pub service_id: Option<Uuid>,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub name: String,
    pub service_id: Uuid,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerRecord {
    pub id: Uuid,
    /// `None` for consumers identified by `custom_id` only.
    pub username: Option<String>,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsumerKey {
    pub username: String,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRecord {
    pub id: Uuid,
    pub name: String,
    /// `None` for plugins applied globally within the workspace.
    pub service_id: Option<Uuid>,
    pub cache_key: Option<String>,
    pub ws_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginKey {
    pub name: String,
    pub service_id: Option<Uuid>,
    pub ws_id: Uuid,
}
