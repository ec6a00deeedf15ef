//! Hydrators: expand composite keys into full rows for positional bulk append.
//!
//! Column order follows [`Table::insert_columns`](kongseed_storage::Table::insert_columns).
//! Apart from fresh identifiers and the run timestamp, hydration is a pure
//! function of the key and the desired state.

use kongseed_storage::{Cell, Row};
use serde_json::json;

use crate::desired::DesiredState;
use crate::error::{SeedError, SeedResult};
use crate::model::{
    ConsumerKey, PluginKey, RoleEndpointKey, RoleKey, RouteKey, ServiceKey, WorkspaceKey,
};
use crate::naming::{self, new_id};
use crate::scope::Scope;

const ROUTE_PROTOCOLS: &[&str] = &["http", "https"];
const PLUGIN_PROTOCOLS: &[&str] = &["grpc", "grpcs", "http", "https"];
const HTTPS_REDIRECT_STATUS_CODE: u32 = 426;
const PATH_HANDLING: &str = "v0";
const ENDPOINT_ALL_ACTIONS: u32 = 15;
const CONSUMER_TYPE_PROXY: u32 = 0;

fn text_array(items: &[&str]) -> Cell {
    Cell::TextArray(items.iter().map(|s| (*s).to_string()).collect())
}

/// Per-run row builder.
#[derive(Debug, Clone, Copy)]
pub struct Hydrator<'a> {
    desired: &'a DesiredState,
    scope: &'a Scope,
    timestamp: &'a str,
}

impl<'a> Hydrator<'a> {
    pub fn new(desired: &'a DesiredState, scope: &'a Scope, timestamp: &'a str) -> Self {
        Self {
            desired,
            scope,
            timestamp,
        }
    }

    pub fn workspace(&self, key: &WorkspaceKey) -> Row {
        // the identifier generated alongside the name, when there is one
        let id = self.desired.workspace_id(&key.name).unwrap_or_else(new_id);
        vec![
            id.into(),
            key.name.as_str().into(),
            json!({"color": "#3894f0", "thumbnail": null}).into(),
        ]
    }

    pub fn role(&self, key: &RoleKey) -> Row {
        let workspace = self.scope.workspace_name(key.ws_id).unwrap_or_default();
        vec![
            new_id().into(),
            key.name.as_str().into(),
            naming::role_comment(workspace).into(),
            false.into(),
            key.ws_id.into(),
        ]
    }

    pub fn role_endpoint(&self, key: &RoleEndpointKey) -> Row {
        vec![
            key.role_id.into(),
            key.workspace.as_str().into(),
            key.endpoint.as_str().into(),
            ENDPOINT_ALL_ACTIONS.into(),
            false.into(),
        ]
    }

    pub fn service(&self, key: &ServiceKey) -> Row {
        let defaults = &self.desired.service;
        vec![
            new_id().into(),
            key.name.as_str().into(),
            defaults.retries.into(),
            defaults.protocol.as_str().into(),
            defaults.host.as_str().into(),
            defaults.port.into(),
            defaults.path.as_str().into(),
            defaults.connect_timeout.into(),
            defaults.write_timeout.into(),
            defaults.read_timeout.into(),
            key.ws_id.into(),
            true.into(),
            self.timestamp.into(),
            self.timestamp.into(),
        ]
    }

    pub fn route(&self, key: &RouteKey) -> Row {
        vec![
            new_id().into(),
            key.name.as_str().into(),
            key.service_id.into(),
            text_array(ROUTE_PROTOCOLS),
            Cell::TextArray(vec![self.desired.route_path(&key.name)]),
            0i64.into(),
            true.into(),
            false.into(),
            HTTPS_REDIRECT_STATUS_CODE.into(),
            PATH_HANDLING.into(),
            key.ws_id.into(),
            true.into(),
            true.into(),
            self.timestamp.into(),
            self.timestamp.into(),
        ]
    }

    pub fn consumer(&self, key: &ConsumerKey) -> Row {
        vec![
            new_id().into(),
            key.username.as_str().into(),
            key.ws_id.into(),
            key.username.to_lowercase().into(),
            CONSUMER_TYPE_PROXY.into(),
        ]
    }

    /// Fails when `key` names a plugin without an enabled configuration.
    pub fn plugin(&self, key: &PluginKey) -> SeedResult<Row> {
        let config = self.desired.plugin_config(&key.name).ok_or_else(|| {
            SeedError::config(format!("plugin {} has no configuration to write", key.name))
        })?;
        let cache_key = key
            .service_id
            .map(|service_id| naming::plugin_cache_key(&key.name, service_id, key.ws_id));
        Ok(vec![
            new_id().into(),
            key.name.as_str().into(),
            key.service_id.into(),
            config.clone().into(),
            true.into(),
            cache_key.into(),
            text_array(PLUGIN_PROTOCOLS),
            key.ws_id.into(),
        ])
    }
}
