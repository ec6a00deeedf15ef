//! The set of active workspaces a run may touch.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::WorkspaceRecord;

/// Workspaces that exist in the store and are named by the configuration.
///
/// Anything outside this set belongs to another tenant and is never read
/// into a plan.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    active: Vec<WorkspaceRecord>,
    by_id: HashMap<Uuid, String>,
    names: HashSet<String>,
}

impl Scope {
    /// Builds the scope from the current workspace rows and the configured names.
    pub fn new<'a>(
        current: &[WorkspaceRecord],
        configured: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let configured: HashSet<&str> = configured.into_iter().collect();
        let active: Vec<WorkspaceRecord> = current
            .iter()
            .filter(|ws| configured.contains(ws.name.as_str()))
            .cloned()
            .collect();
        let by_id = active.iter().map(|ws| (ws.id, ws.name.clone())).collect();
        let names = active.iter().map(|ws| ws.name.clone()).collect();
        Self {
            active,
            by_id,
            names,
        }
    }

    /// Active workspaces in store order.
    pub fn workspaces(&self) -> &[WorkspaceRecord] {
        &self.active
    }

    /// Scoping predicate for rows that carry a workspace identifier.
    pub fn contains_workspace_id(&self, ws_id: Uuid) -> bool {
        self.by_id.contains_key(&ws_id)
    }

    /// Scoping predicate for rows that carry a workspace name (role endpoints).
    pub fn contains_workspace_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn workspace_name(&self, ws_id: Uuid) -> Option<&str> {
        self.by_id.get(&ws_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
