//! Desired state derived from configuration.

use serde_json::Value;

use crate::config::{SeedConfig, ServiceDefaults};
use crate::naming::{self, NamedEntity};

/// How route paths are rendered, both in the store and in the dump file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Put the configured prefix in front of the route name.
    pub prefix_paths: bool,
    /// Append a trailing segment after the route name.
    pub trailing_segment: bool,
}

impl RouteOptions {
    fn base(&self, prefix: &str, route: &str) -> String {
        if self.prefix_paths {
            format!("{prefix}/{route}")
        } else {
            route.to_string()
        }
    }

    /// Path stored in `routes.paths`.
    pub fn stored_path(&self, prefix: &str, route: &str) -> String {
        let base = self.base(prefix, route);
        if self.trailing_segment {
            format!("/{base}/")
        } else {
            format!("/{base}")
        }
    }

    /// Path written to the route dump for load-testing tools.
    pub fn dump_path(&self, prefix: &str, route: &str) -> String {
        let base = self.base(prefix, route);
        if self.trailing_segment {
            format!("{base}/?query=true")
        } else {
            base
        }
    }
}

/// Everything a run wants to exist, computed fresh from configuration.
#[derive(Debug, Clone)]
pub struct DesiredState {
    pub prefix: String,
    /// Desired workspaces with the identifiers they get when created.
    pub workspaces: Vec<NamedEntity>,
    pub services_per_workspace: u32,
    pub routes_per_service: u32,
    pub consumers_per_workspace: u32,
    /// Instantiated plugins and their payloads, in name order.
    pub plugins: Vec<(String, Value)>,
    pub rbac: bool,
    pub service: ServiceDefaults,
    pub routes: RouteOptions,
}

impl DesiredState {
    pub fn from_config(config: &SeedConfig, routes: RouteOptions) -> Self {
        Self {
            prefix: config.prefix.clone(),
            workspaces: naming::name_gen(&config.prefix, "workspace", config.workspaces),
            services_per_workspace: config.services_per_workspace,
            routes_per_service: config.routes_per_service,
            consumers_per_workspace: config.consumers_per_workspace,
            plugins: config
                .enabled_plugins()
                .map(|(name, payload)| (name.to_string(), payload.clone()))
                .collect(),
            rbac: config.rbac,
            service: config.service_defaults(),
            routes,
        }
    }

    pub fn workspace_names(&self) -> impl Iterator<Item = &str> {
        self.workspaces.iter().map(|w| w.name.as_str())
    }

    /// Identifier pre-generated for the workspace called `name`.
    pub fn workspace_id(&self, name: &str) -> Option<uuid::Uuid> {
        self.workspaces.iter().find(|w| w.name == name).map(|w| w.id)
    }

    pub fn plugin_config(&self, name: &str) -> Option<&Value> {
        self.plugins.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Route path stored for the route called `route`.
    pub fn route_path(&self, route: &str) -> String {
        self.routes.stored_path(&self.prefix, route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginSpec;
    use serde_json::json;

    #[test]
    fn test_route_paths() {
        let plain = RouteOptions::default();
        assert_eq!(plain.stored_path("perf", "r"), "/r");
        assert_eq!(plain.dump_path("perf", "r"), "r");

        let prefixed = RouteOptions {
            prefix_paths: true,
            trailing_segment: false,
        };
        assert_eq!(prefixed.stored_path("perf", "r"), "/perf/r");
        assert_eq!(prefixed.dump_path("perf", "r"), "perf/r");

        let both = RouteOptions {
            prefix_paths: true,
            trailing_segment: true,
        };
        assert_eq!(both.stored_path("perf", "r"), "/perf/r/");
        assert_eq!(both.dump_path("perf", "r"), "perf/r/?query=true");
    }

    #[test]
    fn test_from_config_gates_plugins() {
        let mut config = SeedConfig::new("perf", 2);
        config
            .plugins
            .insert("rate-limiting".into(), PluginSpec::new(json!({"minute": 5})));
        config.plugins.insert("key-auth".into(), PluginSpec::default());

        let desired = DesiredState::from_config(&config, RouteOptions::default());
        assert_eq!(desired.workspace_names().collect::<Vec<_>>(), ["perf-workspace-0", "perf-workspace-1"]);
        assert_eq!(desired.plugins.len(), 1);
        assert_eq!(desired.plugin_config("rate-limiting"), Some(&json!({"minute": 5})));
        assert_eq!(desired.plugin_config("key-auth"), None);
        assert!(desired.workspace_id("perf-workspace-1").is_some());
        assert!(desired.workspace_id("perf-workspace-2").is_none());
    }
}
