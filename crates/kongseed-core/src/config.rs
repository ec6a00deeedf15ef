//! Desired-state configuration.
//!
//! Loaded from a YAML, TOML or JSON file and validated before any store
//! interaction. Environment variables of the form `KONGSEED__<KEY>` override
//! file values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SeedError, SeedResult};

/// Service protocols accepted by the gateway.
pub const SERVICE_PROTOCOLS: &[&str] = &["http", "https", "grpc", "grpcs", "tcp", "tls", "udp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Namespace for every derived entity name.
    pub prefix: String,
    /// Number of workspaces.
    pub workspaces: u32,
    #[serde(default)]
    pub services_per_workspace: u32,
    #[serde(default)]
    pub routes_per_service: u32,
    #[serde(default)]
    pub consumers_per_workspace: u32,
    /// Plugin kind to plugin attachment, applied to every service.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginSpec>,
    /// Create a super-admin RBAC role and endpoint per workspace.
    #[serde(default = "default_true")]
    pub rbac: bool,

    #[serde(default = "default_service_protocol")]
    pub service_protocol: String,
    #[serde(default = "default_service_host")]
    pub service_host: String,
    #[serde(default = "default_service_port")]
    pub service_port: u16,
    #[serde(default = "default_service_path")]
    pub service_path: String,
    #[serde(default = "default_service_retries")]
    pub service_retries: u32,
    #[serde(default = "default_timeout_ms")]
    pub service_connect_timeout: u32,
    #[serde(default = "default_timeout_ms")]
    pub service_write_timeout: u32,
    #[serde(default = "default_timeout_ms")]
    pub service_read_timeout: u32,
}

/// A plugin attachment. Without a non-empty `config` object the plugin is not
/// instantiated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl PluginSpec {
    pub fn new(config: Value) -> Self {
        Self {
            config: Some(config),
        }
    }

    /// The configuration payload, when this plugin should be created.
    pub fn enabled_config(&self) -> Option<&Value> {
        self.config
            .as_ref()
            .filter(|v| v.as_object().is_some_and(|m| !m.is_empty()))
    }
}

/// Column defaults written for every created service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefaults {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub retries: u32,
    pub connect_timeout: u32,
    pub write_timeout: u32,
    pub read_timeout: u32,
}

fn default_true() -> bool {
    true
}

fn default_service_protocol() -> String {
    "http".into()
}

fn default_service_host() -> String {
    "httpbin.org".into()
}

fn default_service_port() -> u16 {
    80
}

fn default_service_path() -> String {
    "/".into()
}

fn default_service_retries() -> u32 {
    5
}

fn default_timeout_ms() -> u32 {
    60_000
}

impl SeedConfig {
    /// A configuration with `workspaces` workspaces and every other key at its default.
    pub fn new(prefix: impl Into<String>, workspaces: u32) -> Self {
        Self {
            prefix: prefix.into(),
            workspaces,
            services_per_workspace: 0,
            routes_per_service: 0,
            consumers_per_workspace: 0,
            plugins: BTreeMap::new(),
            rbac: true,
            service_protocol: default_service_protocol(),
            service_host: default_service_host(),
            service_port: default_service_port(),
            service_path: default_service_path(),
            service_retries: default_service_retries(),
            service_connect_timeout: default_timeout_ms(),
            service_write_timeout: default_timeout_ms(),
            service_read_timeout: default_timeout_ms(),
        }
    }

    pub fn service_defaults(&self) -> ServiceDefaults {
        ServiceDefaults {
            protocol: self.service_protocol.clone(),
            host: self.service_host.clone(),
            port: self.service_port,
            path: self.service_path.clone(),
            retries: self.service_retries,
            connect_timeout: self.service_connect_timeout,
            write_timeout: self.service_write_timeout,
            read_timeout: self.service_read_timeout,
        }
    }

    /// Plugins that will be instantiated, with their payloads.
    pub fn enabled_plugins(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.plugins
            .iter()
            .filter_map(|(name, spec)| spec.enabled_config().map(|c| (name.as_str(), c)))
    }

    pub fn validate(&self) -> SeedResult<()> {
        if self.prefix.is_empty() {
            return Err(SeedError::config("prefix must not be empty"));
        }
        if self.prefix.chars().any(char::is_whitespace) {
            return Err(SeedError::config(format!(
                "prefix must not contain whitespace: {:?}",
                self.prefix
            )));
        }
        if !SERVICE_PROTOCOLS.contains(&self.service_protocol.as_str()) {
            return Err(SeedError::config(format!(
                "service_protocol must be one of {SERVICE_PROTOCOLS:?}, got {:?}",
                self.service_protocol
            )));
        }
        if self.service_port == 0 {
            return Err(SeedError::config("service_port must be > 0"));
        }
        if self.service_connect_timeout == 0
            || self.service_write_timeout == 0
            || self.service_read_timeout == 0
        {
            return Err(SeedError::config("service timeouts must be > 0"));
        }
        if !self.service_path.starts_with('/') {
            return Err(SeedError::config(format!(
                "service_path must start with '/', got {:?}",
                self.service_path
            )));
        }
        for (name, spec) in &self.plugins {
            if name.trim().is_empty() {
                return Err(SeedError::config("plugin names must not be empty"));
            }
            if let Some(config) = &spec.config
                && !config.is_null()
                && !config.is_object()
            {
                return Err(SeedError::config(format!(
                    "plugins.{name}.config must be a mapping"
                )));
            }
        }
        Ok(())
    }
}

pub mod loader {
    use std::path::Path;

    use ::config::{Config, Environment, File};

    use super::SeedConfig;
    use crate::error::{SeedError, SeedResult};

    /// Loads and validates the desired-state file at `path`.
    ///
    /// The format follows the file extension. `KONGSEED__<KEY>` environment
    /// variables override file values, e.g. `KONGSEED__WORKSPACES=10`.
    pub fn load_config(path: &Path) -> SeedResult<SeedConfig> {
        if !path.is_file() {
            return Err(SeedError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let cfg = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("KONGSEED")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()
            .map_err(|e| SeedError::config(format!("config build error: {e}")))?;
        let parsed: SeedConfig = cfg
            .try_deserialize()
            .map_err(|e| SeedError::config(format!("config deserialize error: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_config(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let file = write_config(
            ".yaml",
            r#"
prefix: perf
workspaces: 2
services_per_workspace: 3
plugins:
  rate-limiting:
    config:
      minute: 5
      policy: local
  key-auth: {}
"#,
        );
        let cfg = loader::load_config(file.path()).unwrap();
        assert_eq!(cfg.prefix, "perf");
        assert_eq!(cfg.workspaces, 2);
        assert_eq!(cfg.services_per_workspace, 3);
        assert_eq!(cfg.routes_per_service, 0);
        assert!(cfg.rbac);
        assert_eq!(cfg.service_defaults().host, "httpbin.org");
        assert_eq!(cfg.service_defaults().read_timeout, 60_000);

        let enabled: Vec<_> = cfg.enabled_plugins().collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].0, "rate-limiting");
        assert_eq!(enabled[0].1["minute"], 5);
    }

    #[test]
    fn test_load_toml() {
        let mut cfg = SeedConfig::new("toml", 1);
        cfg.service_port = 8080;
        cfg.plugins
            .insert("cors".into(), PluginSpec::new(json!({"origins": ["*"]})));
        let file = write_config(".toml", &toml::to_string(&cfg).unwrap());

        let loaded = loader::load_config(file.path()).unwrap();
        assert_eq!(loaded.service_port, 8080);
        assert_eq!(loaded.plugins["cors"].enabled_config(), Some(&json!({"origins": ["*"]})));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = loader::load_config(std::path::Path::new("/nonexistent/kongseed.yaml"))
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_missing_required_key_is_config_error() {
        let file = write_config(".yaml", "workspaces: 1\n");
        let err = loader::load_config(file.path()).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("prefix"));
    }

    #[test]
    fn test_unparsable_file_is_config_error() {
        let file = write_config(".yaml", "prefix: [unclosed\n");
        assert!(loader::load_config(file.path()).unwrap_err().is_config());
    }

    #[test]
    fn test_validation_rules() {
        let ok = SeedConfig::new("perf", 1);
        assert!(ok.validate().is_ok());

        let cases: Vec<(&str, fn(&mut SeedConfig))> = vec![
            ("empty prefix", |c: &mut SeedConfig| c.prefix.clear()),
            ("spaced prefix", |c: &mut SeedConfig| c.prefix = "per f".into()),
            ("protocol", |c: &mut SeedConfig| c.service_protocol = "ftp".into()),
            ("port", |c: &mut SeedConfig| c.service_port = 0),
            ("timeout", |c: &mut SeedConfig| c.service_write_timeout = 0),
            ("path", |c: &mut SeedConfig| c.service_path = "anything".into()),
            (
                "plugin name",
                |c: &mut SeedConfig| {
                    c.plugins.insert(String::new(), PluginSpec::default());
                },
            ),
            (
                "plugin config",
                |c: &mut SeedConfig| {
                    c.plugins.insert("acl".into(), PluginSpec::new(json!("allow")));
                },
            ),
        ];
        for (label, mutate) in cases {
            let mut cfg = ok.clone();
            mutate(&mut cfg);
            assert!(cfg.validate().unwrap_err().is_config(), "{label}");
        }
    }

    #[test]
    fn test_null_plugin_config_is_gated_not_rejected() {
        let mut cfg = SeedConfig::new("perf", 1);
        cfg.plugins.insert("key-auth".into(), PluginSpec { config: Some(Value::Null) });
        cfg.plugins.insert("acl".into(), PluginSpec::default());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.enabled_plugins().count(), 0);
    }

    #[test]
    fn test_empty_plugin_config_is_gated() {
        let mut cfg = SeedConfig::new("perf", 1);
        cfg.plugins.insert("key-auth".into(), PluginSpec::new(json!({})));
        cfg.plugins
            .insert("cors".into(), PluginSpec::new(json!({"origins": ["*"]})));
        assert!(cfg.validate().is_ok());
        let enabled: Vec<&str> = cfg.enabled_plugins().map(|(name, _)| name).collect();
        assert_eq!(enabled, ["cors"]);
    }
}
