use std::path::PathBuf;

use clap::Parser;
use kongseed_core::{RouteOptions, RunMode};
use kongseed_db_postgres::PostgresConfig;

#[derive(Parser, Debug)]
#[command(name = "kongseed")]
#[command(about = "Create or delete a Kong gateway's workspaces, services, routes, consumers and plugins")]
#[command(version)]
pub struct Cli {
    /// Desired-state file (YAML, TOML or JSON)
    #[arg(short, long, env = "KONGSEED_CONFIG", default_value = "kongseed.yaml")]
    pub config_file: PathBuf,

    /// Database host
    #[arg(long, env = "KONGSEED_HOSTNAME", default_value = "127.0.0.1")]
    pub hostname: String,

    /// Database port
    #[arg(long, env = "KONGSEED_PORT", default_value_t = 5432)]
    pub port: u16,

    /// Database name
    #[arg(long, env = "KONGSEED_DATABASE", default_value = "kong")]
    pub database: String,

    /// Database user
    #[arg(long, env = "KONGSEED_USERNAME", default_value = "kong")]
    pub username: String,

    /// Database password
    #[arg(long, env = "KONGSEED_PASSWORD", default_value = "kong", hide_env_values = true)]
    pub password: String,

    /// Connection timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    /// Delete every entity in the configured workspaces instead of creating
    #[arg(short, long)]
    pub delete: bool,

    /// Write the expected route paths to this file as a JSON array
    #[arg(long, value_name = "PATH")]
    pub dump_routes: Option<PathBuf>,

    /// Only write the route dump, never touch the database
    #[arg(long, requires = "dump_routes")]
    pub dump_only: bool,

    /// Prefix route paths with the configured prefix
    #[arg(long)]
    pub route_prefix: bool,

    /// Append a trailing segment to route paths
    #[arg(long)]
    pub route_trailing_slash: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        if self.delete {
            RunMode::Delete
        } else {
            RunMode::Create
        }
    }

    pub fn route_options(&self) -> RouteOptions {
        RouteOptions {
            prefix_paths: self.route_prefix,
            trailing_segment: self.route_trailing_slash,
        }
    }

    pub fn postgres_config(&self) -> PostgresConfig {
        PostgresConfig::new(&self.hostname)
            .with_port(self.port)
            .with_database(&self.database)
            .with_username(&self.username)
            .with_password(&self.password)
            .with_connect_timeout_ms(self.connect_timeout_ms)
    }
}
