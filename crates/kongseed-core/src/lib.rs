//! # kongseed-core
//!
//! Reconciles a Kong gateway database against a declarative desired state.
//!
//! A run is either a create pass or a delete pass:
//!
//! - the Identity Namer ([`naming`]) derives the name of every desired entity
//! - the Entity Readers ([`readers`]) parse the current rows of each table
//! - the [`reconcile`] step diffs composite keys within the active workspaces
//! - the Hydrators ([`hydrate`]) expand keys into full rows
//! - the [`loader::BulkLoader`] appends or deletes them, one kind at a time
//!
//! ```ignore
//! use std::sync::Arc;
//! use kongseed_core::{RouteOptions, RunMode, Seeder, config::loader::load_config};
//!
//! let config = load_config("perf.yaml".as_ref())?;
//! let seeder = Seeder::new(Arc::new(store), &config, RouteOptions::default());
//! let report = seeder.run(RunMode::Create).await?;
//! ```

pub mod config;
pub mod context;
pub mod desired;
pub mod error;
pub mod hydrate;
pub mod kinds;
pub mod loader;
pub mod model;
pub mod naming;
pub mod readers;
pub mod reconcile;
pub mod routes_dump;
pub mod runner;
pub mod scope;
pub mod time;

pub use config::{PluginSpec, SeedConfig, ServiceDefaults};
pub use desired::{DesiredState, RouteOptions};
pub use error::{SeedError, SeedResult};
pub use routes_dump::{expected_route_paths, write_route_paths};
pub use runner::{KindReport, RunMode, RunReport, Seeder};
pub use scope::Scope;
