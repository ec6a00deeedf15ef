//! PostgreSQL store backend for kongseed.
//!
//! This crate provides a PostgreSQL implementation of the `EntityStore` trait
//! from `kongseed-storage`, talking to the gateway database through sqlx.
//!
//! # Example
//!
//! ```ignore
//! use kongseed_db_postgres::{PostgresConfig, PostgresStore};
//! use kongseed_storage::{EntityStore, Table};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PostgresConfig::new("127.0.0.1")
//!     .with_database("kong")
//!     .with_username("kong")
//!     .with_password("kong");
//!
//! let store = PostgresStore::new(config);
//! let workspaces = store.fetch(Table::Workspaces, &["name", "id"]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`config`]: connection parameters
//! - [`error`]: driver error mapping
//! - `connection`: one connection per operation
//! - [`copy`]: `COPY` text encoding and statement builders
//! - `storage`: the `EntityStore` implementation

pub mod config;
mod connection;
pub mod copy;
pub mod error;
mod storage;

pub use config::PostgresConfig;
pub use connection::test_connection;
pub use error::{PostgresError, Result};
pub use storage::PostgresStore;

pub use kongseed_storage::{EntityStore, StorageError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::PostgresConfig;
    pub use crate::error::PostgresError;
    pub use crate::storage::PostgresStore;
    pub use kongseed_storage::{EntityStore, StorageError};
}
