//! In-memory store backend for kongseed.
//!
//! This crate provides an in-memory implementation of the `EntityStore` trait
//! from `kongseed-storage`. It enforces the unique constraints and foreign
//! keys catalogued on [`Table`](kongseed_storage::Table), so dependency-order
//! mistakes surface the same way they would against the gateway database.
//!
//! # Example
//!
//! ```ignore
//! use kongseed_db_memory::InMemoryStore;
//! use kongseed_storage::{EntityStore, Table};
//!
//! let store = InMemoryStore::new();
//! let rows = vec![vec![id.into(), "perf-workspace-0".into(), meta.into()]];
//! store.bulk_insert(Table::Workspaces, Table::Workspaces.insert_columns(), &rows).await?;
//! assert_eq!(store.count(Table::Workspaces).await, 1);
//! ```

mod storage;

// Re-export the store trait for convenience
pub use kongseed_storage::{EntityStore, StorageError};

pub use storage::{InMemoryStore, StoredRow};
