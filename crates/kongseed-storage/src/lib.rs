//! # kongseed-storage
//!
//! Store abstraction layer for kongseed.
//!
//! This crate defines the trait and value types every gateway-database
//! backend implements. It does not contain any implementations - those are
//! provided by `kongseed-db-postgres` and `kongseed-db-memory`.
//!
//! ## Overview
//!
//! The main trait is [`EntityStore`], which defines the contract for:
//! - projection reads of a table
//! - positional bulk append
//! - staged bulk delete by identifier
//!
//! [`Table`] carries the fixed column catalogue of the gateway schema.

mod error;
mod schema;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use schema::ForeignKey;
pub use traits::EntityStore;
pub use types::{Cell, Record, Row, Table};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared store trait object.
pub type DynStore = std::sync::Arc<dyn EntityStore>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use kongseed_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::schema::ForeignKey;
    pub use crate::traits::EntityStore;
    pub use crate::types::{Cell, Record, Row, Table};
    pub use crate::{DynStore, StorageResult};
}
