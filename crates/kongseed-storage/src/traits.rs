//! Store trait for the kongseed store abstraction layer.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::{Record, Row, Table};

/// The external relational store holding the gateway entities.
///
/// Every operation is its own unit of work: there is no atomicity across
/// calls. Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use kongseed_storage::{EntityStore, StorageError, Table};
///
/// async fn workspace_names(store: &dyn EntityStore) -> Result<Vec<String>, StorageError> {
///     let records = store.fetch(Table::Workspaces, &["id", "name"]).await?;
///     Ok(records
///         .iter()
///         .filter_map(|r| r.get(1).map(str::to_string))
///         .collect())
/// }
/// ```
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Runs a projection query over `table` and returns every row.
    ///
    /// Each [`Record`] holds the requested `columns` positionally, rendered as text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` or `StorageError::Query` when the
    /// store cannot be reached or the projection fails.
    async fn fetch(&self, table: Table, columns: &[&str]) -> Result<Vec<Record>, StorageError>;

    /// Appends all `rows` to `table` in one bulk operation.
    ///
    /// `columns` names the positional layout of every row. Returns the number
    /// of rows written.
    ///
    /// # Errors
    ///
    /// Any row or constraint error aborts the whole append; nothing is written.
    async fn bulk_insert(
        &self,
        table: Table,
        columns: &[&str],
        rows: &[Row],
    ) -> Result<u64, StorageError>;

    /// Removes every row of `table` whose `key_column` is in `ids`.
    ///
    /// The identifier list is staged rather than inlined into the statement.
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ForeignKeyViolation` when removed rows are still
    /// referenced; nothing is removed in that case.
    async fn bulk_delete(
        &self,
        table: Table,
        key_column: &str,
        ids: &[Uuid],
    ) -> Result<u64, StorageError>;

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}
