//! Bulk loader: one bulk append or staged bulk delete per entity kind.

use kongseed_storage::{EntityStore, Row, Table};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SeedResult;

/// Thin wrapper over the store that reports what each bulk operation did.
///
/// Each call is its own unit of work. A failure leaves earlier calls committed.
#[derive(Clone, Copy)]
pub struct BulkLoader<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> BulkLoader<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Appends `rows` to `table` using its insert column layout.
    pub async fn create(&self, table: Table, rows: &[Row]) -> SeedResult<u64> {
        info!(table = %table, count = rows.len(), "{table} to create: {}", rows.len());
        if rows.is_empty() {
            return Ok(0);
        }
        let written = self
            .store
            .bulk_insert(table, table.insert_columns(), rows)
            .await?;
        debug!(table = %table, written, backend = self.store.backend_name(), "Bulk append done");
        Ok(written)
    }

    /// Removes the rows of `table` whose delete key is in `ids`.
    pub async fn delete(&self, table: Table, ids: &[Uuid]) -> SeedResult<u64> {
        info!(table = %table, count = ids.len(), "{table} to delete: {}", ids.len());
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self
            .store
            .bulk_delete(table, table.delete_key(), ids)
            .await?;
        debug!(table = %table, removed, backend = self.store.backend_name(), "Bulk delete done");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kongseed_db_memory::InMemoryStore;

    #[tokio::test]
    async fn test_empty_operations_do_not_touch_the_store() {
        let store = InMemoryStore::new();
        store.fail_writes_to(Table::Routes).await;
        let loader = BulkLoader::new(&store);
        assert_eq!(loader.create(Table::Routes, &[]).await.unwrap(), 0);
        assert_eq!(loader.delete(Table::Routes, &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_then_delete_by_key() {
        let store = InMemoryStore::new();
        let loader = BulkLoader::new(&store);
        let id = Uuid::new_v4();
        let row: Row = vec![id.into(), "w".into(), serde_json::json!({}).into()];

        assert_eq!(loader.create(Table::Workspaces, &[row]).await.unwrap(), 1);
        assert_eq!(loader.delete(Table::Workspaces, &[id]).await.unwrap(), 1);
        assert_eq!(store.count(Table::Workspaces).await, 0);
    }

    #[tokio::test]
    async fn test_store_errors_surface() {
        let store = InMemoryStore::new();
        store.fail_writes_to(Table::Workspaces).await;
        let loader = BulkLoader::new(&store);
        let row: Row = vec![Uuid::new_v4().into(), "w".into(), serde_json::json!({}).into()];
        let err = loader.create(Table::Workspaces, &[row]).await.unwrap_err();
        assert!(matches!(err, crate::error::SeedError::Storage(_)));
    }
}
