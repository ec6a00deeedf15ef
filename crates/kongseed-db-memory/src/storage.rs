use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use kongseed_storage::{Cell, EntityStore, Record, Row, StorageError, Table};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// A stored row, keyed by column name. Columns never written read as `NULL`.
pub type StoredRow = BTreeMap<String, Cell>;

/// In-memory gateway store.
///
/// This store provides:
/// - Projection reads rendered the way `column::text` renders in PostgreSQL
/// - All-or-nothing bulk append with unique-constraint and foreign-key checks
/// - All-or-nothing bulk delete with restrict semantics on referencing rows
/// - Per-table write failure injection for exercising partial runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<Table, Vec<StoredRow>>>,
    failing: RwLock<HashSet<Table>>,
}

fn text_of(row: &StoredRow, column: &str) -> Option<String> {
    row.get(column).and_then(Cell::to_text)
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write to `table` fail with an internal error.
    pub async fn fail_writes_to(&self, table: Table) {
        self.failing.write().await.insert(table);
    }

    /// Lifts every injected write failure.
    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
    }

    /// Number of rows currently in `table`.
    pub async fn count(&self, table: Table) -> usize {
        self.tables.read().await.get(&table).map_or(0, Vec::len)
    }

    /// Text values of `column` across all rows of `table`, in insertion order.
    pub async fn column(&self, table: Table, column: &str) -> Vec<Option<String>> {
        self.tables
            .read()
            .await
            .get(&table)
            .map(|rows| rows.iter().map(|r| text_of(r, column)).collect())
            .unwrap_or_default()
    }

    /// Full copies of the rows of `table`.
    pub async fn rows(&self, table: Table) -> Vec<StoredRow> {
        self.tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    async fn check_failure(&self, table: Table) -> Result<(), StorageError> {
        if self.failing.read().await.contains(&table) {
            return Err(StorageError::internal(format!(
                "injected write failure on {table}"
            )));
        }
        Ok(())
    }
}

fn build_rows(table: Table, columns: &[&str], rows: &[Row]) -> Result<Vec<StoredRow>, StorageError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            if row.len() != columns.len() {
                return Err(StorageError::query(
                    table,
                    format!(
                        "row {index} has {} values, expected {}",
                        row.len(),
                        columns.len()
                    ),
                ));
            }
            Ok(columns
                .iter()
                .zip(row)
                .map(|(c, v)| ((*c).to_string(), v.clone()))
                .collect())
        })
        .collect()
}

fn check_foreign_keys(
    tables: &HashMap<Table, Vec<StoredRow>>,
    table: Table,
    new_rows: &[StoredRow],
) -> Result<(), StorageError> {
    for fk in table.foreign_keys() {
        let referenced: HashSet<String> = tables
            .get(&fk.references)
            .map(|rows| rows.iter().filter_map(|r| text_of(r, "id")).collect())
            .unwrap_or_default();
        for row in new_rows {
            if let Some(value) = text_of(row, fk.column)
                && !referenced.contains(&value)
            {
                return Err(StorageError::foreign_key(
                    table,
                    format!("{}={value} not present in {}", fk.column, fk.references),
                ));
            }
        }
    }
    Ok(())
}

fn check_unique(
    table: Table,
    existing: &[StoredRow],
    new_rows: &[StoredRow],
) -> Result<(), StorageError> {
    for constraint in table.unique_constraints() {
        let mut seen = HashSet::new();
        for row in existing.iter().chain(new_rows) {
            let key: Option<Vec<String>> = constraint.iter().map(|c| text_of(row, c)).collect();
            // NULL never collides
            let Some(key) = key else { continue };
            if !seen.insert(key.clone()) {
                return Err(StorageError::duplicate_key(
                    table,
                    format!("({})=({})", constraint.join(", "), key.join(", ")),
                ));
            }
        }
    }
    Ok(())
}

fn check_no_referrers(
    tables: &HashMap<Table, Vec<StoredRow>>,
    table: Table,
    removed: &[&StoredRow],
) -> Result<(), StorageError> {
    let removed_ids: HashSet<String> = removed.iter().filter_map(|r| text_of(r, "id")).collect();
    if removed_ids.is_empty() {
        return Ok(());
    }
    for other in Table::ALL {
        for fk in other.foreign_keys().iter().filter(|fk| fk.references == table) {
            let Some(rows) = tables.get(&other) else {
                continue;
            };
            if let Some(value) = rows
                .iter()
                .filter_map(|r| text_of(r, fk.column))
                .find(|v| removed_ids.contains(v))
            {
                return Err(StorageError::foreign_key(
                    table,
                    format!("id={value} is still referenced from {other}.{}", fk.column),
                ));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn fetch(&self, table: Table, columns: &[&str]) -> Result<Vec<Record>, StorageError> {
        let tables = self.tables.read().await;
        let records = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .map(|row| Record::new(columns.iter().map(|c| text_of(row, c)).collect()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn bulk_insert(
        &self,
        table: Table,
        columns: &[&str],
        rows: &[Row],
    ) -> Result<u64, StorageError> {
        self.check_failure(table).await?;
        let new_rows = build_rows(table, columns, rows)?;

        let mut tables = self.tables.write().await;
        check_foreign_keys(&tables, table, &new_rows)?;
        let existing = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
        check_unique(table, existing, &new_rows)?;

        let written = new_rows.len() as u64;
        tables.entry(table).or_default().extend(new_rows);
        debug!(table = %table, rows = written, "Appended rows");
        Ok(written)
    }

    async fn bulk_delete(
        &self,
        table: Table,
        key_column: &str,
        ids: &[Uuid],
    ) -> Result<u64, StorageError> {
        self.check_failure(table).await?;
        let staged: HashSet<String> = ids.iter().map(Uuid::to_string).collect();

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get(&table) else {
            return Ok(0);
        };
        let is_staged = |row: &StoredRow| {
            text_of(row, key_column).is_some_and(|v| staged.contains(&v))
        };
        let removed: Vec<&StoredRow> = rows.iter().filter(|r| is_staged(r)).collect();
        check_no_referrers(&tables, table, &removed)?;

        let removed_count = removed.len() as u64;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|r| !is_staged(r));
        }
        debug!(table = %table, rows = removed_count, "Removed rows");
        Ok(removed_count)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(id: Uuid, name: &str) -> Row {
        vec![id.into(), name.into(), serde_json::json!({}).into()]
    }

    fn consumer(id: Uuid, username: &str, ws_id: Uuid) -> Row {
        vec![
            id.into(),
            username.into(),
            ws_id.into(),
            username.to_lowercase().into(),
            0u32.into(),
        ]
    }

    async fn insert(store: &InMemoryStore, table: Table, rows: &[Row]) -> Result<u64, StorageError> {
        store.bulk_insert(table, table.insert_columns(), rows).await
    }

    #[tokio::test]
    async fn test_insert_and_fetch_projection() {
        let store = InMemoryStore::new();
        let ws = Uuid::new_v4();
        let written = insert(&store, Table::Workspaces, &[workspace(ws, "perf-workspace-0")])
            .await
            .unwrap();
        assert_eq!(written, 1);

        let records = store.fetch(Table::Workspaces, &["name", "id"]).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(0), Some("perf-workspace-0"));
        assert_eq!(records[0].get(1), Some(ws.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_fetch_unknown_column_is_null() {
        let store = InMemoryStore::new();
        insert(&store, Table::Workspaces, &[workspace(Uuid::new_v4(), "a")])
            .await
            .unwrap();
        let records = store.fetch(Table::Workspaces, &["comment"]).await.unwrap();
        assert_eq!(records[0].get(0), None);
    }

    #[tokio::test]
    async fn test_insert_rejects_dangling_foreign_key() {
        let store = InMemoryStore::new();
        let err = insert(
            &store,
            Table::Consumers,
            &[consumer(Uuid::new_v4(), "c", Uuid::new_v4())],
        )
        .await
        .unwrap_err();
        assert!(err.is_foreign_key_violation());
        assert_eq!(store.count(Table::Consumers).await, 0);
    }

    #[tokio::test]
    async fn test_insert_is_all_or_nothing_on_duplicates() {
        let store = InMemoryStore::new();
        let err = insert(
            &store,
            Table::Workspaces,
            &[
                workspace(Uuid::new_v4(), "dup"),
                workspace(Uuid::new_v4(), "dup"),
            ],
        )
        .await
        .unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(store.count(Table::Workspaces).await, 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_short_rows() {
        let store = InMemoryStore::new();
        let err = insert(&store, Table::Workspaces, &[vec![Uuid::new_v4().into()]])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Query { .. }));
    }

    #[tokio::test]
    async fn test_delete_restricts_referenced_rows() {
        let store = InMemoryStore::new();
        let ws = Uuid::new_v4();
        insert(&store, Table::Workspaces, &[workspace(ws, "w")]).await.unwrap();
        insert(&store, Table::Consumers, &[consumer(Uuid::new_v4(), "c", ws)])
            .await
            .unwrap();

        let err = store
            .bulk_delete(Table::Workspaces, "id", &[ws])
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation());
        assert_eq!(store.count(Table::Workspaces).await, 1);
    }

    #[tokio::test]
    async fn test_delete_counts_matching_rows_only() {
        let store = InMemoryStore::new();
        let keep = Uuid::new_v4();
        let gone = Uuid::new_v4();
        insert(&store, Table::Workspaces, &[workspace(keep, "keep"), workspace(gone, "gone")])
            .await
            .unwrap();

        let removed = store
            .bulk_delete(Table::Workspaces, "id", &[gone, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            store.column(Table::Workspaces, "name").await,
            vec![Some("keep".to_string())]
        );
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryStore::new();
        store.fail_writes_to(Table::Workspaces).await;
        let err = insert(&store, Table::Workspaces, &[workspace(Uuid::new_v4(), "w")])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Internal { .. }));
        assert_eq!(store.backend_name(), "memory");

        store.clear_failures().await;
        insert(&store, Table::Workspaces, &[workspace(Uuid::new_v4(), "w")])
            .await
            .unwrap();
    }
}
