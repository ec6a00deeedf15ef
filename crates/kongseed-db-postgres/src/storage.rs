//! PostgreSQL implementation of the EntityStore trait.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx_core::connection::Connection;
use sqlx_core::row::Row as _;
use sqlx_postgres::PgConnection;
use tracing::{debug, instrument};
use uuid::Uuid;

use kongseed_storage::{EntityStore, Record, Row, StorageError, Table};

use crate::config::PostgresConfig;
use crate::connection;
use crate::copy;
use crate::error::{PostgresError, Result};

/// Bytes buffered before a `COPY` chunk is sent to the server.
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// PostgreSQL store backend for gateway entities.
///
/// Each operation opens a fresh connection, runs in its own unit of work and
/// closes the connection before returning.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    config: PostgresConfig,
}

impl PostgresStore {
    /// Creates a new store for the given connection parameters.
    ///
    /// No connection is opened until the first operation.
    #[must_use]
    pub fn new(config: PostgresConfig) -> Self {
        Self { config }
    }

    /// Returns the connection parameters.
    #[must_use]
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    /// Checks that the database accepts connections.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` when the server cannot be reached.
    pub async fn ping(&self) -> std::result::Result<(), StorageError> {
        connection::test_connection(&self.config)
            .await
            .map_err(StorageError::from)
    }

    async fn open(&self) -> std::result::Result<PgConnection, StorageError> {
        connection::connect(&self.config)
            .await
            .map_err(StorageError::from)
    }
}

async fn fetch_records(conn: &mut PgConnection, table: Table, columns: &[&str]) -> Result<Vec<Record>> {
    let statement = copy::projection_statement(table, columns);
    let mut rows = sqlx_core::query::query(&statement).fetch(conn);
    let mut records = Vec::new();

    while let Some(row) = rows.try_next().await? {
        let values = (0..columns.len())
            .map(|index| row.try_get::<Option<String>, _>(index))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        records.push(Record::new(values));
    }

    Ok(records)
}

fn check_row_shapes(columns: &[&str], rows: &[Row]) -> Result<()> {
    for (index, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(PostgresError::row_shape(format!(
                "row {index} has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }
    }
    Ok(())
}

async fn copy_rows(conn: &mut PgConnection, table: Table, columns: &[&str], rows: &[Row]) -> Result<u64> {
    let statement = copy::copy_in_statement(table, columns);
    let mut copy_in = conn.copy_in_raw(&statement).await?;
    let mut buffer = String::with_capacity(COPY_CHUNK_SIZE);

    for row in rows {
        copy::encode_row(row, &mut buffer);
        if buffer.len() >= COPY_CHUNK_SIZE {
            copy_in.send(std::mem::take(&mut buffer).into_bytes()).await?;
        }
    }
    if !buffer.is_empty() {
        copy_in.send(buffer.into_bytes()).await?;
    }

    Ok(copy_in.finish().await?)
}

async fn delete_staged(conn: &mut PgConnection, table: Table, key_column: &str, ids: &[Uuid]) -> Result<u64> {
    let mut tx = conn.begin().await?;

    sqlx_core::query::query(&copy::create_staging_statement())
        .execute(&mut *tx)
        .await?;

    let mut staged = String::with_capacity(ids.len() * 37);
    for id in ids {
        staged.push_str(&id.to_string());
        staged.push('\n');
    }
    let mut copy_in = tx.copy_in_raw(&copy::copy_staging_statement()).await?;
    copy_in.send(staged.into_bytes()).await?;
    copy_in.finish().await?;

    let removed = sqlx_core::query::query(&copy::delete_staged_statement(table, key_column))
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(removed)
}

#[async_trait]
impl EntityStore for PostgresStore {
    #[instrument(skip(self, columns), fields(table = %table))]
    async fn fetch(&self, table: Table, columns: &[&str]) -> std::result::Result<Vec<Record>, StorageError> {
        let mut conn = self.open().await?;
        let result = fetch_records(&mut conn, table, columns).await;
        connection::close(conn).await;

        let records = result.map_err(|e| e.into_storage(table))?;
        debug!(rows = records.len(), "Fetched projection");
        Ok(records)
    }

    #[instrument(skip(self, columns, rows), fields(table = %table, rows = rows.len()))]
    async fn bulk_insert(
        &self,
        table: Table,
        columns: &[&str],
        rows: &[Row],
    ) -> std::result::Result<u64, StorageError> {
        check_row_shapes(columns, rows).map_err(|e| e.into_storage(table))?;
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.open().await?;
        let result = copy_rows(&mut conn, table, columns, rows).await;
        connection::close(conn).await;

        let written = result.map_err(|e| e.into_storage(table))?;
        debug!(written, "Copied rows");
        Ok(written)
    }

    #[instrument(skip(self, ids), fields(table = %table, ids = ids.len()))]
    async fn bulk_delete(
        &self,
        table: Table,
        key_column: &str,
        ids: &[Uuid],
    ) -> std::result::Result<u64, StorageError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.open().await?;
        let result = delete_staged(&mut conn, table, key_column, ids).await;
        connection::close(conn).await;

        let removed = result.map_err(|e| e.into_storage(table))?;
        debug!(removed, "Deleted staged rows");
        Ok(removed)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
