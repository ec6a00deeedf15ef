//! Error types for the PostgreSQL store backend.

use kongseed_storage::{StorageError, Table};
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for unique violation (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL error code for foreign key violation (23503).
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL error code for undefined table (42P01).
pub const PG_UNDEFINED_TABLE: &str = "42P01";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Errors specific to the PostgreSQL store backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Error reported by the driver or the server.
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// The server did not accept the connection in time.
    #[error("Connection timed out after {timeout_ms} ms")]
    ConnectTimeout { timeout_ms: u64 },

    /// A row handed to a bulk append does not fit the column layout.
    #[error("Row shape error: {message}")]
    RowShape { message: String },
}

impl PostgresError {
    /// Creates a new row shape error.
    #[must_use]
    pub fn row_shape(message: impl Into<String>) -> Self {
        Self::RowShape {
            message: message.into(),
        }
    }

    /// Converts into a [`StorageError`] attributed to `table`.
    ///
    /// Constraint violations keep their meaning; anything that happened before a
    /// statement could run is reported as a connection error.
    pub fn into_storage(self, table: Table) -> StorageError {
        match self {
            PostgresError::RowShape { message } => StorageError::query(table, message),
            timeout @ PostgresError::ConnectTimeout { .. } => {
                StorageError::connection(timeout.to_string())
            }
            PostgresError::Database(err) => {
                if has_pg_error_code(&err, PG_UNIQUE_VIOLATION) {
                    StorageError::duplicate_key(table, err.to_string())
                } else if has_pg_error_code(&err, PG_FOREIGN_KEY_VIOLATION) {
                    StorageError::foreign_key(table, err.to_string())
                } else if has_pg_error_code(&err, PG_UNDEFINED_TABLE) {
                    StorageError::query(table, format!("table does not exist: {err}"))
                } else if matches!(err, SqlxError::ColumnDecode { .. } | SqlxError::Decode(_)) {
                    StorageError::malformed_row(table, err.to_string())
                } else if matches!(err, SqlxError::Database(_)) {
                    StorageError::query(table, err.to_string())
                } else {
                    StorageError::connection(err.to_string())
                }
            }
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Database(e) => StorageError::connection(e.to_string()),
            timeout @ PostgresError::ConnectTimeout { .. } => {
                StorageError::connection(timeout.to_string())
            }
            PostgresError::RowShape { message } => StorageError::internal(message),
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
