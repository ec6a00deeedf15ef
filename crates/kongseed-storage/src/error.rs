//! Storage error types for the kongseed store abstraction layer.
//!
//! This module defines all error types that can occur while reading from or
//! bulk-loading into the gateway database.

use std::fmt;

use crate::types::Table;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to connect to the storage backend.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// A projection query, bulk append or bulk delete failed.
    #[error("Query error on {table}: {message}")]
    Query {
        /// The table the statement targeted.
        table: Table,
        /// Description of the failure.
        message: String,
    },

    /// A fetched row could not be parsed into its typed record.
    #[error("Malformed row in {table}: {message}")]
    MalformedRow {
        /// The table the row was read from.
        table: Table,
        /// Why the row was rejected.
        message: String,
    },

    /// A bulk append would violate a primary or unique key.
    #[error("Duplicate key in {table}: {key}")]
    DuplicateKey {
        /// The table being appended to.
        table: Table,
        /// Rendered value of the conflicting key.
        key: String,
    },

    /// A bulk append or delete would violate a foreign key.
    #[error("Foreign key violation on {table}: {message}")]
    ForeignKeyViolation {
        /// The table being modified.
        table: Table,
        /// Description of the dangling or still-referenced key.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Query` error.
    #[must_use]
    pub fn query(table: Table, message: impl Into<String>) -> Self {
        Self::Query {
            table,
            message: message.into(),
        }
    }

    /// Creates a new `MalformedRow` error.
    #[must_use]
    pub fn malformed_row(table: Table, message: impl Into<String>) -> Self {
        Self::MalformedRow {
            table,
            message: message.into(),
        }
    }

    /// Creates a new `DuplicateKey` error.
    #[must_use]
    pub fn duplicate_key(table: Table, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            table,
            key: key.into(),
        }
    }

    /// Creates a new `ForeignKeyViolation` error.
    #[must_use]
    pub fn foreign_key(table: Table, message: impl Into<String>) -> Self {
        Self::ForeignKeyViolation {
            table,
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a duplicate key error.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Returns `true` if this is a foreign key error.
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }

    /// Returns `true` if this is a malformed row error.
    #[must_use]
    pub fn is_malformed_row(&self) -> bool {
        matches!(self, Self::MalformedRow { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } | Self::Query { .. } => ErrorCategory::Infrastructure,
            Self::MalformedRow { .. }
            | Self::DuplicateKey { .. }
            | Self::ForeignKeyViolation { .. } => ErrorCategory::Data,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connectivity or statement failure.
    Infrastructure,
    /// Row format or constraint violation.
    Data,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Data => write!(f, "data"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
