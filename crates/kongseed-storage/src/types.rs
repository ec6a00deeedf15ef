//! Value types exchanged between the reconciler and the store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A gateway table managed by kongseed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Workspaces,
    RbacRoles,
    RbacRoleEndpoints,
    Services,
    Routes,
    Consumers,
    Plugins,
}

impl Table {
    /// Every managed table, in foreign-key dependency order.
    pub const ALL: [Table; 7] = [
        Table::Workspaces,
        Table::RbacRoles,
        Table::RbacRoleEndpoints,
        Table::Services,
        Table::Routes,
        Table::Consumers,
        Table::Plugins,
    ];

    /// Returns the SQL table name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Table::Workspaces => "workspaces",
            Table::RbacRoles => "rbac_roles",
            Table::RbacRoleEndpoints => "rbac_role_endpoints",
            Table::Services => "services",
            Table::Routes => "routes",
            Table::Consumers => "consumers",
            Table::Plugins => "plugins",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed column value written by a bulk append.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    /// A `text[]` column such as `routes.protocols`.
    TextArray(Vec<String>),
    Json(Value),
}

impl Cell {
    /// Renders the value the way `column::text` would in PostgreSQL.
    ///
    /// Returns `None` for SQL `NULL`.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Boolean(b) => Some(b.to_string()),
            Cell::TextArray(items) => Some(format!("{{{}}}", items.join(","))),
            Cell::Json(v) => Some(v.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<Uuid> for Cell {
    fn from(value: Uuid) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Integer(i64::from(value))
    }
}

impl From<u16> for Cell {
    fn from(value: u16) -> Self {
        Cell::Integer(i64::from(value))
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Boolean(value)
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Json(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// A full row ready for positional bulk append.
pub type Row = Vec<Cell>;

/// A projected row returned by [`EntityStore::fetch`](crate::EntityStore::fetch).
///
/// Values are positional, in the order the projection columns were requested,
/// and rendered as text. `None` stands for SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    values: Vec<Option<String>>,
}

impl Record {
    /// Creates a record from positional text values.
    #[must_use]
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Returns the value at `index`, or `None` when it is `NULL` or out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Number of projected columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Option<String>>> for Record {
    fn from(values: Vec<Option<String>>) -> Self {
        Self::new(values)
    }
}
