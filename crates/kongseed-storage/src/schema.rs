//! Column catalogue for the gateway tables.
//!
//! The layout is owned by the gateway, not by kongseed. Bulk appends are
//! positional, so [`Table::insert_columns`] must match the order in which
//! hydrated rows are built.

use crate::types::Table;

/// A foreign-key edge from one table's column to another table's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referencing column in the owning table.
    pub column: &'static str,
    /// Referenced table; the referenced column is its `id`.
    pub references: Table,
}

const fn fk(column: &'static str, references: Table) -> ForeignKey {
    ForeignKey { column, references }
}

impl Table {
    /// Columns written by a bulk append, in positional order.
    #[must_use]
    pub fn insert_columns(self) -> &'static [&'static str] {
        match self {
            Table::Workspaces => &["id", "name", "meta"],
            Table::RbacRoles => &["id", "name", "comment", "is_default", "ws_id"],
            Table::RbacRoleEndpoints => &["role_id", "workspace", "endpoint", "actions", "negative"],
            Table::Services => &[
                "id",
                "name",
                "retries",
                "protocol",
                "host",
                "port",
                "path",
                "connect_timeout",
                "write_timeout",
                "read_timeout",
                "ws_id",
                "enabled",
                "created_at",
                "updated_at",
            ],
            Table::Routes => &[
                "id",
                "name",
                "service_id",
                "protocols",
                "paths",
                "regex_priority",
                "strip_path",
                "preserve_host",
                "https_redirect_status_code",
                "path_handling",
                "ws_id",
                "request_buffering",
                "response_buffering",
                "created_at",
                "updated_at",
            ],
            Table::Consumers => &["id", "username", "ws_id", "username_lower", "type"],
            Table::Plugins => &[
                "id",
                "name",
                "service_id",
                "config",
                "enabled",
                "cache_key",
                "protocols",
                "ws_id",
            ],
        }
    }

    /// Column matched against the staged identifier list on bulk delete.
    #[must_use]
    pub fn delete_key(self) -> &'static str {
        match self {
            Table::RbacRoleEndpoints => "role_id",
            _ => "id",
        }
    }

    /// Unique constraints, each a set of columns.
    #[must_use]
    pub fn unique_constraints(self) -> &'static [&'static [&'static str]] {
        match self {
            Table::Workspaces => &[&["id"], &["name"]],
            Table::RbacRoles => &[&["id"], &["ws_id", "name"]],
            Table::RbacRoleEndpoints => &[&["role_id", "workspace", "endpoint"]],
            Table::Services => &[&["id"], &["ws_id", "name"]],
            Table::Routes => &[&["id"], &["ws_id", "name"]],
            Table::Consumers => &[&["id"], &["ws_id", "username"]],
            Table::Plugins => &[&["id"], &["cache_key"]],
        }
    }

    /// Outgoing foreign keys.
    #[must_use]
    pub fn foreign_keys(self) -> &'static [ForeignKey] {
        const SERVICES: &[ForeignKey] = &[fk("ws_id", Table::Workspaces)];
        const ROUTES: &[ForeignKey] = &[
            fk("service_id", Table::Services),
            fk("ws_id", Table::Workspaces),
        ];
        const CONSUMERS: &[ForeignKey] = &[fk("ws_id", Table::Workspaces)];
        const PLUGINS: &[ForeignKey] = &[
            fk("service_id", Table::Services),
            fk("ws_id", Table::Workspaces),
        ];
        const ROLES: &[ForeignKey] = &[fk("ws_id", Table::Workspaces)];
        const ENDPOINTS: &[ForeignKey] = &[fk("role_id", Table::RbacRoles)];

        match self {
            Table::Workspaces => &[],
            Table::RbacRoles => ROLES,
            Table::RbacRoleEndpoints => ENDPOINTS,
            Table::Services => SERVICES,
            Table::Routes => ROUTES,
            Table::Consumers => CONSUMERS,
            Table::Plugins => PLUGINS,
        }
    }
}
