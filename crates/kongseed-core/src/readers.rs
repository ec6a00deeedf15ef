//! Entity readers: strict parsing of projected rows into typed records.

use kongseed_storage::{EntityStore, Record, StorageError, StorageResult, Table};
use tracing::debug;
use uuid::Uuid;

use crate::model::{
    ConsumerRecord, PluginRecord, RoleEndpointRecord, RoleRecord, RouteRecord, ServiceRecord,
    WorkspaceRecord,
};

/// A record type parsed from a fixed projection of one table.
pub trait FromRecord: Sized {
    const TABLE: Table;
    /// Columns requested from the store, in the order `from_record` reads them.
    const PROJECTION: &'static [&'static str];

    fn from_record(record: &Record) -> StorageResult<Self>;
}

/// Reads and parses every row of `R::TABLE`. A single malformed row fails the read.
pub async fn read_all<R: FromRecord>(store: &dyn EntityStore) -> StorageResult<Vec<R>> {
    let records = store.fetch(R::TABLE, R::PROJECTION).await?;
    let parsed = records
        .iter()
        .map(R::from_record)
        .collect::<StorageResult<Vec<_>>>()?;
    debug!(table = %R::TABLE, rows = parsed.len(), "Read current entities");
    Ok(parsed)
}

struct Fields<'a> {
    table: Table,
    columns: &'static [&'static str],
    record: &'a Record,
}

impl<'a> Fields<'a> {
    fn of<R: FromRecord>(record: &'a Record) -> StorageResult<Self> {
        if record.len() != R::PROJECTION.len() {
            return Err(StorageError::malformed_row(
                R::TABLE,
                format!(
                    "expected {} columns, got {}",
                    R::PROJECTION.len(),
                    record.len()
                ),
            ));
        }
        Ok(Self {
            table: R::TABLE,
            columns: R::PROJECTION,
            record,
        })
    }

    fn text(&self, index: usize) -> Option<String> {
        self.record.get(index).map(str::to_string)
    }

    fn required(&self, index: usize) -> StorageResult<String> {
        self.text(index).ok_or_else(|| {
            StorageError::malformed_row(self.table, format!("{} is null", self.columns[index]))
        })
    }

    fn uuid(&self, index: usize) -> StorageResult<Uuid> {
        let raw = self.required(index)?;
        self.parse_uuid(index, &raw)
    }

    fn optional_uuid(&self, index: usize) -> StorageResult<Option<Uuid>> {
        self.record
            .get(index)
            .map(|raw| self.parse_uuid(index, raw))
            .transpose()
    }

    fn parse_uuid(&self, index: usize, raw: &str) -> StorageResult<Uuid> {
        Uuid::parse_str(raw).map_err(|e| {
            StorageError::malformed_row(
                self.table,
                format!("{} is not a uuid ({raw:?}): {e}", self.columns[index]),
            )
        })
    }
}

impl FromRecord for WorkspaceRecord {
    const TABLE: Table = Table::Workspaces;
    const PROJECTION: &'static [&'static str] = &["id", "name"];

    fn from_record(record: &Record) -> StorageResult<Self> {
        let f = Fields::of::<Self>(record)?;
        Ok(Self {
            id: f.uuid(0)?,
            name: f.required(1)?,
        })
    }
}

impl FromRecord for RoleRecord {
    const TABLE: Table = Table::RbacRoles;
    const PROJECTION: &'static [&'static str] = &["id", "name", "ws_id"];

    fn from_record(record: &Record) -> StorageResult<Self> {
        let f = Fields::of::<Self>(record)?;
        Ok(Self {
            id: f.uuid(0)?,
            name: f.required(1)?,
            ws_id: f.uuid(2)?,
        })
    }
}

impl FromRecord for RoleEndpointRecord {
    const TABLE: Table = Table::RbacRoleEndpoints;
    const PROJECTION: &'static [&'static str] = &["role_id", "workspace", "endpoint"];

    fn from_record(record: &Record) -> StorageResult<Self> {
        let f = Fields::of::<Self>(record)?;
        Ok(Self {
            role_id: f.uuid(0)?,
            workspace: f.required(1)?,
            endpoint: f.required(2)?,
        })
    }
}

impl FromRecord for ServiceRecord {
    const TABLE: Table = Table::Services;
    const PROJECTION: &'static [&'static str] = &["id", "name", "ws_id"];

    fn from_record(record: &Record) -> StorageResult<Self> {
        let f = Fields::of::<Self>(record)?;
        Ok(Self {
            id: f.uuid(0)?,
            name: f.text(1),
            ws_id: f.uuid(2)?,
        })
    }
}

impl FromRecord for RouteRecord {
    const TABLE: Table = Table::Routes;
    const PROJECTION: &'static [&'static str] = &["id", "name", "service_id", "ws_id"];

    fn from_record(record: &Record) -> StorageResult<Self> {
        let f = Fields::of::<Self>(record)?;
        Ok(Self {
            id: f.uuid(0)?,
            name: f.text(1),
            service_id: f.optional_uuid(2)?,
            ws_id: f.uuid(3)?,
        })
    }
}

impl FromRecord for ConsumerRecord {
    const TABLE: Table = Table::Consumers;
    const PROJECTION: &'static [&'static str] = &["id", "username", "ws_id"];

    fn from_record(record: &Record) -> StorageResult<Self> {
        let f = Fields::of::<Self>(record)?;
        Ok(Self {
            id: f.uuid(0)?,
            username: f.text(1),
            ws_id: f.uuid(2)?,
        })
    }
}

impl FromRecord for PluginRecord {
    const TABLE: Table = Table::Plugins;
    const PROJECTION: &'static [&'static str] = &["id", "name", "service_id", "cache_key", "ws_id"];

    fn from_record(record: &Record) -> StorageResult<Self> {
        let f = Fields::of::<Self>(record)?;
        Ok(Self {
            id: f.uuid(0)?,
            name: f.required(1)?,
            service_id: f.optional_uuid(2)?,
            cache_key: f.text(3),
            ws_id: f.uuid(4)?,
        })
    }
}
