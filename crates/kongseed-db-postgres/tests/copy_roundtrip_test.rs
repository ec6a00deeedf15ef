//! Bulk append and staged delete against a real PostgreSQL.

use kongseed_db_postgres::{PostgresConfig, PostgresStore};
use kongseed_storage::{EntityStore, Row, Table};
use sqlx_core::connection::Connection;
use sqlx_postgres::PgConnection;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    "CREATE TABLE workspaces (
        id uuid PRIMARY KEY,
        name text UNIQUE,
        comment text,
        meta jsonb
    )",
    "CREATE TABLE services (
        id uuid PRIMARY KEY,
        name text,
        retries bigint,
        protocol text,
        host text,
        port bigint,
        path text,
        connect_timeout bigint,
        write_timeout bigint,
        read_timeout bigint,
        ws_id uuid REFERENCES workspaces (id),
        enabled boolean,
        created_at timestamptz,
        updated_at timestamptz,
        UNIQUE (ws_id, name)
    )",
];

fn workspace(id: Uuid, name: &str) -> Row {
    vec![
        id.into(),
        name.into(),
        serde_json::json!({"color": "#3894f0", "thumbnail": null}).into(),
    ]
}

fn service(id: Uuid, name: &str, ws_id: Uuid) -> Row {
    vec![
        id.into(),
        name.into(),
        5u32.into(),
        "http".into(),
        "httpbin.org".into(),
        80u16.into(),
        "/".into(),
        60000u32.into(),
        60000u32.into(),
        60000u32.into(),
        ws_id.into(),
        true.into(),
        "2024-01-01 00:00:00+00".into(),
        "2024-01-01 00:00:00+00".into(),
    ]
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_copy_insert_fetch_and_staged_delete() {
    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let config = PostgresConfig::new("127.0.0.1")
        .with_port(port)
        .with_database("postgres")
        .with_username("postgres")
        .with_password("postgres");

    let mut conn = PgConnection::connect(&config.connection_url())
        .await
        .expect("Failed to connect to database");
    for statement in SCHEMA {
        sqlx_core::query::query(statement)
            .execute(&mut conn)
            .await
            .expect("Failed to create schema");
    }
    conn.close().await.expect("Failed to close connection");

    let store = PostgresStore::new(config);
    store.ping().await.expect("ping");

    let ws = Uuid::new_v4();
    let written = store
        .bulk_insert(
            Table::Workspaces,
            Table::Workspaces.insert_columns(),
            &[workspace(ws, "perf-workspace-0")],
        )
        .await
        .expect("insert workspaces");
    assert_eq!(written, 1);

    let services: Vec<Row> = (0..3)
        .map(|i| service(Uuid::new_v4(), &format!("perf-workspace-0-svc-{i}"), ws))
        .collect();
    let written = store
        .bulk_insert(Table::Services, Table::Services.insert_columns(), &services)
        .await
        .expect("insert services");
    assert_eq!(written, 3);

    let records = store
        .fetch(Table::Services, &["ws_id", "name", "id", "port"])
        .await
        .expect("fetch services");
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.get(0) == Some(ws.to_string().as_str())));
    assert!(records.iter().all(|r| r.get(3) == Some("80")));

    let meta = store.fetch(Table::Workspaces, &["meta"]).await.expect("fetch meta");
    let meta: serde_json::Value =
        serde_json::from_str(meta[0].get(0).expect("meta present")).expect("meta is json");
    assert_eq!(meta["color"], "#3894f0");

    let err = store
        .bulk_insert(Table::Services, Table::Services.insert_columns(), &services[..1])
        .await
        .unwrap_err();
    assert!(err.is_duplicate_key());

    let err = store
        .bulk_delete(Table::Workspaces, "id", &[ws])
        .await
        .unwrap_err();
    assert!(err.is_foreign_key_violation());

    let ids: Vec<Uuid> = records
        .iter()
        .filter_map(|r| r.get(2).and_then(|id| id.parse().ok()))
        .collect();
    let removed = store
        .bulk_delete(Table::Services, "id", &ids)
        .await
        .expect("delete services");
    assert_eq!(removed, 3);

    let removed = store
        .bulk_delete(Table::Workspaces, "id", &[ws])
        .await
        .expect("delete workspace");
    assert_eq!(removed, 1);
}
