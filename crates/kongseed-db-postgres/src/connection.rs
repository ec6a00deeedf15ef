//! Connection management for the PostgreSQL store backend.
//!
//! Every bulk operation opens its own connection and closes it when done.

use std::time::Duration;

use sqlx_core::connection::Connection;
use sqlx_postgres::{PgConnectOptions, PgConnection};
use tracing::{debug, instrument};

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};

const APPLICATION_NAME: &str = "kongseed";

/// Opens a new connection to the gateway database.
#[instrument(skip(config), fields(url = %mask_password(&config.connection_url())))]
pub async fn connect(config: &PostgresConfig) -> Result<PgConnection> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database)
        .application_name(APPLICATION_NAME);

    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
        .await
        .map_err(|_| PostgresError::ConnectTimeout {
            timeout_ms: config.connect_timeout_ms,
        })??;
    debug!("PostgreSQL connection opened");
    Ok(conn)
}

/// Closes a connection, logging instead of failing when the goodbye is lost.
pub async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        debug!(error = %e, "PostgreSQL connection did not close cleanly");
    }
}

/// Tests the connection to the database.
#[instrument(skip(config))]
pub async fn test_connection(config: &PostgresConfig) -> Result<()> {
    let mut conn = connect(config).await?;
    sqlx_core::query::query("SELECT 1")
        .execute(&mut conn)
        .await
        .map_err(PostgresError::from)?;
    close(conn).await;

    debug!("Database connection test successful");

    Ok(())
}

/// Masks the password in a database URL for logging.
pub(crate) fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
    {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if colon_pos > scheme_end {
            return format!("{}:****{}", &url[..colon_pos], &url[at_pos..]);
        }
    }
    url.to_string()
}
