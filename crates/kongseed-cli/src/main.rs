mod cli;
mod observability;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kongseed_core::config::loader::load_config;
use kongseed_core::{SeedConfig, Seeder, expected_route_paths, write_route_paths};
use kongseed_db_postgres::PostgresStore;
use kongseed_storage::DynStore;

use cli::Cli;
use output::{error_category, print_error, print_report, print_success};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    let config = match load_config(&cli.config_file) {
        Ok(c) => c,
        Err(e) => {
            print_error(&format!("Configuration error: {e}"));
            std::process::exit(2);
        }
    };
    tracing::info!(
        path = %cli.config_file.display(),
        prefix = %config.prefix,
        workspaces = config.workspaces,
        "Configuration loaded"
    );

    if let Err(e) = run(&cli, &config).await {
        if let Some(category) = error_category(&e) {
            tracing::error!(%category, "Run aborted by a store error");
        }
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, config: &SeedConfig) -> Result<()> {
    if let Some(path) = &cli.dump_routes {
        let paths = expected_route_paths(config, cli.route_options());
        write_route_paths(path, &paths)
            .with_context(|| format!("writing route dump to {}", path.display()))?;
        print_success(&format!("Wrote {} route paths to {}", paths.len(), path.display()));
        if cli.dump_only {
            return Ok(());
        }
    }

    let store = PostgresStore::new(cli.postgres_config());
    store.ping().await.with_context(|| {
        format!(
            "cannot reach database {} at {}:{}",
            cli.database, cli.hostname, cli.port
        )
    })?;

    let store: DynStore = Arc::new(store);
    let seeder = Seeder::new(store, config, cli.route_options());
    let mode = cli.mode();
    let report = seeder
        .run(mode)
        .await
        .with_context(|| format!("{mode} pass for prefix {} failed", config.prefix))?;

    print_report(&report);
    Ok(())
}
