//! Expected route paths for external load-testing tools.

use std::path::Path;

use tracing::info;

use crate::config::SeedConfig;
use crate::desired::RouteOptions;
use crate::error::{SeedError, SeedResult};
use crate::naming;

/// Every route path a create pass would produce for `config`.
///
/// Computed from configuration alone, so it can be written without a store.
pub fn expected_route_paths(config: &SeedConfig, options: RouteOptions) -> Vec<String> {
    let mut paths = Vec::new();
    for w in 0..config.workspaces {
        let workspace = naming::workspace_name(&config.prefix, w);
        for s in 0..config.services_per_workspace {
            let service = naming::service_name(&workspace, s);
            for r in 0..config.routes_per_service {
                let route = naming::route_name(&service, r);
                paths.push(options.dump_path(&config.prefix, &route));
            }
        }
    }
    paths
}

/// Writes `paths` to `path` as a pretty-printed JSON array.
pub fn write_route_paths(path: &Path, paths: &[String]) -> SeedResult<()> {
    let body = serde_json::to_string_pretty(paths)?;
    std::fs::write(path, body).map_err(|e| SeedError::io(path, e))?;
    info!(path = %path.display(), routes = paths.len(), "Wrote route paths");
    Ok(())
}
