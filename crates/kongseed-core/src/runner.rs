//! The run state machine: one create pass or one delete pass over every kind.

use std::fmt;

use kongseed_storage::{DynStore, Row, Table};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::SeedConfig;
use crate::context::RunContext;
use crate::desired::{DesiredState, RouteOptions};
use crate::error::SeedResult;
use crate::hydrate::Hydrator;
use crate::kinds::{
    ConsumerKind, EntityKind, Parents, PluginKind, RoleEndpointKind, RoleKind, RouteKind,
    ServiceKind, WorkspaceKind,
};
use crate::loader::BulkLoader;
use crate::reconcile::reconcile;
use crate::time::run_timestamp;

/// Which pass a run performs. A run never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Ensure every desired entity exists.
    Create,
    /// Ensure no entity remains in the active workspaces.
    Delete,
}

impl RunMode {
    /// Kinds in the order this pass visits them.
    pub fn order(self) -> Vec<Table> {
        match self {
            RunMode::Create => Table::ALL.to_vec(),
            RunMode::Delete => Table::ALL.iter().rev().copied().collect(),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Create => f.write_str("create"),
            RunMode::Delete => f.write_str("delete"),
        }
    }
}

/// Outcome for one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindReport {
    pub table: Table,
    /// Distinct desired keys.
    pub desired: usize,
    /// Rows created or deleted.
    pub acted: u64,
    /// Rows no longer desired, seen but left alone during a create pass.
    pub orphans: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub kinds: Vec<KindReport>,
}

impl RunReport {
    pub fn get(&self, table: Table) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.table == table)
    }

    pub fn total_acted(&self) -> u64 {
        self.kinds.iter().map(|k| k.acted).sum()
    }

    pub fn total_orphans(&self) -> usize {
        self.kinds.iter().map(|k| k.orphans).sum()
    }
}

/// Reconciles one store against one configuration.
pub struct Seeder {
    store: DynStore,
    desired: DesiredState,
}

impl Seeder {
    pub fn new(store: DynStore, config: &SeedConfig, routes: RouteOptions) -> Self {
        Self {
            store,
            desired: DesiredState::from_config(config, routes),
        }
    }

    pub fn desired(&self) -> &DesiredState {
        &self.desired
    }

    /// Runs one pass and reports what each kind did.
    ///
    /// Each kind is its own unit of work: an error aborts the run but leaves
    /// the kinds visited before it committed.
    #[instrument(skip(self), fields(backend = self.store.backend_name(), prefix = %self.desired.prefix))]
    pub async fn run(&self, mode: RunMode) -> SeedResult<RunReport> {
        info!(%mode, "{} entities", if mode == RunMode::Create { "creating" } else { "deleting" });
        let timestamp = run_timestamp()?;
        let mut ctx = RunContext::new(self.store.as_ref(), &self.desired);

        let mut kinds = Vec::with_capacity(Table::ALL.len());
        for table in mode.order() {
            let report = match table {
                Table::Workspaces => self.visit::<WorkspaceKind>(&mut ctx, mode, &timestamp).await?,
                Table::RbacRoles => self.visit::<RoleKind>(&mut ctx, mode, &timestamp).await?,
                Table::RbacRoleEndpoints => {
                    self.visit::<RoleEndpointKind>(&mut ctx, mode, &timestamp).await?
                }
                Table::Services => self.visit::<ServiceKind>(&mut ctx, mode, &timestamp).await?,
                Table::Routes => self.visit::<RouteKind>(&mut ctx, mode, &timestamp).await?,
                Table::Consumers => self.visit::<ConsumerKind>(&mut ctx, mode, &timestamp).await?,
                Table::Plugins => self.visit::<PluginKind>(&mut ctx, mode, &timestamp).await?,
            };
            kinds.push(report);
        }

        Ok(RunReport { mode, kinds })
    }

    async fn visit<K: EntityKind>(
        &self,
        ctx: &mut RunContext<'_>,
        mode: RunMode,
        timestamp: &str,
    ) -> SeedResult<KindReport> {
        let scope = ctx.scope().await?;
        let loader = BulkLoader::new(ctx.store());

        let desired = match mode {
            RunMode::Create => {
                let services = if K::NEEDS_SERVICES {
                    ctx.scoped::<ServiceKind>(&scope).await?
                } else {
                    Vec::new()
                };
                let roles = if K::NEEDS_ROLES {
                    ctx.scoped::<RoleKind>(&scope).await?
                } else {
                    Vec::new()
                };
                let parents = Parents {
                    scope: &scope,
                    services: &services,
                    roles: &roles,
                };
                K::derive_desired(&self.desired, &parents)
            }
            RunMode::Delete => Vec::new(),
        };

        let current = ctx.records::<K>().await?;
        let plan = reconcile::<K>(current, desired, &scope);
        if plan.is_converged() {
            debug!(table = %K::TABLE, desired = plan.desired, "Already converged");
        }

        let (acted, orphans) = match mode {
            RunMode::Create => {
                if !plan.to_delete.is_empty() {
                    warn!(
                        table = %K::TABLE,
                        orphans = plan.to_delete.len(),
                        "Entities in active workspaces are no longer desired and were left in place"
                    );
                }
                let hydrator = Hydrator::new(&self.desired, &scope, timestamp);
                let rows = plan
                    .to_create
                    .iter()
                    .map(|key| K::hydrate(key, &hydrator))
                    .collect::<SeedResult<Vec<Row>>>()?;
                (loader.create(K::TABLE, &rows).await?, plan.to_delete.len())
            }
            RunMode::Delete => (loader.delete(K::TABLE, &plan.to_delete).await?, 0),
        };

        if acted > 0 {
            ctx.invalidate(K::TABLE);
        }

        Ok(KindReport {
            table: K::TABLE,
            desired: plan.desired,
            acted,
            orphans,
        })
    }
}
