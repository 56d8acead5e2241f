//! Migration Runner - Orchestrates up and down runs
//!
//! Each run is a linear pipeline with an early-abort policy: the first
//! failing step terminates the whole run and surfaces the error to the
//! caller. There is no partial-failure recovery and no retry.

use std::collections::HashSet;
use std::time::Instant;

use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::{MigrateError, MigrateResult};

use super::definitions::{
    DownReport, MigrationRecord, MigrationStatus, MigratorConfig, UpReport,
};
use super::{executor, reconcile, source, state};

/// Migration orchestrator bound to one pool and one configuration
pub struct Migrator {
    pool: PgPool,
    config: MigratorConfig,
}

impl Migrator {
    /// Create a migrator over an existing pool
    pub fn new(pool: PgPool, config: MigratorConfig) -> Self {
        Self { pool, config }
    }

    /// Create a migrator from a database URL
    pub async fn connect(database_url: &str, config: MigratorConfig) -> MigrateResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|source| MigrateError::Connectivity { source })?;
        Ok(Self::new(pool, config))
    }

    /// Get the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the configuration
    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Apply pending migrations in ascending identity order, up to the
    /// configured step limit, stopping at the first failure.
    pub async fn up(&self) -> MigrateResult<UpReport> {
        let started = Instant::now();
        info!("migrate up");

        state::ping(&self.pool).await?;

        let source_list = source::scan(&self.config.source_dir).await?;
        log_phase("available in source", &source_list);

        state::ensure_table(&self.pool, &self.config.table).await?;

        let mut applied = state::load_applied(
            &self.pool,
            &self.config.table,
            self.config.on_state_read_error,
        )
        .await?;
        applied.sort_by_key(|m| m.id);
        log_phase("recorded as applied", &applied);

        let pending = reconcile::limit_steps(
            reconcile::pending_after_watermark(&source_list, &applied),
            self.config.step,
        );
        log_phase("will apply", &pending);

        let mut done = Vec::with_capacity(pending.len());
        for migration in &pending {
            info!(migration = %migration, "applying");
            executor::apply_one(&self.pool, &self.config, migration).await?;
            done.push(migration.clone());
        }

        info!(applied = done.len(), "all migrations successfully applied");
        Ok(UpReport {
            applied: done,
            skipped: applied.len(),
            execution_time_ms: started.elapsed().as_millis(),
        })
    }

    /// Revert applied migrations, most recently applied first, up to
    /// the configured step limit, stopping at the first failure.
    pub async fn down(&self) -> MigrateResult<DownReport> {
        let started = Instant::now();
        info!("migrate down");

        state::ping(&self.pool).await?;

        state::ensure_table(&self.pool, &self.config.table).await?;

        let applied = state::load_applied(
            &self.pool,
            &self.config.table,
            self.config.on_state_read_error,
        )
        .await?;
        log_phase("recorded as applied", &applied);

        let targets = reconcile::limit_steps(reconcile::newest_first(applied), self.config.step);
        log_phase("will revert", &targets);

        let mut done = Vec::with_capacity(targets.len());
        for migration in &targets {
            info!(migration = %migration, "reverting");
            executor::revert_one(&self.pool, &self.config, migration).await?;
            done.push(migration.clone());
        }

        info!(reverted = done.len(), "all migrations successfully reverted");
        Ok(DownReport {
            reverted: done,
            execution_time_ms: started.elapsed().as_millis(),
        })
    }

    /// List every source migration with its applied/pending status,
    /// ascending by identity.
    pub async fn status(&self) -> MigrateResult<Vec<(MigrationRecord, MigrationStatus)>> {
        state::ping(&self.pool).await?;

        let source_list = source::scan(&self.config.source_dir).await?;

        state::ensure_table(&self.pool, &self.config.table).await?;
        let applied = state::load_applied(
            &self.pool,
            &self.config.table,
            self.config.on_state_read_error,
        )
        .await?;
        let applied_ids: HashSet<i64> = applied.into_iter().map(|m| m.id).collect();

        Ok(source_list
            .into_iter()
            .map(|m| {
                let status = if applied_ids.contains(&m.id) {
                    MigrationStatus::Applied
                } else {
                    MigrationStatus::Pending
                };
                (m, status)
            })
            .collect())
    }
}

fn log_phase(label: &str, list: &[MigrationRecord]) {
    debug!(count = list.len(), "{}", label);
    for migration in list {
        debug!("  {}", migration);
    }
}
