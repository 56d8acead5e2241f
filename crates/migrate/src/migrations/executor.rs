//! Executor - Applies or reverts one migration in one transaction
//!
//! The bookkeeping write and the schema change share a single
//! transaction, so the applied-state table can never drift from the
//! actual schema: a crash mid-migration leaves either "not applied, no
//! schema change" or "applied, schema changed", never a third state.

use sqlx::{Executor, PgPool};
use tokio::time;

use crate::error::{MigrateError, MigrateResult};

use super::definitions::{MigrationRecord, MigratorConfig};
use super::source;

type TxError = Box<dyn std::error::Error + Send + Sync>;

/// Apply one migration: insert its row into the applied-state table and
/// execute its up body, atomically, within the configured deadline.
///
/// A missing up file is treated as an empty body — a migration entry
/// may exist purely as a state-table checkpoint. Any other failure,
/// including the deadline, abandons the transaction with no partial
/// effect visible.
pub async fn apply_one(
    pool: &PgPool,
    config: &MigratorConfig,
    migration: &MigrationRecord,
) -> MigrateResult<()> {
    match time::timeout(config.timeout, apply_tx(pool, config, migration)).await {
        Ok(result) => result.map_err(|source| MigrateError::Apply {
            id: migration.id,
            name: migration.name.clone(),
            source,
        }),
        // Dropping the in-flight transaction rolls it back.
        Err(_elapsed) => Err(MigrateError::Timeout {
            id: migration.id,
            name: migration.name.clone(),
        }),
    }
}

/// Revert one migration: delete its row from the applied-state table
/// and execute its down body if one exists, atomically, within the
/// configured deadline. A missing down file means the migration is
/// irreversible on the schema side; the bookkeeping row is still
/// removed.
pub async fn revert_one(
    pool: &PgPool,
    config: &MigratorConfig,
    migration: &MigrationRecord,
) -> MigrateResult<()> {
    match time::timeout(config.timeout, revert_tx(pool, config, migration)).await {
        Ok(result) => result.map_err(|source| MigrateError::Revert {
            id: migration.id,
            name: migration.name.clone(),
            source,
        }),
        Err(_elapsed) => Err(MigrateError::Timeout {
            id: migration.id,
            name: migration.name.clone(),
        }),
    }
}

async fn apply_tx(
    pool: &PgPool,
    config: &MigratorConfig,
    migration: &MigrationRecord,
) -> Result<(), TxError> {
    let mut tx = pool.begin().await?;

    let insert = format!("INSERT INTO {} (id, name) VALUES ($1, $2)", config.table);
    sqlx::query(&insert)
        .bind(migration.id)
        .bind(&migration.name)
        .execute(&mut *tx)
        .await?;

    if let Some(body) = source::read_up_body(&config.source_dir, migration)? {
        execute_body(&mut tx, &body).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn revert_tx(
    pool: &PgPool,
    config: &MigratorConfig,
    migration: &MigrationRecord,
) -> Result<(), TxError> {
    let mut tx = pool.begin().await?;

    let delete = format!("DELETE FROM {} WHERE id = $1", config.table);
    sqlx::query(&delete)
        .bind(migration.id)
        .execute(&mut *tx)
        .await?;

    if let Some(body) = source::read_down_body(&config.source_dir, migration)? {
        execute_body(&mut tx, &body).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Run a migration body as one batch over the simple-query protocol, so
/// a file may hold several semicolon-separated statements.
async fn execute_body(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    body: &str,
) -> Result<(), TxError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    (&mut **tx).execute(body).await?;
    Ok(())
}
