//! State Reader - The applied-state tracking table
//!
//! One row per applied migration, primary-keyed by identity. This table
//! is the single source of truth for "what has run"; it is created
//! lazily and idempotently.

use sqlx::{Connection, PgPool, Row};

use crate::error::{MigrateError, MigrateResult};

use super::definitions::{MigrationRecord, StateReadPolicy};

/// Liveness probe. Failure is reported as a distinct connectivity
/// condition before any other work begins.
pub async fn ping(pool: &PgPool) -> MigrateResult<()> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|source| MigrateError::Connectivity { source })?;
    conn.ping()
        .await
        .map_err(|source| MigrateError::Connectivity { source })
}

/// SQL to create the applied-state table
pub fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    \
            id BIGINT PRIMARY KEY,\n    \
            name VARCHAR(180) NOT NULL\n\
        );",
        table
    )
}

/// Create the applied-state table if it does not exist. No-op otherwise.
pub async fn ensure_table(pool: &PgPool, table: &str) -> MigrateResult<()> {
    sqlx::query(&create_table_sql(table))
        .execute(pool)
        .await
        .map_err(|source| MigrateError::TableCreate {
            table: table.to_string(),
            source,
        })?;
    Ok(())
}

/// Load all applied-migration rows, unordered. Callers sort as needed.
///
/// On read failure the behavior is the caller's `StateReadPolicy`: the
/// default degrades to an empty list with a warning, so a missing table
/// does not abort startup before table creation runs.
pub async fn load_applied(
    pool: &PgPool,
    table: &str,
    policy: StateReadPolicy,
) -> MigrateResult<Vec<MigrationRecord>> {
    match read_rows(pool, table).await {
        Ok(records) => Ok(records),
        Err(source) => match policy {
            StateReadPolicy::DegradeToEmpty => {
                tracing::warn!(
                    table,
                    error = %source,
                    "could not read applied migrations, treating state as empty"
                );
                Ok(Vec::new())
            }
            StateReadPolicy::Fail => Err(MigrateError::StateRead {
                table: table.to_string(),
                source,
            }),
        },
    }
}

async fn read_rows(pool: &PgPool, table: &str) -> Result<Vec<MigrationRecord>, sqlx::Error> {
    let sql = format!("SELECT id, name FROM {}", table);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        records.push(MigrationRecord { id, name });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_sql_matches_contract() {
        let sql = create_table_sql("schema_migrations");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS schema_migrations"));
        assert!(sql.contains("id BIGINT PRIMARY KEY"));
        assert!(sql.contains("name VARCHAR(180) NOT NULL"));
    }
}
