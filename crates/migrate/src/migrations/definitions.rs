//! Migration Definitions - Core types and structures for migrations
//!
//! Defines the fundamental types used throughout the migration system:
//! MigrationRecord, MigratorConfig, and the per-run reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Identity and ordering unit for one migration
///
/// `id` is a Unix-epoch-seconds timestamp acting as both the unique key
/// and the total order (earlier = smaller). `name` is a human-readable
/// slug, unique in combination with `id` but not necessarily alone.
/// Records are immutable; only their presence in the applied-state
/// table changes over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Unix timestamp uniquely naming the migration and defining its order
    pub id: i64,
    /// Human-readable name for the migration
    pub name: String,
}

impl MigrationRecord {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Filename of the forward SQL script, by convention
    pub fn up_filename(&self) -> String {
        format!("{}_{}.up.sql", self.id, self.name)
    }

    /// Filename of the reverse SQL script, by convention. The file is
    /// allowed to be absent (an irreversible migration).
    pub fn down_filename(&self) -> String {
        format!("{}_{}.down.sql", self.id, self.name)
    }
}

impl fmt::Display for MigrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.id, self.name)
    }
}

/// What to do when the applied-state table cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateReadPolicy {
    /// Log a warning and treat the state as empty. This is the default
    /// so that a missing table does not abort an Up flow before table
    /// creation has had a chance to run.
    #[default]
    DegradeToEmpty,
    /// Propagate the read error. Useful for correctness auditing, where
    /// silently treating a broken table as "nothing applied" would mask
    /// a real problem.
    Fail,
}

/// Configuration for one migrator instance
///
/// Passed explicitly to `Migrator::new`; there is no process-wide
/// configuration state.
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Directory containing `{id}_{name}.up.sql` / `.down.sql` pairs
    pub source_dir: PathBuf,
    /// Name of the applied-state tracking table
    pub table: String,
    /// Maximum number of migrations applied or reverted in one run;
    /// -1 (or any non-positive value) means all
    pub step: i32,
    /// Deadline for each individual migration's transaction
    pub timeout: Duration,
    /// Behavior when the applied-state table cannot be read
    pub on_state_read_error: StateReadPolicy,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("./migrations"),
            table: "schema_migrations".to_string(),
            step: -1,
            timeout: Duration::from_secs(5),
            on_state_read_error: StateReadPolicy::default(),
        }
    }
}

/// Result of an up run
#[derive(Debug)]
pub struct UpReport {
    /// Migrations applied by this run, in application order
    pub applied: Vec<MigrationRecord>,
    /// Number of migrations already recorded before this run
    pub skipped: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Result of a down run
#[derive(Debug)]
pub struct DownReport {
    /// Migrations reverted by this run, most recent first
    pub reverted: Vec<MigrationRecord>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Status of one source migration relative to the applied state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    /// Not recorded in the applied-state table
    Pending,
    /// Recorded in the applied-state table
    Applied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_follow_convention() {
        let record = MigrationRecord::new(1700000000, "create_users");
        assert_eq!(record.up_filename(), "1700000000_create_users.up.sql");
        assert_eq!(record.down_filename(), "1700000000_create_users.down.sql");
        assert_eq!(record.to_string(), "1700000000_create_users");
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = MigratorConfig::default();
        assert_eq!(config.step, -1);
        assert_eq!(config.table, "schema_migrations");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.on_state_read_error, StateReadPolicy::DegradeToEmpty);
    }
}
