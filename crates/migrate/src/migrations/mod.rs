//! Migration System
//!
//! File-based SQL migrations over PostgreSQL: a source scanner for
//! `{id}_{name}.up.sql` pairs, an applied-state table, a watermark
//! reconciler, and a one-transaction-per-migration executor.

pub mod definitions;
pub mod executor;
pub mod reconcile;
pub mod runner;
pub mod source;
pub mod state;

pub use definitions::{
    DownReport, MigrationRecord, MigrationStatus, MigratorConfig, StateReadPolicy, UpReport,
};
pub use runner::Migrator;
