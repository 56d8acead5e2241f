//! # tidemark: versioned SQL schema migrations for PostgreSQL
//!
//! Applies and reverts timestamped migration files against a database,
//! tracking what has run in a `schema_migrations` table so re-invocation
//! is idempotent. Pending work is computed with a watermark over the
//! greatest applied identity, and each migration runs in a single
//! transaction that couples the schema change with its bookkeeping row.
//!
//! ```no_run
//! use tidemark::{Migrator, MigratorConfig};
//!
//! # async fn run() -> tidemark::MigrateResult<()> {
//! let migrator = Migrator::connect(
//!     "postgres://localhost/app",
//!     MigratorConfig::default(),
//! )
//! .await?;
//! let report = migrator.up().await?;
//! println!("applied {} migrations", report.applied.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod migrations;

pub use error::{MigrateError, MigrateResult};
pub use migrations::{
    DownReport, MigrationRecord, MigrationStatus, Migrator, MigratorConfig, StateReadPolicy,
    UpReport,
};
