//! Error types for the migration system
//!
//! Every failure is terminal for the run that produced it: there is no
//! retry anywhere, and no error category is "skip and continue". The one
//! deliberate exception is the applied-state read, which may be degraded
//! to an empty list instead of surfaced (see `StateReadPolicy`).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Error types for migration operations
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The database did not answer the liveness probe
    #[error("database unreachable: {source}")]
    Connectivity {
        #[source]
        source: sqlx::Error,
    },

    /// The source directory could not be scanned, or a filename that
    /// matches the migration pattern carries an unparseable identity
    #[error("failed to scan migration sources in {path}: {message}")]
    Scan { path: PathBuf, message: String },

    /// The applied-state table could not be created
    #[error("failed to create migration table '{table}': {source}")]
    TableCreate {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// The applied-state table could not be read. Only surfaced under
    /// `StateReadPolicy::Fail`; the default policy degrades to empty.
    #[error("failed to read applied migrations from '{table}': {source}")]
    StateRead {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// A migration's transaction failed while applying; rolled back
    #[error("failed to apply migration {id}_{name}: {source}")]
    Apply {
        id: i64,
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A migration's transaction failed while reverting; rolled back
    #[error("failed to revert migration {id}_{name}: {source}")]
    Revert {
        id: i64,
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A migration's transaction exceeded the configured deadline and
    /// was abandoned; rolled back
    #[error("migration {id}_{name} timed out")]
    Timeout { id: i64, name: String },

    /// Filesystem error outside the scanner (reading a migration body)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
