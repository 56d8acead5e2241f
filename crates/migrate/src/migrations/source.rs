//! Source Scanner - File system operations for migrations
//!
//! Enumerates `{id}_{name}.up.sql` files in the source directory and
//! turns them into ordered `MigrationRecord`s. Only up files establish
//! the canonical set of known migrations; down files are looked up by
//! convention at revert time and may be absent.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{MigrateError, MigrateResult};

use super::definitions::MigrationRecord;

/// Parse one filename against the `<integer>_<word-chars>.up.sql` pattern.
///
/// Returns `None` when the filename does not have the migration shape at
/// all (such files are silently ignored by the scanner), and
/// `Some(Err(..))` when the shape matches but the identity segment does
/// not fit in an i64 — that is a fatal error for the whole scan rather
/// than a skip, so a typo'd timestamp cannot quietly drop a migration.
pub fn parse_up_filename(filename: &str) -> Option<Result<MigrationRecord, String>> {
    let stem = filename.strip_suffix(".up.sql")?;
    let (id_part, name) = stem.split_once('_')?;

    if id_part.is_empty() || !id_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.is_empty()
        || !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return None;
    }

    match id_part.parse::<i64>() {
        Ok(id) => Some(Ok(MigrationRecord::new(id, name))),
        Err(e) => Some(Err(format!(
            "invalid migration identity '{}' in '{}': {}",
            id_part, filename, e
        ))),
    }
}

/// Scan a directory for up files, ascending by identity.
///
/// Identity ties with different names are kept as distinct entries; the
/// scanner does not deduplicate them.
pub async fn scan(dir: &Path) -> MigrateResult<Vec<MigrationRecord>> {
    let entries = fs::read_dir(dir).map_err(|e| MigrateError::Scan {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut migrations = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MigrateError::Scan {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };

        match parse_up_filename(file_name) {
            Some(Ok(record)) => migrations.push(record),
            Some(Err(message)) => {
                return Err(MigrateError::Scan {
                    path: dir.to_path_buf(),
                    message,
                })
            }
            None => tracing::trace!(file = file_name, "ignoring non-migration file"),
        }
    }

    migrations.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
    Ok(migrations)
}

/// Read the up body for a migration. A missing file means the migration
/// carries no SQL (a pure bookkeeping entry), not an error.
pub fn read_up_body(dir: &Path, migration: &MigrationRecord) -> MigrateResult<Option<String>> {
    read_body(&dir.join(migration.up_filename()))
}

/// Read the down body for a migration. Absent file = irreversible
/// migration, tolerated.
pub fn read_down_body(dir: &Path, migration: &MigrationRecord) -> MigrateResult<Option<String>> {
    read_body(&dir.join(migration.down_filename()))
}

fn read_body(path: &Path) -> MigrateResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(Some(body)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MigrateError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_well_formed_up_filenames() {
        let record = parse_up_filename("1700000000_create_users.up.sql")
            .unwrap()
            .unwrap();
        assert_eq!(record.id, 1700000000);
        assert_eq!(record.name, "create_users");
    }

    #[test]
    fn ignores_non_matching_filenames() {
        assert!(parse_up_filename("README.md").is_none());
        assert!(parse_up_filename("1000_init.down.sql").is_none());
        assert!(parse_up_filename("1000_init.sql").is_none());
        assert!(parse_up_filename("init_1000.up.sql").is_none());
        assert!(parse_up_filename("1000_.up.sql").is_none());
        assert!(parse_up_filename("1000_with-dash.up.sql").is_none());
    }

    #[test]
    fn identity_overflow_is_tagged_as_failure() {
        let result = parse_up_filename("99999999999999999999_ancient.up.sql").unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn scan_orders_ascending_and_skips_strays() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2000_addcol.up.sql"), "ALTER TABLE t ADD c INT;").unwrap();
        fs::write(dir.path().join("1000_init.up.sql"), "CREATE TABLE t (id INT);").unwrap();
        fs::write(dir.path().join("1000_init.down.sql"), "DROP TABLE t;").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a migration").unwrap();

        let migrations = scan(dir.path()).await.unwrap();
        assert_eq!(migrations.len(), 2);
        assert_eq!(migrations[0], MigrationRecord::new(1000, "init"));
        assert_eq!(migrations[1], MigrationRecord::new(2000, "addcol"));
    }

    #[tokio::test]
    async fn scan_fails_fast_on_malformed_identity() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1000_ok.up.sql"), "SELECT 1;").unwrap();
        fs::write(
            dir.path().join("99999999999999999999_bad.up.sql"),
            "SELECT 1;",
        )
        .unwrap();

        let err = scan(dir.path()).await.unwrap_err();
        assert!(matches!(err, MigrateError::Scan { .. }));
    }

    #[tokio::test]
    async fn scan_of_missing_directory_is_a_scan_error() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("nope");
        let err = scan(&gone).await.unwrap_err();
        assert!(matches!(err, MigrateError::Scan { .. }));
    }

    #[test]
    fn missing_bodies_are_tolerated() {
        let dir = TempDir::new().unwrap();
        let record = MigrationRecord::new(1000, "checkpoint");
        assert!(read_up_body(dir.path(), &record).unwrap().is_none());
        assert!(read_down_body(dir.path(), &record).unwrap().is_none());

        fs::write(dir.path().join("1000_checkpoint.up.sql"), "SELECT 1;").unwrap();
        assert_eq!(
            read_up_body(dir.path(), &record).unwrap().as_deref(),
            Some("SELECT 1;")
        );
    }
}
