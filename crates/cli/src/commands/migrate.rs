use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tidemark::{MigrationStatus, Migrator, MigratorConfig};

pub async fn up(database_url: &str, config: MigratorConfig) -> anyhow::Result<()> {
    let migrator = Migrator::connect(database_url, config).await?;
    let report = migrator.up().await?;

    if report.applied.is_empty() {
        println!(
            "Nothing to apply ({} migration(s) already recorded)",
            report.skipped
        );
    } else {
        for migration in &report.applied {
            println!("  applied {}", migration);
        }
        println!(
            "Applied {} migration(s) in {} ms",
            report.applied.len(),
            report.execution_time_ms
        );
    }
    Ok(())
}

pub async fn down(database_url: &str, config: MigratorConfig) -> anyhow::Result<()> {
    let migrator = Migrator::connect(database_url, config).await?;
    let report = migrator.down().await?;

    if report.reverted.is_empty() {
        println!("Nothing to revert");
    } else {
        for migration in &report.reverted {
            println!("  reverted {}", migration);
        }
        println!(
            "Reverted {} migration(s) in {} ms",
            report.reverted.len(),
            report.execution_time_ms
        );
    }
    Ok(())
}

pub async fn status(database_url: &str, config: MigratorConfig) -> anyhow::Result<()> {
    let migrator = Migrator::connect(database_url, config).await?;
    let statuses = migrator.status().await?;

    println!("Migration Status:");
    println!("================");

    if statuses.is_empty() {
        println!("No migrations found");
        return Ok(());
    }

    let mut pending = 0_usize;
    for (migration, status) in &statuses {
        match status {
            MigrationStatus::Applied => println!("  ✓ {}", migration),
            MigrationStatus::Pending => {
                pending += 1;
                println!("  ⏳ {}", migration);
            }
        }
    }
    println!("\n{} pending, {} total", pending, statuses.len());
    Ok(())
}

/// Write a `{timestamp}_{name}.up.sql` / `.down.sql` pair with a
/// comment header, creating the source directory if needed.
pub fn create(path: &Path, name: &str) -> anyhow::Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create migrations directory {}", path.display()))?;

    let slug = slugify(name);
    anyhow::ensure!(!slug.is_empty(), "migration name has no usable characters");

    let now = Utc::now();
    let id = now.timestamp();
    let header = format!(
        "-- Migration: {}\n-- Created: {}\n\n",
        slug,
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let up = path.join(format!("{}_{}.up.sql", id, slug));
    let down = path.join(format!("{}_{}.down.sql", id, slug));
    fs::write(&up, &header).with_context(|| format!("failed to write {}", up.display()))?;
    fs::write(&down, &header).with_context(|| format!("failed to write {}", down.display()))?;

    println!("Created migration: {}", up.display());
    println!("Created migration: {}", down.display());
    Ok(())
}

/// Reduce a free-form name to the word-character slug the scanner
/// recognizes.
fn slugify(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}
