mod commands;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tidemark::{MigratorConfig, StateReadPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tidemark", version)]
#[command(about = "Versioned SQL schema migrations for PostgreSQL")]
struct Cli {
    /// Database connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Directory containing migration files
    #[arg(long, default_value = "./migrations", global = true)]
    path: PathBuf,

    /// Name of the applied-state tracking table
    #[arg(long, default_value = "schema_migrations", global = true)]
    table: String,

    /// Per-migration transaction deadline in seconds
    #[arg(long, default_value_t = 5, global = true)]
    timeout: u64,

    /// Fail instead of treating an unreadable tracking table as empty
    #[arg(long, global = true)]
    strict_state: bool,

    /// Itemize every phase of the run
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        /// Apply at most N migrations (-1 applies all)
        #[arg(long, default_value_t = -1)]
        step: i32,
    },

    /// Revert applied migrations, most recent first
    Down {
        /// Revert at most N migrations (-1 reverts all)
        #[arg(long, default_value_t = -1)]
        step: i32,
    },

    /// Show applied/pending status for every source migration
    Status,

    /// Create a new up/down migration file pair
    New {
        /// Migration name (will be slugified)
        name: String,
    },
}

impl Cli {
    fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("no database given: set DATABASE_URL or pass --database-url")
    }

    fn migrator_config(&self, step: i32) -> MigratorConfig {
        MigratorConfig {
            source_dir: self.path.clone(),
            table: self.table.clone(),
            step,
            timeout: Duration::from_secs(self.timeout),
            on_state_read_error: if self.strict_state {
                StateReadPolicy::Fail
            } else {
                StateReadPolicy::DegradeToEmpty
            },
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tidemark={},tidemark_cli={}", default_level, default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match &cli.command {
        Commands::Up { step } => {
            commands::migrate::up(cli.database_url()?, cli.migrator_config(*step)).await
        }
        Commands::Down { step } => {
            commands::migrate::down(cli.database_url()?, cli.migrator_config(*step)).await
        }
        Commands::Status => {
            commands::migrate::status(cli.database_url()?, cli.migrator_config(-1)).await
        }
        Commands::New { name } => commands::migrate::create(&cli.path, name),
    }
}
