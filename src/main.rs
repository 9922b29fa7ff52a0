//! db-ready command-line entry point.
//!
//! ```text
//! db-ready [--config <path>] wait_for_db [--database <alias>]... [--interval-ms N] [--timeout-secs N]
//! db-ready [--config <path>] check [--database <alias>]...
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use db_ready::commands::{Command, WaitOptions};
use db_ready::config::loader::load_with_env;
use db_ready::config::DEFAULT_DATABASE;
use db_ready::health::DatabaseChecker;
use db_ready::lifecycle::shutdown_signal;
use db_ready::observability::init_logging;

#[derive(Parser)]
#[command(name = "db-ready")]
#[command(about = "Wait for databases to accept connections", long_about = None)]
struct Cli {
    /// TOML config file. Defaults plus DATABASE_URL / DB_* env vars when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Block until the databases accept connections
    #[command(name = "wait_for_db")]
    WaitForDb {
        /// Database alias to wait for (repeatable)
        #[arg(long = "database", default_value = DEFAULT_DATABASE)]
        databases: Vec<String>,

        /// Delay between attempts, overriding the config
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,

        /// Give up after this many seconds, overriding the config
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Run a single check without retrying
    Check {
        /// Database alias to check (repeatable)
        #[arg(long = "database", default_value = DEFAULT_DATABASE)]
        databases: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_with_env(cli.config.as_deref(), |key| std::env::var(key).ok())?;
    init_logging(&config.observability.log_level)?;

    tracing::debug!(
        databases = ?config.databases.keys().collect::<Vec<_>>(),
        interval_ms = config.wait.interval_ms,
        "Configuration loaded"
    );

    let command = match cli.command {
        Commands::WaitForDb {
            databases,
            interval_ms,
            timeout_secs,
        } => {
            let defaults = WaitOptions::from_config(&config);
            Command::WaitForDb(WaitOptions {
                databases,
                interval: interval_ms.map(Duration::from_millis).unwrap_or(defaults.interval),
                deadline: timeout_secs.map(Duration::from_secs).or(defaults.deadline),
            })
        }
        Commands::Check { databases } => Command::Check { databases },
    };

    let checker = DatabaseChecker::from_config(&config);

    tokio::select! {
        result = command.run(&checker) => result?,
        signal = shutdown_signal() => {
            tracing::warn!(signal, "Interrupted before database became ready");
            return Err(format!("interrupted by {}", signal).into());
        }
    }

    Ok(())
}
