//! Management commands.
//!
//! # Data Flow
//! ```text
//! "wait_for_db" / "check"
//!     → Command::from_name (defaults taken from AppConfig)
//!     → run()
//!     → wait_for_db.rs (retry loop) | check.rs (single attempt)
//! ```
//!
//! The CLI builds `Command` values directly from its arguments;
//! `call_command` is the by-name entry point for embedding callers.

pub mod check;
pub mod wait_for_db;

use std::time::Duration;

use thiserror::Error;

use crate::config::{AppConfig, DEFAULT_DATABASE};
use crate::health::{CheckError, ConnectionCheck};
use crate::resilience::RetryPolicy;

pub use wait_for_db::{WaitError, WaitForDb, WaitReport};

/// Errors returned by command dispatch.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: '{0}'")]
    UnknownCommand(String),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Options for `wait_for_db`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    pub databases: Vec<String>,
    pub interval: Duration,
    pub deadline: Option<Duration>,
}

impl WaitOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            databases: default_targets(),
            interval: config.wait.interval(),
            deadline: config.wait.timeout(),
        }
    }
}

/// A resolved command ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    WaitForDb(WaitOptions),
    Check { databases: Vec<String> },
}

impl Command {
    pub const WAIT_FOR_DB: &'static str = "wait_for_db";
    pub const CHECK: &'static str = "check";

    /// Resolve a command by name, filling options from `config`.
    pub fn from_name(name: &str, config: &AppConfig) -> Result<Self, CommandError> {
        match name {
            Self::WAIT_FOR_DB => Ok(Command::WaitForDb(WaitOptions::from_config(config))),
            Self::CHECK => Ok(Command::Check {
                databases: default_targets(),
            }),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    pub async fn run<C: ConnectionCheck + Sync>(&self, checker: &C) -> Result<(), CommandError> {
        match self {
            Command::WaitForDb(opts) => {
                WaitForDb::new(checker)
                    .with_databases(opts.databases.clone())
                    .with_policy(RetryPolicy::fixed(opts.interval))
                    .with_deadline(opts.deadline)
                    .run()
                    .await?;
            }
            Command::Check { databases } => check::run_check(checker, databases).await?,
        }
        Ok(())
    }
}

/// Run the command called `name` with options from `config`.
pub async fn call_command<C>(name: &str, checker: &C, config: &AppConfig) -> Result<(), CommandError>
where
    C: ConnectionCheck + Sync,
{
    Command::from_name(name, config)?.run(checker).await
}

fn default_targets() -> Vec<String> {
    vec![DEFAULT_DATABASE.to_string()]
}
