//! Database readiness prober.
//!
//! Blocks until configured databases accept connections, retrying on
//! connection-refused and not-ready failures at a fixed interval.

pub mod commands;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use commands::{call_command, Command, CommandError, WaitForDb};
pub use config::AppConfig;
pub use health::{CheckError, ConnectionCheck, DatabaseChecker};
