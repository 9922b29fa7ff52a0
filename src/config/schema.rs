//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section has defaults so an empty file is a valid config.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Alias probed when no target set is given.
pub const DEFAULT_DATABASE: &str = "default";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Wait loop settings.
    pub wait: WaitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Database definitions keyed by alias.
    pub databases: BTreeMap<String, DatabaseConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut databases = BTreeMap::new();
        databases.insert(DEFAULT_DATABASE.to_string(), DatabaseConfig::default());

        Self {
            wait: WaitConfig::default(),
            observability: ObservabilityConfig::default(),
            databases,
        }
    }
}

/// Wait loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Fixed delay between attempts in milliseconds.
    pub interval_ms: u64,

    /// Optional overall deadline in seconds. Unbounded when absent.
    pub timeout_secs: Option<u64>,
}

impl WaitConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            timeout_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// How readiness is established for a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// PostgreSQL startup handshake.
    Postgres,
    /// Plain TCP connect.
    Tcp,
}

/// A single database definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub engine: Engine,

    /// Hostname or IP address.
    pub host: String,

    pub port: u16,

    /// Database name sent in the startup message.
    pub name: String,

    /// Role name sent in the startup message.
    pub user: String,

    /// Bound on a single connection attempt in milliseconds.
    pub connect_timeout_ms: u64,
}

impl DatabaseConfig {
    /// `host:port` string suitable for `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            connect_timeout_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.wait.interval_ms, 1000);
        assert!(config.wait.timeout().is_none());
        assert_eq!(config.databases[DEFAULT_DATABASE].address(), "localhost:5432");
    }

    #[test]
    fn test_partial_database_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [wait]
            interval_ms = 250
            timeout_secs = 30

            [databases.default]
            host = "db"
            engine = "tcp"
            "#,
        )
        .unwrap();

        let db = &config.databases[DEFAULT_DATABASE];
        assert_eq!(db.engine, Engine::Tcp);
        assert_eq!(db.address(), "db:5432");
        assert_eq!(config.wait.interval(), Duration::from_millis(250));
        assert_eq!(config.wait.timeout(), Some(Duration::from_secs(30)));
    }
}
