//! Config-backed connection check.
//!
//! # Responsibilities
//! - Resolve each alias in the target set against `AppConfig.databases`
//! - Dispatch to the probe matching the configured engine
//! - Stop at the first failing alias

use std::collections::BTreeMap;

use crate::config::{AppConfig, DatabaseConfig, Engine};
use crate::health::check::{CheckError, ConnectionCheck};
use crate::health::{postgres::PostgresProbe, tcp};

/// Checks configured databases by alias.
#[derive(Debug, Clone)]
pub struct DatabaseChecker {
    databases: BTreeMap<String, DatabaseConfig>,
}

impl DatabaseChecker {
    pub fn new(databases: BTreeMap<String, DatabaseConfig>) -> Self {
        Self { databases }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.databases.clone())
    }

    async fn check_one(&self, alias: &str) -> Result<(), CheckError> {
        let config = self
            .databases
            .get(alias)
            .ok_or_else(|| CheckError::UnknownDatabase(alias.to_string()))?;

        match config.engine {
            Engine::Postgres => PostgresProbe::new(alias, config).probe().await,
            Engine::Tcp => tcp::probe(alias, config).await,
        }
    }
}

impl ConnectionCheck for DatabaseChecker {
    async fn check(&self, databases: &[String]) -> Result<(), CheckError> {
        for alias in databases {
            self.check_one(alias).await?;
        }
        Ok(())
    }
}
