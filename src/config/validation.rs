//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before config is handed to any command

use thiserror::Error;

use crate::config::schema::{AppConfig, Engine};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("wait.interval_ms must be greater than zero")]
    ZeroInterval,

    #[error("databases.{alias}.host must not be empty")]
    EmptyHost { alias: String },

    #[error("databases.{alias}.port must not be zero")]
    ZeroPort { alias: String },

    #[error("databases.{alias}.connect_timeout_ms must be greater than zero")]
    ZeroConnectTimeout { alias: String },

    #[error("databases.{alias}.{field} must not be empty for the postgres engine")]
    MissingField { alias: String, field: &'static str },
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.wait.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    for (alias, db) in &config.databases {
        if db.host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost { alias: alias.clone() });
        }
        if db.port == 0 {
            errors.push(ValidationError::ZeroPort { alias: alias.clone() });
        }
        if db.connect_timeout_ms == 0 {
            errors.push(ValidationError::ZeroConnectTimeout { alias: alias.clone() });
        }
        if db.engine == Engine::Postgres {
            if db.user.is_empty() {
                errors.push(ValidationError::MissingField { alias: alias.clone(), field: "user" });
            }
            if db.name.is_empty() {
                errors.push(ValidationError::MissingField { alias: alias.clone(), field: "name" });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
