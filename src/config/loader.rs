//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

use crate::config::schema::{AppConfig, DatabaseConfig, Engine, DEFAULT_DATABASE};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` if given, otherwise start from defaults, then apply
/// environment overrides and validate the result.
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `DATABASE_URL` and then `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`
/// to the `default` alias. The alias is created if the file omitted it.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let db = config
        .databases
        .entry(DEFAULT_DATABASE.to_string())
        .or_default();

    if let Some(raw) = lookup("DATABASE_URL") {
        apply_database_url(db, &raw)?;
    }
    if let Some(host) = lookup("DB_HOST") {
        db.host = host;
    }
    if let Some(port) = lookup("DB_PORT") {
        db.port = port.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
            var: "DB_PORT",
            reason: e.to_string(),
        })?;
    }
    if let Some(name) = lookup("DB_NAME") {
        db.name = name;
    }
    if let Some(user) = lookup("DB_USER") {
        db.user = user;
    }

    Ok(())
}

fn apply_database_url(db: &mut DatabaseConfig, raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Env { var: "DATABASE_URL", reason };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

    db.engine = match url.scheme() {
        "postgres" | "postgresql" => Engine::Postgres,
        "tcp" => Engine::Tcp,
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    };

    db.host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string();

    if let Some(port) = url.port() {
        db.port = port;
    }
    if !url.username().is_empty() {
        db.user = decode(url.username()).map_err(invalid)?;
    }

    let name = url.path().trim_start_matches('/');
    if !name.is_empty() {
        db.name = decode(name).map_err(invalid)?;
    }

    Ok(())
}

/// URL components arrive percent-encoded.
fn decode(component: &str) -> Result<String, String> {
    percent_decode_str(component)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_database_url_override() {
        let config = load_with_env(None, env(&[("DATABASE_URL", "postgres://app@db:6543/appdb")])).unwrap();

        let db = &config.databases[DEFAULT_DATABASE];
        assert_eq!(db.engine, Engine::Postgres);
        assert_eq!(db.address(), "db:6543");
        assert_eq!(db.user, "app");
        assert_eq!(db.name, "appdb");
    }

    #[test]
    fn test_database_url_components_are_decoded() {
        let config = load_with_env(None, env(&[("DATABASE_URL", "postgres://app%2Duser@db/my%20db")])).unwrap();

        let db = &config.databases[DEFAULT_DATABASE];
        assert_eq!(db.user, "app-user");
        assert_eq!(db.name, "my db");
    }

    #[test]
    fn test_individual_vars_win_over_url() {
        let config = load_with_env(
            None,
            env(&[
                ("DATABASE_URL", "tcp://cache:6379"),
                ("DB_HOST", "other"),
                ("DB_PORT", "7000"),
            ]),
        )
        .unwrap();

        let db = &config.databases[DEFAULT_DATABASE];
        assert_eq!(db.engine, Engine::Tcp);
        assert_eq!(db.address(), "other:7000");
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = load_with_env(None, env(&[("DB_PORT", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "DB_PORT", .. }));
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        let err = load_with_env(None, env(&[("DATABASE_URL", "mysql://db/app")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "DATABASE_URL", .. }));
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let err = load_with_env(None, env(&[("DB_PORT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/db-ready.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
