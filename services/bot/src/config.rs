//! services/bot/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where users and readings are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local maps; everything is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("'{}' is not one of: postgres, memory", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub storage: StorageBackend,
    /// Required only for the Postgres backend.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub openai_api_key: String,
    pub interpreter_model: String,
    pub generation_timeout: Duration,
    pub history_limit: usize,
    /// Guards the premium toggle; the endpoint is disabled when unset.
    pub admin_token: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Storage ---
        let bind_address = parsed(&lookup, "BIND_ADDRESS", "0.0.0.0:3000")?;
        let storage: StorageBackend = parsed(&lookup, "STORAGE_BACKEND", "postgres")?;

        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }
        let database_max_connections = parsed(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Interpretation Generator ---
        let openai_api_key = lookup("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let interpreter_model = lookup("INTERPRETER_MODEL").unwrap_or_else(|| "gpt-4o".to_string());
        let generation_timeout =
            Duration::from_secs(parsed(&lookup, "GENERATION_TIMEOUT_SECS", "60")?);

        // --- Presentation and Admin ---
        let history_limit = parsed(&lookup, "HISTORY_LIMIT", "5")?;
        let admin_token = lookup("ADMIN_TOKEN").filter(|token| !token.is_empty());

        Ok(Self {
            bind_address,
            storage,
            database_url,
            database_max_connections,
            log_level,
            openai_api_key,
            interpreter_model,
            generation_timeout,
            history_limit,
            admin_token,
        })
    }
}

fn parsed<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_for_the_memory_backend() {
        let config = load(&[("STORAGE_BACKEND", "memory"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.interpreter_model, "gpt-4o");
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn postgres_requires_a_database_url() {
        let err = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn api_key_is_required() {
        let err = load(&[("STORAGE_BACKEND", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "OPENAI_API_KEY"));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[
            ("STORAGE_BACKEND", "memory"),
            ("OPENAI_API_KEY", "sk-test"),
            ("GENERATION_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "GENERATION_TIMEOUT_SECS"));

        let err = load(&[("STORAGE_BACKEND", "mongo"), ("OPENAI_API_KEY", "sk-test")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "STORAGE_BACKEND"));
    }

    #[test]
    fn empty_admin_token_disables_the_endpoint() {
        let config = load(&[
            ("STORAGE_BACKEND", "memory"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ADMIN_TOKEN", ""),
        ])
        .unwrap();
        assert!(config.admin_token.is_none());
    }
}
