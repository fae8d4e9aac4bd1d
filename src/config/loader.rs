//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, KvBackend};
use crate::config::validation::{validate_config, validate_sync_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment variables that override file settings.
pub const ENV_ALLOWED_ORIGIN: &str = "ALLOWED_ORIGIN";
pub const ENV_API_SECRET: &str = "API_SECRET";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_REDIS_URL: &str = "REDIS_URL";
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Load and validate the server configuration.
///
/// The TOML file is optional; the environment always wins over it.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = read_with_env(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate the configuration for the sync job.
pub fn load_sync_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = read_with_env(path)?;
    validate_sync_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_with_env(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(origin) = lookup(ENV_ALLOWED_ORIGIN) {
        config.gate.allowed_origin = origin;
    }
    if let Some(secret) = lookup(ENV_API_SECRET) {
        config.signature.secret = secret;
    }
    if let Some(url) = lookup(ENV_DATABASE_URL) {
        config.storage.database_url = url;
    }
    if let Some(url) = lookup(ENV_REDIS_URL) {
        config.storage.redis_url = Some(url);
        config.storage.kv = KvBackend::Redis;
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = AppConfig::default();
        config.gate.allowed_origin = "https://from-file.example".into();

        let env: HashMap<&str, &str> = [
            (ENV_ALLOWED_ORIGIN, "https://from-env.example"),
            (ENV_API_SECRET, "s3cr3t"),
            (ENV_REDIS_URL, "redis://cache:6379/"),
        ]
        .into_iter()
        .collect();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.gate.allowed_origin, "https://from-env.example");
        assert_eq!(config.signature.secret, "s3cr3t");
        assert_eq!(config.storage.kv, KvBackend::Redis);
        assert_eq!(config.storage.redis_url.as_deref(), Some("redis://cache:6379/"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingOrigin,
            ValidationError::MissingSecret,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: gate.allowed_origin must be set, signature.secret must be set"
        );
    }
}
