//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, thresholds > 0)
//! - Check that required secrets are present
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, KvBackend};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("gate.allowed_origin must be set")]
    MissingOrigin,

    #[error("gate.browser_markers must not be empty")]
    NoBrowserMarkers,

    #[error("gate.client_ip_header must not be empty")]
    MissingClientIpHeader,

    #[error("signature.secret must be set")]
    MissingSecret,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("storage.redis_url must be set when storage.kv = \"redis\"")]
    MissingRedisUrl,

    #[error("storage.database_url must be set")]
    MissingDatabaseUrl,
}

/// Validate the configuration used by the HTTP server.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.gate.allowed_origin.is_empty() {
        errors.push(ValidationError::MissingOrigin);
    }
    if config.gate.browser_markers.iter().all(|m| m.is_empty()) {
        errors.push(ValidationError::NoBrowserMarkers);
    }
    if config.gate.client_ip_header.trim().is_empty() {
        errors.push(ValidationError::MissingClientIpHeader);
    }
    if config.signature.secret.is_empty() {
        errors.push(ValidationError::MissingSecret);
    }
    if config.signature.max_episode_number == 0 {
        errors.push(ValidationError::Zero("signature.max_episode_number"));
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::Zero("rate_limit.max_requests"));
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::Zero("rate_limit.window_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    errors.extend(validate_storage(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only what the sync job needs.
pub fn validate_sync_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if config.storage.database_url.is_empty() {
        errors.push(ValidationError::MissingDatabaseUrl);
    }
    if config.sync.pages == 0 {
        errors.push(ValidationError::Zero("sync.pages"));
    }
    if config.sync.per_page == 0 {
        errors.push(ValidationError::Zero("sync.per_page"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_storage(config: &AppConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if config.storage.database_url.is_empty() {
        errors.push(ValidationError::MissingDatabaseUrl);
    }
    if config.storage.kv == KvBackend::Redis && config.storage.redis_url.is_none() {
        errors.push(ValidationError::MissingRedisUrl);
    }
    if config.storage.kv == KvBackend::Memory && config.storage.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero("storage.sweep_interval_secs"));
    }
    errors
}
