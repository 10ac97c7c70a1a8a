//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid request body limit")]
    InvalidBodyLimit,

    #[error("Invalid upstream base URL (must start with http:// or https://)")]
    InvalidUpstreamUrl,

    #[error("Invalid upstream connect timeout")]
    InvalidUpstreamTimeout,

    #[error("Session TTL must be between 1 and 3600 seconds")]
    InvalidSessionTtl,
}
