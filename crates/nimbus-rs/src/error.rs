//! Error types for nimbus-rs

use thiserror::Error;

/// Errors that can occur when talking to the launch service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration file not found
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with an error payload
    #[error("Service error: {0}")]
    Remote(String),

    /// No configuration directory found
    #[error("Could not determine config directory")]
    NoConfigDirectory,
}
