//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading or validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration variable is missing
    #[error("Missing required configuration: {var}")]
    MissingRequired { var: String },

    /// A configuration variable has an invalid value
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    /// Failed to load .env file
    #[error("Failed to load .env file from {path}: {source}")]
    EnvFileLoad {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
