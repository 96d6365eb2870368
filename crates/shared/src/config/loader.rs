//! Configuration loader
//!
//! Loads configuration from an optional `.env` file and the process
//! environment, then validates it fail-fast.

use std::path::Path;

use super::dto::ScalerConfigDto;
use super::error::{ConfigError, Result};
use super::validator::validate_scaler_config;

/// Configuration loader.
///
/// # Priority
///
/// Values from the `.env` file take precedence over variables already in the
/// process environment, which allows local development overrides without
/// touching the system environment.
///
/// # Example
///
/// ```ignore
/// use stratus_shared::config::ConfigLoader;
///
/// let loader = ConfigLoader::new(Some(".env".into()));
/// let config = loader.load_scaler_config()?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_file_path: Option<std::path::PathBuf>,
}

impl ConfigLoader {
    pub fn new(env_file_path: Option<std::path::PathBuf>) -> Self {
        Self { env_file_path }
    }

    /// Load and validate the scaler configuration.
    pub fn load_scaler_config(&self) -> Result<ScalerConfigDto> {
        if let Some(path) = &self.env_file_path {
            self.load_env_file(path)?;
        }

        let config = ScalerConfigDto::from_env()?;
        validate_scaler_config(&config)?;

        Ok(config)
    }

    fn load_env_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ConfigError::EnvFileLoad {
                path: path.to_path_buf(),
                source: dotenv::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                )),
            });
        }

        dotenv::from_path(path).map_err(|source| ConfigError::EnvFileLoad {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_file_is_an_error() {
        let loader = ConfigLoader::new(Some("/nonexistent/.env".into()));
        let err = loader.load_scaler_config().unwrap_err();
        assert!(matches!(err, ConfigError::EnvFileLoad { .. }));
    }
}
