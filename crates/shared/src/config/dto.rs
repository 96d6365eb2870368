//! Configuration Data Transfer Objects (DTOs)
//!
//! Immutable configuration for the scaler control plane, loaded once at
//! startup and handed to the controller via dependency injection.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use super::error::{ConfigError, Result};

const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 60;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Configuration DTO for a single-cluster scaler.
///
/// # Example
///
/// ```ignore
/// use stratus_shared::config::ScalerConfigDto;
///
/// let config = ScalerConfigDto::from_env()?;
/// println!("Controlling cluster: {}", config.cluster_id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerConfigDto {
    /// Id of the resource cluster this scaler controls
    pub cluster_id: String,

    /// Usage sampling period (seconds)
    pub sample_interval_secs: u64,

    /// Rule-set refresh period (seconds), independent of sampling
    pub refresh_interval_secs: u64,
}

impl ScalerConfigDto {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cluster_id = env::var("STRATUS_CLUSTER_ID").map_err(|_| {
            ConfigError::MissingRequired {
                var: "STRATUS_CLUSTER_ID".to_string(),
            }
        })?;

        Ok(Self {
            cluster_id,
            sample_interval_secs: parse_secs_var(
                "STRATUS_SAMPLE_INTERVAL_SECS",
                DEFAULT_SAMPLE_INTERVAL_SECS,
            )?,
            refresh_interval_secs: parse_secs_var(
                "STRATUS_REFRESH_INTERVAL_SECS",
                DEFAULT_REFRESH_INTERVAL_SECS,
            )?,
        })
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn parse_secs_var(var: &str, default: u64) -> Result<u64> {
    match env::var(var) {
        Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_secs_var_falls_back_to_default() {
        assert_eq!(
            parse_secs_var("STRATUS_TEST_UNSET_VAR", 42).unwrap(),
            42
        );
    }

    #[test]
    fn dto_serializes_round_trip() {
        let dto = ScalerConfigDto {
            cluster_id: "prod".to_string(),
            sample_interval_secs: 30,
            refresh_interval_secs: 120,
        };
        let json = serde_json::to_string(&dto).unwrap();
        let back: ScalerConfigDto = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cluster_id, "prod");
        assert_eq!(back.sample_interval(), Duration::from_secs(30));
    }
}
