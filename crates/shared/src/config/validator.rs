//! Configuration validation

use super::dto::ScalerConfigDto;
use super::error::{ConfigError, Result};

/// Validate a loaded scaler configuration.
///
/// Both intervals must be strictly positive: a zero sample interval would
/// spin the control loop, and a zero refresh interval would hammer the rule
/// store.
pub fn validate_scaler_config(config: &ScalerConfigDto) -> Result<()> {
    if config.cluster_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "cluster_id cannot be empty".to_string(),
        ));
    }

    if config.sample_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "sample_interval_secs must be greater than zero".to_string(),
        ));
    }

    if config.refresh_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "refresh_interval_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
