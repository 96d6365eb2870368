//! Per-SKU scaling specification.

use serde::{Deserialize, Serialize};
use stratus_shared::{ClusterId, SkuId};

use crate::shared_kernel::{DomainError, Result};

/// Operator-authored availability bounds for one machine class.
///
/// `min_size`/`max_size` bound the total executor count; the idle band
/// `[min_idle_to_keep, max_idle_to_keep]` is the warm headroom the cluster
/// keeps for fast task placement. `cool_down_secs` is the minimum wall-clock
/// gap between two scaling actions on this SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub cluster_id: ClusterId,
    pub sku_id: SkuId,
    pub min_size: u32,
    pub max_size: u32,
    pub min_idle_to_keep: u32,
    pub max_idle_to_keep: u32,
    pub cool_down_secs: u32,
}

impl ScaleSpec {
    pub fn validate(&self) -> Result<()> {
        if self.min_size > self.max_size {
            return Err(DomainError::InvalidScaleSpec {
                sku_id: self.sku_id.clone(),
                field: "min_size".to_string(),
                reason: format!(
                    "min_size {} exceeds max_size {}",
                    self.min_size, self.max_size
                ),
            });
        }

        if self.min_idle_to_keep > self.max_idle_to_keep {
            return Err(DomainError::InvalidScaleSpec {
                sku_id: self.sku_id.clone(),
                field: "min_idle_to_keep".to_string(),
                reason: format!(
                    "min_idle_to_keep {} exceeds max_idle_to_keep {}",
                    self.min_idle_to_keep, self.max_idle_to_keep
                ),
            });
        }

        Ok(())
    }
}
