//! Per-SKU availability rule.
//!
//! A rule is a pure function from a usage snapshot to an optional scale
//! decision, plus one piece of state: the time of its last emitted decision,
//! which drives the cooldown gate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stratus_shared::{ClusterId, SkuId};
use tracing::debug;

use crate::cluster::SkuUsage;

use super::clock::Clock;
use super::spec::ScaleSpec;

/// Direction of a scaling action. A rule that has nothing to do returns no
/// decision at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleType {
    ScaleUp,
    ScaleDown,
}

/// A resolved scaling action for one SKU.
///
/// `min_size == max_size == desire_size` on every emitted decision: the
/// bounds are pinned so the provisioner cannot reinterpret the target while
/// this action is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleDecision {
    pub cluster_id: ClusterId,
    pub sku_id: SkuId,
    pub scale_type: ScaleType,
    pub desire_size: u32,
    pub min_size: u32,
    pub max_size: u32,
}

/// Availability rule for one machine class.
#[derive(Debug)]
pub struct AvailabilityRule {
    spec: ScaleSpec,
    last_action_at: Option<DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityRule {
    pub fn new(spec: ScaleSpec, clock: Arc<dyn Clock>) -> Self {
        Self {
            spec,
            last_action_at: None,
            clock,
        }
    }

    pub fn spec(&self) -> &ScaleSpec {
        &self.spec
    }

    /// Evaluate one usage snapshot.
    ///
    /// Emits at most one decision per cooldown window. The target size is
    /// derived from the idle band, clamped to `[min_size, max_size]`; if
    /// clamping turns the adjustment into a no-op the rule stays silent and
    /// the cooldown clock is NOT touched.
    pub fn apply(&mut self, usage: &SkuUsage) -> Option<ScaleDecision> {
        if self.in_cool_down() {
            debug!(
                sku_id = %self.spec.sku_id,
                cool_down_secs = self.spec.cool_down_secs,
                "Rule in cooldown, skipping"
            );
            return None;
        }

        let idle = usage.idle_count;
        let total = usage.total_count;

        let (target, scale_type) = if idle < self.spec.min_idle_to_keep {
            (
                total + (self.spec.min_idle_to_keep - idle),
                ScaleType::ScaleUp,
            )
        } else if idle > self.spec.max_idle_to_keep {
            (
                total.saturating_sub(idle - self.spec.max_idle_to_keep),
                ScaleType::ScaleDown,
            )
        } else {
            // Within the idle band.
            return None;
        };

        let target = target.max(self.spec.min_size).min(self.spec.max_size);
        if target == total {
            // Clamping swallowed the whole adjustment; do not burn cooldown.
            return None;
        }

        self.last_action_at = Some(self.clock.now());

        Some(ScaleDecision {
            cluster_id: self.spec.cluster_id.clone(),
            sku_id: self.spec.sku_id.clone(),
            scale_type,
            desire_size: target,
            min_size: target,
            max_size: target,
        })
    }

    fn in_cool_down(&self) -> bool {
        match self.last_action_at {
            Some(last) => {
                let elapsed = self.clock.now().signed_duration_since(last);
                elapsed < Duration::seconds(i64::from(self.spec.cool_down_secs))
            }
            None => false,
        }
    }
}
