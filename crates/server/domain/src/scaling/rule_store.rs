//! Rule-store port.
//!
//! The store persists per-cluster scaling specs; the controller only ever
//! consumes point-in-time snapshots of them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stratus_shared::{ClusterId, SkuId};

use crate::shared_kernel::Result;

use super::spec::ScaleSpec;

/// Point-in-time view of a cluster's scaling rules. An empty snapshot is
/// valid; the controller simply idles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRuleSnapshot {
    pub cluster_id: ClusterId,
    pub rules: BTreeMap<SkuId, ScaleSpec>,
}

impl ScaleRuleSnapshot {
    pub fn empty(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            rules: BTreeMap::new(),
        }
    }

    /// Insert a spec keyed by its own sku id.
    pub fn with_rule(mut self, spec: ScaleSpec) -> Self {
        self.rules.insert(spec.sku_id.clone(), spec);
        self
    }
}

#[async_trait]
pub trait ScaleRuleStore: Send + Sync {
    /// Fetch the current rule snapshot for a cluster.
    async fn get_scale_rules(&self, cluster_id: &ClusterId) -> Result<ScaleRuleSnapshot>;
}
