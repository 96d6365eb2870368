//! Cluster usage snapshots.

use serde::{Deserialize, Serialize};
use stratus_shared::ClusterId;

use super::machine::MachineSku;

/// Usage of one machine class at sample time.
///
/// `idle_count` counts registered-but-unassigned executors; `total_count`
/// counts every registered executor of the class. A snapshot where
/// `idle_count > total_count` is inconsistent and is dropped by the
/// evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuUsage {
    pub sku: MachineSku,
    pub idle_count: u32,
    pub total_count: u32,
}

impl SkuUsage {
    pub fn new(sku: MachineSku, idle_count: u32, total_count: u32) -> Self {
        Self {
            sku,
            idle_count,
            total_count,
        }
    }

    /// A snapshot can never report more idle executors than registered ones.
    pub fn is_consistent(&self) -> bool {
        self.idle_count <= self.total_count
    }
}

/// Point-in-time usage of a whole cluster, one entry per active SKU.
///
/// No ordering is implied by the cluster; the evaluator sorts by sku id
/// before applying rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterUsage {
    pub cluster_id: ClusterId,
    pub usages: Vec<SkuUsage>,
}

impl ClusterUsage {
    pub fn new(cluster_id: ClusterId, usages: Vec<SkuUsage>) -> Self {
        Self { cluster_id, usages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::machine::MachineDefinition;

    #[test]
    fn usage_consistency_check() {
        let sku = MachineSku::new("small", MachineDefinition::new(2.0, 2048, 700, 10240, 5));
        assert!(SkuUsage::new(sku.clone(), 4, 10).is_consistent());
        assert!(SkuUsage::new(sku.clone(), 10, 10).is_consistent());
        assert!(!SkuUsage::new(sku, 11, 10).is_consistent());
    }
}
