//! Machine classes (SKUs) and their hardware descriptors.

use serde::{Deserialize, Serialize};
use stratus_shared::SkuId;

/// Immutable hardware descriptor of a task-executor host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDefinition {
    pub cpu_cores: f64,
    pub memory_mb: u64,
    pub network_mbps: u64,
    pub disk_mb: u64,
    pub num_ports: u32,
}

impl MachineDefinition {
    pub fn new(
        cpu_cores: f64,
        memory_mb: u64,
        network_mbps: u64,
        disk_mb: u64,
        num_ports: u32,
    ) -> Self {
        Self {
            cpu_cores,
            memory_mb,
            network_mbps,
            disk_mb,
            num_ports,
        }
    }
}

/// A named machine class within a cluster.
///
/// The sku id is the key under which availability rules and usage snapshots
/// are correlated; the definition travels with idle-instance queries so the
/// cluster can identify the executor group being shrunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSku {
    pub sku_id: SkuId,
    pub definition: MachineDefinition,
}

impl MachineSku {
    pub fn new(sku_id: impl Into<SkuId>, definition: MachineDefinition) -> Self {
        Self {
            sku_id: sku_id.into(),
            definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_sku_accepts_plain_sku_strings() {
        let sku = MachineSku::new("small", MachineDefinition::new(2.0, 2048, 700, 10240, 5));
        assert_eq!(sku.sku_id, SkuId::new("small"));
        assert_eq!(sku.definition.num_ports, 5);
    }
}
