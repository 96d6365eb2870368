//! Request/reply types exchanged with the resource cluster and the host
//! provisioner.
//!
//! Every message carries the cluster id; replies whose cluster id does not
//! match the controller's are ignored.

use serde::{Deserialize, Serialize};
use stratus_shared::{ClusterId, InstanceId, SkuId};

use super::machine::MachineDefinition;

/// Ask the resource cluster for a point-in-time usage snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetClusterUsageRequest {
    pub cluster_id: ClusterId,
}

impl GetClusterUsageRequest {
    pub fn new(cluster_id: ClusterId) -> Self {
        Self { cluster_id }
    }
}

/// Ask the resource cluster which concrete executors of a SKU are idle and
/// may be terminated, bounded by `max_instance_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetIdleInstancesRequest {
    pub cluster_id: ClusterId,
    pub sku_id: SkuId,
    pub definition: MachineDefinition,
    pub desire_size: u32,
    pub max_instance_count: u32,
}

/// Reply to [`GetIdleInstancesRequest`].
///
/// `desire_size` is echoed back so the reply can be correlated to the
/// pending scale-down that triggered the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleInstancesResponse {
    pub cluster_id: ClusterId,
    pub sku_id: SkuId,
    pub desire_size: u32,
    pub instance_ids: Vec<InstanceId>,
}

/// Outbound scale order for the host provisioner.
///
/// `idle_instances` is present exactly when shrinking: it names the concrete
/// executors the provisioner should drain and terminate. The provisioner is
/// idempotent; the controller may resend after cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleResourceRequest {
    pub cluster_id: ClusterId,
    pub sku_id: SkuId,
    pub desire_size: u32,
    pub idle_instances: Option<Vec<InstanceId>>,
}

impl ScaleResourceRequest {
    /// Grow request: no instance list, the provisioner just adds hosts.
    pub fn scale_up(cluster_id: ClusterId, sku_id: SkuId, desire_size: u32) -> Self {
        Self {
            cluster_id,
            sku_id,
            desire_size,
            idle_instances: None,
        }
    }

    /// Shrink request naming the executors to retire.
    pub fn scale_down(
        cluster_id: ClusterId,
        sku_id: SkuId,
        desire_size: u32,
        idle_instances: Vec<InstanceId>,
    ) -> Self {
        Self {
            cluster_id,
            sku_id,
            desire_size,
            idle_instances: Some(idle_instances),
        }
    }
}
