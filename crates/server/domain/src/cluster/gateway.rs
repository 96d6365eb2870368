//! Ports to the external collaborators.
//!
//! The domain defines what it needs and the hosting process provides the
//! implementations (gRPC clients, in-process actors, test doubles). Both
//! services are treated as idempotent request/reply endpoints; the
//! controller never holds locks or long-lived handles on their state.

use async_trait::async_trait;

use crate::shared_kernel::Result;

use super::protocol::{
    GetClusterUsageRequest, GetIdleInstancesRequest, IdleInstancesResponse, ScaleResourceRequest,
};
use super::usage::ClusterUsage;

/// Read side of the resource cluster: usage snapshots and idle-instance
/// lookups.
#[async_trait]
pub trait ResourceClusterGateway: Send + Sync {
    /// Fetch the current usage snapshot for the cluster.
    async fn get_cluster_usage(&self, request: GetClusterUsageRequest) -> Result<ClusterUsage>;

    /// Resolve which concrete executors of a SKU are idle and eligible for
    /// shutdown, bounded by `request.max_instance_count`.
    async fn get_idle_instances(
        &self,
        request: GetIdleInstancesRequest,
    ) -> Result<IdleInstancesResponse>;
}

/// Write side: the host provisioner actuates scale orders against the
/// underlying fleet.
#[async_trait]
pub trait HostProvisioner: Send + Sync {
    /// Apply a scale order. Idempotent at the provisioner.
    async fn scale(&self, request: ScaleResourceRequest) -> Result<()>;
}
