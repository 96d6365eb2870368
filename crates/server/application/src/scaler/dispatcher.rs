//! Scale-request dispatch.
//!
//! Converts ready decisions into provisioner orders. Dispatch is
//! fire-and-forget from the control loop's point of view: the provisioner's
//! acknowledgement is never awaited by the actor, and a failed dispatch only
//! leaves a log line and a counter behind (the cooldown already recorded by
//! the rule stands; the next action retries from a fresh snapshot).

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use stratus_server_domain::cluster::{HostProvisioner, ScaleResourceRequest};
use stratus_server_domain::scaling::{ScaleDecision, ScaleType};
use stratus_shared::InstanceId;

use super::metrics::ScalerMetrics;

#[derive(Clone)]
pub struct Dispatcher {
    provisioner: Arc<dyn HostProvisioner>,
    metrics: Arc<ScalerMetrics>,
}

impl Dispatcher {
    pub fn new(provisioner: Arc<dyn HostProvisioner>, metrics: Arc<ScalerMetrics>) -> Self {
        Self {
            provisioner,
            metrics,
        }
    }

    /// Map a decision (plus the resolved idle list for shrink operations)
    /// onto the provisioner request shape.
    pub fn request_for(
        decision: &ScaleDecision,
        idle_instances: Option<Vec<InstanceId>>,
    ) -> ScaleResourceRequest {
        match decision.scale_type {
            ScaleType::ScaleUp => ScaleResourceRequest::scale_up(
                decision.cluster_id.clone(),
                decision.sku_id.clone(),
                decision.desire_size,
            ),
            ScaleType::ScaleDown => ScaleResourceRequest::scale_down(
                decision.cluster_id.clone(),
                decision.sku_id.clone(),
                decision.desire_size,
                idle_instances.unwrap_or_default(),
            ),
        }
    }

    /// Send a request to the provisioner in the background.
    pub fn dispatch(&self, request: ScaleResourceRequest) -> JoinHandle<()> {
        let provisioner = self.provisioner.clone();
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            info!(
                cluster_id = %request.cluster_id,
                sku_id = %request.sku_id,
                desire_size = request.desire_size,
                idle_instances = request.idle_instances.as_ref().map(Vec::len),
                "Dispatching scale request"
            );

            if let Err(error) = provisioner.scale(request).await {
                warn!(error = %error, "Scale dispatch failed");
                metrics.record_dispatch_failure();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use stratus_server_domain::shared_kernel::{DomainError, Result};
    use stratus_shared::{ClusterId, SkuId};

    #[derive(Debug, Default)]
    struct RecordingProvisioner {
        requests: Mutex<Vec<ScaleResourceRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl HostProvisioner for RecordingProvisioner {
        async fn scale(&self, request: ScaleResourceRequest) -> Result<()> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(DomainError::DispatchFailed {
                    cluster_id: request.cluster_id,
                    message: "provisioner unreachable".to_string(),
                });
            }
            Ok(())
        }
    }

    fn decision(scale_type: ScaleType, size: u32) -> ScaleDecision {
        ScaleDecision {
            cluster_id: ClusterId::new("cluster"),
            sku_id: SkuId::new("large"),
            scale_type,
            desire_size: size,
            min_size: size,
            max_size: size,
        }
    }

    #[test]
    fn scale_up_maps_without_instances() {
        let request = Dispatcher::request_for(&decision(ScaleType::ScaleUp, 11), None);
        assert_eq!(request.desire_size, 11);
        assert!(request.idle_instances.is_none());
    }

    #[test]
    fn scale_down_maps_with_instances() {
        let request = Dispatcher::request_for(
            &decision(ScaleType::ScaleDown, 15),
            Some(vec![InstanceId::new("agent1")]),
        );
        assert_eq!(
            request.idle_instances,
            Some(vec![InstanceId::new("agent1")])
        );
    }

    #[tokio::test]
    async fn dispatch_reaches_the_provisioner() {
        let provisioner = Arc::new(RecordingProvisioner::default());
        let dispatcher = Dispatcher::new(provisioner.clone(), Arc::new(ScalerMetrics::new()));

        let request = Dispatcher::request_for(&decision(ScaleType::ScaleUp, 11), None);
        dispatcher.dispatch(request).await.unwrap();

        assert_eq!(provisioner.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dispatch_failure_is_counted_not_raised() {
        let provisioner = Arc::new(RecordingProvisioner {
            requests: Mutex::new(Vec::new()),
            fail: true,
        });
        let metrics = Arc::new(ScalerMetrics::new());
        let dispatcher = Dispatcher::new(provisioner, metrics.clone());

        let request = Dispatcher::request_for(&decision(ScaleType::ScaleDown, 15), Some(vec![]));
        dispatcher.dispatch(request).await.unwrap();

        assert_eq!(metrics.dispatch_failures(), 1);
    }
}
