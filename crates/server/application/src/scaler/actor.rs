//! Cluster Scaler Actor
//!
//! Implements the Actor Model pattern for the autoscaling control loop: one
//! task per cluster owns the rule set, the pending scale-down table and the
//! cooldown clocks, processing a FIFO mailbox so no mutable state is ever
//! shared.
//!
//! The actor never blocks on I/O. Usage samples, idle-instance lookups and
//! rule-store fetches are spawned with a deadline and pipe their outcome
//! back into the mailbox as ordinary messages; timer ticks arrive on the
//! same queue. A usage sample already in flight suppresses the next tick so
//! work cannot stack unboundedly.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use stratus_server_domain::cluster::{
    ClusterUsage, GetClusterUsageRequest, GetIdleInstancesRequest, HostProvisioner,
    IdleInstancesResponse, ResourceClusterGateway, ScaleResourceRequest,
};
use stratus_server_domain::scaling::{
    Clock, RuleSet, ScaleDecision, ScaleRuleSnapshot, ScaleRuleStore, ScaleSpec, ScaleType,
    SystemClock, UsageEvaluator,
};
use stratus_server_domain::shared_kernel::DomainError;
use stratus_shared::config::ScalerConfigDto;
use stratus_shared::{ClusterId, SkuId};

use super::dispatcher::Dispatcher;
use super::metrics::ScalerMetrics;
use super::resolver::PendingScaleDowns;

const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Errors from handle operations against the scaler actor.
#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("Scaler inbox closed")]
    InboxClosed,

    #[error("Scaler reply lost")]
    ResponseLost,
}

impl From<ScalerError> for DomainError {
    fn from(err: ScalerError) -> Self {
        DomainError::InfrastructureError {
            message: err.to_string(),
        }
    }
}

/// Runtime configuration of one scaler actor.
#[derive(Debug, Clone)]
pub struct ScalerConfig {
    pub cluster_id: ClusterId,
    pub sample_interval: Duration,
    pub refresh_interval: Duration,
    pub mailbox_capacity: usize,
}

impl ScalerConfig {
    pub fn new(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }

    pub fn from_dto(dto: &ScalerConfigDto) -> Self {
        Self::new(ClusterId::new(dto.cluster_id.clone()))
            .with_sample_interval(dto.sample_interval())
            .with_refresh_interval(dto.refresh_interval())
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// How long a pending scale-down may wait for its idle reply.
    fn pending_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.sample_interval * 2)
            .unwrap_or_else(|_| chrono::Duration::seconds(120))
    }
}

/// Protocol messages for the scaler actor.
#[derive(Debug)]
pub enum ScalerMsg {
    /// Usage snapshot arrived from the resource cluster.
    UsageReport(ClusterUsage),

    /// The usage query failed or timed out; the tick is abandoned.
    UsageUnavailable { error: String },

    /// Idle-instance reply arrived from the resource cluster.
    IdleReport(IdleInstancesResponse),

    /// An idle-instance query failed or timed out.
    IdleUnavailable {
        sku_id: SkuId,
        desire_size: u32,
        error: String,
    },

    /// A fresh rule snapshot arrived from the store.
    RulesLoaded(ScaleRuleSnapshot),

    /// The rule-store fetch failed; the previous rule set stays in force.
    RulesUnavailable { error: String },

    /// Introspection: specs currently in force.
    GetRuleSet {
        reply_to: oneshot::Sender<BTreeMap<SkuId, ScaleSpec>>,
    },

    /// Graceful shutdown.
    Shutdown { reply_to: oneshot::Sender<()> },
}

/// The scaler actor. Single owner of all mutable scaling state for one
/// cluster.
pub struct ClusterScaler {
    config: ScalerConfig,
    inbox: mpsc::Receiver<ScalerMsg>,
    self_tx: mpsc::Sender<ScalerMsg>,
    shutdown: watch::Receiver<()>,
    rule_store: Arc<dyn ScaleRuleStore>,
    cluster: Arc<dyn ResourceClusterGateway>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    evaluator: UsageEvaluator,
    rule_set: RuleSet,
    pendings: PendingScaleDowns,
    usage_in_flight: bool,
    metrics: Arc<ScalerMetrics>,
}

impl ClusterScaler {
    /// Run the actor loop until shutdown.
    ///
    /// The first rule fetch happens before any timer is armed; the sample
    /// timer then fires immediately, so a freshly booted scaler asks for
    /// usage right away.
    pub async fn run(mut self) {
        info!(cluster_id = %self.config.cluster_id, "Starting cluster scaler");

        self.load_initial_rules().await;

        let mut sample_timer = interval(self.config.sample_interval);
        sample_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut refresh_timer = interval(self.config.refresh_interval);
        refresh_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Rules were just loaded; push the first periodic refresh out by a
        // full period instead of refetching immediately.
        refresh_timer.reset();

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    info!("Cluster scaler: shutdown signal received");
                    break;
                }
                _ = sample_timer.tick() => {
                    self.handle_sample_tick();
                }
                _ = refresh_timer.tick() => {
                    self.handle_refresh_tick();
                }
                msg = self.inbox.recv() => {
                    match msg {
                        Some(msg) => {
                            if !self.handle_message(msg) {
                                break;
                            }
                        }
                        None => {
                            info!("Cluster scaler: inbox closed");
                            break;
                        }
                    }
                }
            }
        }

        info!(
            cluster_id = %self.config.cluster_id,
            discarded_pendings = self.pendings.len(),
            "Cluster scaler stopped"
        );
    }

    /// Handle one mailbox message; returns false to stop the loop.
    fn handle_message(&mut self, msg: ScalerMsg) -> bool {
        match msg {
            ScalerMsg::UsageReport(usage) => {
                self.handle_usage_report(usage);
            }

            ScalerMsg::UsageUnavailable { error } => {
                self.usage_in_flight = false;
                self.metrics.record_usage_query_failure();
                warn!(error = %error, "Usage query failed, skipping tick");
            }

            ScalerMsg::IdleReport(response) => {
                self.handle_idle_report(response);
            }

            ScalerMsg::IdleUnavailable {
                sku_id,
                desire_size,
                error,
            } => {
                // Drop the pending entry now rather than waiting for the
                // sweep; the next in-band snapshot re-decides after cooldown.
                let _ = self.pendings.resolve(&sku_id, desire_size);
                warn!(sku_id = %sku_id, error = %error, "Idle-instance query failed");
            }

            ScalerMsg::RulesLoaded(snapshot) => {
                self.install_rules(snapshot);
            }

            ScalerMsg::RulesUnavailable { error } => {
                self.metrics.record_rule_refresh_failure();
                warn!(error = %error, "Rule refresh failed, keeping previous rule set");
            }

            ScalerMsg::GetRuleSet { reply_to } => {
                let _ = reply_to.send(self.rule_set.specs());
            }

            ScalerMsg::Shutdown { reply_to } => {
                let _ = reply_to.send(());
                return false;
            }
        }

        true
    }

    async fn load_initial_rules(&mut self) {
        match self
            .rule_store
            .get_scale_rules(&self.config.cluster_id)
            .await
        {
            Ok(snapshot) => self.install_rules(snapshot),
            Err(err) => {
                self.metrics.record_rule_refresh_failure();
                error!(
                    error = %err,
                    "Initial rule fetch failed, starting with an empty rule set"
                );
            }
        }
    }

    fn install_rules(&mut self, snapshot: ScaleRuleSnapshot) {
        if snapshot.cluster_id != self.config.cluster_id {
            warn!(
                cluster_id = %snapshot.cluster_id,
                "Rule snapshot for another cluster, ignoring"
            );
            return;
        }

        let rule_set = RuleSet::from_snapshot(snapshot, self.clock.clone());
        info!(rules = rule_set.len(), "Installed rule set");
        self.metrics.record_rule_refresh();
        self.rule_set = rule_set;
    }

    fn handle_sample_tick(&mut self) {
        self.metrics.record_sample_tick();

        let expired = self.pendings.sweep_expired(self.clock.now());
        if expired > 0 {
            debug!(expired, "Swept expired pending scale-downs");
            self.metrics.record_expired_pendings(expired as u64);
        }

        if self.usage_in_flight {
            debug!("Previous usage query still in flight, skipping sample");
            return;
        }
        self.usage_in_flight = true;

        let request = GetClusterUsageRequest::new(self.config.cluster_id.clone());
        let gateway = self.cluster.clone();
        let tx = self.self_tx.clone();
        let deadline = self.config.sample_interval;

        tokio::spawn(async move {
            let outcome = match timeout(deadline, gateway.get_cluster_usage(request)).await {
                Ok(Ok(usage)) => ScalerMsg::UsageReport(usage),
                Ok(Err(err)) => ScalerMsg::UsageUnavailable {
                    error: err.to_string(),
                },
                Err(_) => ScalerMsg::UsageUnavailable {
                    error: format!("usage query timed out after {:?}", deadline),
                },
            };
            let _ = tx.send(outcome).await;
        });
    }

    fn handle_refresh_tick(&self) {
        let store = self.rule_store.clone();
        let cluster_id = self.config.cluster_id.clone();
        let tx = self.self_tx.clone();
        let deadline = self.config.refresh_interval;

        tokio::spawn(async move {
            let outcome = match timeout(deadline, store.get_scale_rules(&cluster_id)).await {
                Ok(Ok(snapshot)) => ScalerMsg::RulesLoaded(snapshot),
                Ok(Err(err)) => ScalerMsg::RulesUnavailable {
                    error: err.to_string(),
                },
                Err(_) => ScalerMsg::RulesUnavailable {
                    error: format!("rule fetch timed out after {:?}", deadline),
                },
            };
            let _ = tx.send(outcome).await;
        });
    }

    fn handle_usage_report(&mut self, usage: ClusterUsage) {
        self.usage_in_flight = false;

        if usage.cluster_id != self.config.cluster_id {
            debug!(cluster_id = %usage.cluster_id, "Usage reply for another cluster, ignoring");
            return;
        }

        let decisions = self.evaluator.evaluate(&mut self.rule_set, &usage);
        debug!(decisions = decisions.len(), "Usage snapshot evaluated");

        for decision in decisions {
            match decision.scale_type {
                ScaleType::ScaleUp => {
                    self.metrics.record_scale_up();
                    let request = Dispatcher::request_for(&decision, None);
                    let _ = self.dispatcher.dispatch(request);
                }
                ScaleType::ScaleDown => {
                    self.start_idle_resolution(&usage, decision);
                }
            }
        }
    }

    /// Stage two of a scale-down: ask the cluster which executors may go.
    fn start_idle_resolution(&mut self, usage: &ClusterUsage, decision: ScaleDecision) {
        let Some(sku_usage) = usage
            .usages
            .iter()
            .find(|u| u.sku.sku_id == decision.sku_id)
        else {
            // The decision came out of this very snapshot.
            return;
        };

        let max_instance_count = sku_usage.total_count.saturating_sub(decision.desire_size);
        if max_instance_count == 0 {
            debug!(
                sku_id = %decision.sku_id,
                desire_size = decision.desire_size,
                total_count = sku_usage.total_count,
                "Scale-down would terminate nothing, skipping idle query"
            );
            return;
        }

        self.metrics.record_scale_down();
        self.pendings
            .track(decision.sku_id.clone(), decision.desire_size, self.clock.now());

        let request = GetIdleInstancesRequest {
            cluster_id: decision.cluster_id.clone(),
            sku_id: decision.sku_id.clone(),
            definition: sku_usage.sku.definition.clone(),
            desire_size: decision.desire_size,
            max_instance_count,
        };

        let gateway = self.cluster.clone();
        let tx = self.self_tx.clone();
        let deadline = self.config.sample_interval;
        let sku_id = decision.sku_id;
        let desire_size = decision.desire_size;

        tokio::spawn(async move {
            let outcome = match timeout(deadline, gateway.get_idle_instances(request)).await {
                Ok(Ok(response)) => ScalerMsg::IdleReport(response),
                Ok(Err(err)) => ScalerMsg::IdleUnavailable {
                    sku_id,
                    desire_size,
                    error: err.to_string(),
                },
                Err(_) => ScalerMsg::IdleUnavailable {
                    sku_id,
                    desire_size,
                    error: format!("idle query timed out after {:?}", deadline),
                },
            };
            let _ = tx.send(outcome).await;
        });
    }

    fn handle_idle_report(&mut self, response: IdleInstancesResponse) {
        if response.cluster_id != self.config.cluster_id {
            debug!(cluster_id = %response.cluster_id, "Idle reply for another cluster, ignoring");
            self.metrics.record_dropped_idle_reply();
            return;
        }

        match self.pendings.resolve(&response.sku_id, response.desire_size) {
            Some(_) => {
                let request = ScaleResourceRequest::scale_down(
                    response.cluster_id,
                    response.sku_id,
                    response.desire_size,
                    response.instance_ids,
                );
                let _ = self.dispatcher.dispatch(request);
            }
            None => {
                debug!(
                    sku_id = %response.sku_id,
                    desire_size = response.desire_size,
                    "Idle reply without a pending scale-down, dropping"
                );
                self.metrics.record_dropped_idle_reply();
            }
        }
    }
}

/// Handle for communicating with a running scaler actor.
#[derive(Clone)]
pub struct ClusterScalerHandle {
    tx: mpsc::Sender<ScalerMsg>,
}

impl ClusterScalerHandle {
    pub fn new(tx: mpsc::Sender<ScalerMsg>) -> Self {
        Self { tx }
    }

    /// Introspection: the specs currently in force.
    pub async fn get_rule_set(&self) -> Result<BTreeMap<SkuId, ScaleSpec>, ScalerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(ScalerMsg::GetRuleSet { reply_to: reply_tx })
            .await
            .map_err(|_| ScalerError::InboxClosed)?;

        reply_rx.await.map_err(|_| ScalerError::ResponseLost)
    }

    /// Stop the actor; pending scale-downs are discarded.
    pub async fn shutdown(&self) -> Result<(), ScalerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(ScalerMsg::Shutdown { reply_to: reply_tx })
            .await
            .map_err(|_| ScalerError::InboxClosed)?;

        reply_rx.await.map_err(|_| ScalerError::ResponseLost)
    }
}

/// Builder wiring the actor to its collaborators.
pub struct ClusterScalerBuilder {
    config: ScalerConfig,
    rule_store: Arc<dyn ScaleRuleStore>,
    cluster: Arc<dyn ResourceClusterGateway>,
    provisioner: Arc<dyn HostProvisioner>,
    clock: Arc<dyn Clock>,
    metrics: Arc<ScalerMetrics>,
}

impl ClusterScalerBuilder {
    pub fn new(
        config: ScalerConfig,
        rule_store: Arc<dyn ScaleRuleStore>,
        cluster: Arc<dyn ResourceClusterGateway>,
        provisioner: Arc<dyn HostProvisioner>,
    ) -> Self {
        Self {
            config,
            rule_store,
            cluster,
            provisioner,
            clock: Arc::new(SystemClock),
            metrics: Arc::new(ScalerMetrics::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ScalerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Assemble the actor. Returns the handle, the actor to spawn, and the
    /// shutdown signal sender.
    pub fn build(self) -> (ClusterScalerHandle, ClusterScaler, watch::Sender<()>) {
        let (tx, inbox) = mpsc::channel(self.config.mailbox_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let pending_ttl = self.config.pending_ttl();
        let cluster_id = self.config.cluster_id.clone();

        let scaler = ClusterScaler {
            config: self.config,
            inbox,
            self_tx: tx.clone(),
            shutdown: shutdown_rx,
            rule_store: self.rule_store,
            cluster: self.cluster,
            dispatcher: Dispatcher::new(self.provisioner, self.metrics.clone()),
            clock: self.clock,
            evaluator: UsageEvaluator::new(),
            rule_set: RuleSet::empty(cluster_id),
            pendings: PendingScaleDowns::new(pending_ttl),
            usage_in_flight: false,
            metrics: self.metrics,
        };

        (ClusterScalerHandle::new(tx), scaler, shutdown_tx)
    }
}
