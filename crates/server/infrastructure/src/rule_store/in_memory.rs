//! In-memory rule store.
//!
//! Backend for development and tests: snapshots are swapped whole under a
//! lock, and the store can be flipped to unavailable to exercise the
//! controller's keep-previous-rules path.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::debug;

use stratus_server_domain::scaling::{ScaleRuleSnapshot, ScaleRuleStore, ScaleSpec};
use stratus_server_domain::shared_kernel::{DomainError, Result};
use stratus_shared::{ClusterId, SkuId};

#[derive(Debug, Default)]
pub struct InMemoryScaleRuleStore {
    rules: RwLock<HashMap<ClusterId, BTreeMap<SkuId, ScaleSpec>>>,
    unavailable: AtomicBool,
}

impl InMemoryScaleRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one spec, keyed by its own cluster and sku ids.
    pub fn put_rule(&self, spec: ScaleSpec) {
        let mut rules = self.rules.write().unwrap();
        rules
            .entry(spec.cluster_id.clone())
            .or_default()
            .insert(spec.sku_id.clone(), spec);
    }

    /// Replace every rule of a cluster with the given snapshot.
    pub fn replace_cluster_rules(&self, snapshot: ScaleRuleSnapshot) {
        let mut rules = self.rules.write().unwrap();
        rules.insert(snapshot.cluster_id, snapshot.rules);
    }

    /// Simulate a store outage; fetches fail until flipped back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScaleRuleStore for InMemoryScaleRuleStore {
    async fn get_scale_rules(&self, cluster_id: &ClusterId) -> Result<ScaleRuleSnapshot> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::RuleStoreUnavailable {
                cluster_id: cluster_id.clone(),
                message: "in-memory store marked unavailable".to_string(),
            });
        }

        let rules = self.rules.read().unwrap();
        let cluster_rules = rules.get(cluster_id).cloned().unwrap_or_default();
        debug!(cluster_id = %cluster_id, rules = cluster_rules.len(), "Serving rule snapshot");

        Ok(ScaleRuleSnapshot {
            cluster_id: cluster_id.clone(),
            rules: cluster_rules,
        })
    }
}
