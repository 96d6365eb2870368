//! Hot-swappable set of availability rules.

use std::collections::BTreeMap;
use std::sync::Arc;
use stratus_shared::{ClusterId, SkuId};
use tracing::warn;

use super::clock::Clock;
use super::rule::AvailabilityRule;
use super::rule_store::ScaleRuleSnapshot;
use super::spec::ScaleSpec;

/// The rules currently in force for one cluster, keyed by SKU.
///
/// A rule set is built whole from a snapshot and installed atomically by the
/// controller; it is never merged in place. Rules for SKUs absent from the
/// new snapshot are discarded together with their cooldown state, so a SKU
/// removed and reintroduced starts fresh.
#[derive(Debug)]
pub struct RuleSet {
    cluster_id: ClusterId,
    rules: BTreeMap<SkuId, AvailabilityRule>,
}

impl RuleSet {
    pub fn empty(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            rules: BTreeMap::new(),
        }
    }

    /// Build a fresh rule set from a store snapshot.
    ///
    /// Specs that fail validation or belong to a different cluster are
    /// skipped with a warning rather than poisoning the whole set; the
    /// affected SKU yields no decisions until the store is corrected.
    pub fn from_snapshot(snapshot: ScaleRuleSnapshot, clock: Arc<dyn Clock>) -> Self {
        let cluster_id = snapshot.cluster_id;
        let mut rules = BTreeMap::new();

        for (sku_id, spec) in snapshot.rules {
            if spec.cluster_id != cluster_id {
                warn!(
                    sku_id = %sku_id,
                    expected = %cluster_id,
                    found = %spec.cluster_id,
                    "Scale spec belongs to a different cluster, skipping"
                );
                continue;
            }

            if let Err(error) = spec.validate() {
                warn!(sku_id = %sku_id, error = %error, "Invalid scale spec, skipping");
                continue;
            }

            rules.insert(sku_id, AvailabilityRule::new(spec, clock.clone()));
        }

        Self { cluster_id, rules }
    }

    pub fn cluster_id(&self) -> &ClusterId {
        &self.cluster_id
    }

    pub fn get_mut(&mut self, sku_id: &SkuId) -> Option<&mut AvailabilityRule> {
        self.rules.get_mut(sku_id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SkuId> {
        self.rules.keys()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Specs currently in force, for introspection.
    pub fn specs(&self) -> BTreeMap<SkuId, ScaleSpec> {
        self.rules
            .iter()
            .map(|(sku_id, rule)| (sku_id.clone(), rule.spec().clone()))
            .collect()
    }
}
