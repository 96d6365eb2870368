//! Usage evaluator.
//!
//! Applies the current rule set to a cluster usage snapshot and collects the
//! resulting decisions. The only side effect is the cooldown state mutated
//! inside the rules themselves.

use tracing::{debug, warn};

use crate::cluster::ClusterUsage;

use super::rule::ScaleDecision;
use super::rule_set::RuleSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct UsageEvaluator;

impl UsageEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a usage snapshot against the rule set.
    ///
    /// SKUs are visited in ascending id order so the decision sequence is
    /// deterministic regardless of how the cluster ordered its reply.
    /// Unmanaged SKUs are skipped; inconsistent entries (`idle > total`) are
    /// dropped with a warning and do not affect the other SKUs.
    pub fn evaluate(&self, rule_set: &mut RuleSet, usage: &ClusterUsage) -> Vec<ScaleDecision> {
        let mut sku_usages: Vec<_> = usage.usages.iter().collect();
        sku_usages.sort_by(|a, b| a.sku.sku_id.cmp(&b.sku.sku_id));

        let mut decisions = Vec::new();

        for sku_usage in sku_usages {
            let sku_id = &sku_usage.sku.sku_id;

            if !sku_usage.is_consistent() {
                warn!(
                    sku_id = %sku_id,
                    idle_count = sku_usage.idle_count,
                    total_count = sku_usage.total_count,
                    "Dropping inconsistent usage entry"
                );
                continue;
            }

            let Some(rule) = rule_set.get_mut(sku_id) else {
                debug!(sku_id = %sku_id, "No rule for SKU, skipping");
                continue;
            };

            if let Some(decision) = rule.apply(sku_usage) {
                decisions.push(decision);
            }
        }

        decisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{MachineDefinition, MachineSku, SkuUsage};
    use crate::scaling::clock::FixedClock;
    use crate::scaling::rule::ScaleType;
    use crate::scaling::rule_store::ScaleRuleSnapshot;
    use crate::scaling::spec::ScaleSpec;
    use chrono::Utc;
    use std::sync::Arc;
    use stratus_shared::{ClusterId, SkuId};

    fn spec(sku: &str, max_idle_to_keep: u32) -> ScaleSpec {
        ScaleSpec {
            cluster_id: ClusterId::new("cluster"),
            sku_id: SkuId::new(sku),
            min_size: 11,
            max_size: 15,
            min_idle_to_keep: 5,
            max_idle_to_keep,
            cool_down_secs: 10,
        }
    }

    fn sku_usage(sku: &str, idle: u32, total: u32) -> SkuUsage {
        SkuUsage::new(
            MachineSku::new(sku, MachineDefinition::new(2.0, 2048, 700, 10240, 5)),
            idle,
            total,
        )
    }

    fn rule_set_of(specs: Vec<ScaleSpec>) -> RuleSet {
        let mut snapshot = ScaleRuleSnapshot::empty(ClusterId::new("cluster"));
        for s in specs {
            snapshot = snapshot.with_rule(s);
        }
        RuleSet::from_snapshot(snapshot, Arc::new(FixedClock::at(Utc::now())))
    }

    #[test]
    fn decisions_come_out_in_sku_order() {
        let mut rule_set = rule_set_of(vec![spec("small", 10), spec("large", 15)]);
        // Reply deliberately ordered small-then-large; output must be
        // large-then-small (lexicographic).
        let usage = ClusterUsage::new(
            ClusterId::new("cluster"),
            vec![sku_usage("small", 4, 10), sku_usage("large", 16, 16)],
        );

        let decisions = UsageEvaluator::new().evaluate(&mut rule_set, &usage);

        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].sku_id, SkuId::new("large"));
        assert_eq!(decisions[0].scale_type, ScaleType::ScaleDown);
        assert_eq!(decisions[0].desire_size, 15);
        assert_eq!(decisions[1].sku_id, SkuId::new("small"));
        assert_eq!(decisions[1].scale_type, ScaleType::ScaleUp);
        assert_eq!(decisions[1].desire_size, 11);
    }

    #[test]
    fn unmanaged_skus_are_skipped() {
        let mut rule_set = rule_set_of(vec![spec("small", 10)]);
        let usage = ClusterUsage::new(
            ClusterId::new("cluster"),
            vec![sku_usage("small", 4, 10), sku_usage("medium", 0, 15)],
        );

        let decisions = UsageEvaluator::new().evaluate(&mut rule_set, &usage);

        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].sku_id, SkuId::new("small"));
    }

    #[test]
    fn inconsistent_entries_do_not_poison_the_pass() {
        let mut rule_set = rule_set_of(vec![spec("small", 10), spec("large", 10)]);
        let usage = ClusterUsage::new(
            ClusterId::new("cluster"),
            vec![sku_usage("large", 30, 16), sku_usage("small", 4, 10)],
        );

        let decisions = UsageEvaluator::new().evaluate(&mut rule_set, &usage);

        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].sku_id, SkuId::new("small"));
    }

    #[test]
    fn in_band_skus_yield_nothing() {
        let mut rule_set = rule_set_of(vec![spec("small", 10)]);
        let usage = ClusterUsage::new(
            ClusterId::new("cluster"),
            vec![sku_usage("small", 8, 15)],
        );

        assert!(UsageEvaluator::new()
            .evaluate(&mut rule_set, &usage)
            .is_empty());
    }
}
