//! Pending scale-down tracking.
//!
//! A scale-down decision is a two-stage protocol: decide, then ask the
//! cluster which concrete executors are idle, then dispatch. Between the
//! query and its reply the decision sits in this table; the late reply is
//! correlated back by `(sku_id, desire_size)`. One table per actor, one
//! actor per cluster, so the cluster id is checked at the mailbox before
//! anything reaches this table.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use stratus_shared::SkuId;

/// A scale-down decision waiting for its idle-instance reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingScaleDown {
    pub sku_id: SkuId,
    pub desire_size: u32,
    pub created_at: DateTime<Utc>,
}

/// Bounded-lifetime table of pending scale-downs.
#[derive(Debug)]
pub struct PendingScaleDowns {
    entries: HashMap<(SkuId, u32), PendingScaleDown>,
    ttl: Duration,
}

impl PendingScaleDowns {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Record a decision awaiting idle resolution. A decision with the same
    /// key replaces the previous one (the newer snapshot wins).
    pub fn track(&mut self, sku_id: SkuId, desire_size: u32, now: DateTime<Utc>) {
        self.entries.insert(
            (sku_id.clone(), desire_size),
            PendingScaleDown {
                sku_id,
                desire_size,
                created_at: now,
            },
        );
    }

    /// Match an idle-instance reply to a pending decision, removing it.
    pub fn resolve(&mut self, sku_id: &SkuId, desire_size: u32) -> Option<PendingScaleDown> {
        self.entries.remove(&(sku_id.clone(), desire_size))
    }

    /// Drop entries older than the table's TTL; returns how many went.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, pending| now.signed_duration_since(pending.created_at) <= ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PendingScaleDowns {
        PendingScaleDowns::new(Duration::seconds(2))
    }

    #[test]
    fn replies_resolve_tracked_decisions_once() {
        let mut pendings = table();
        let now = Utc::now();
        pendings.track(SkuId::new("large"), 15, now);

        let resolved = pendings.resolve(&SkuId::new("large"), 15).unwrap();
        assert_eq!(resolved.desire_size, 15);
        assert!(pendings.resolve(&SkuId::new("large"), 15).is_none());
    }

    #[test]
    fn unmatched_replies_resolve_to_nothing() {
        let mut pendings = table();
        pendings.track(SkuId::new("large"), 15, Utc::now());

        assert!(pendings.resolve(&SkuId::new("large"), 14).is_none());
        assert!(pendings.resolve(&SkuId::new("small"), 15).is_none());
        assert_eq!(pendings.len(), 1);
    }

    #[test]
    fn sweep_drops_only_expired_entries() {
        let mut pendings = table();
        let now = Utc::now();
        pendings.track(SkuId::new("large"), 15, now - Duration::seconds(5));
        pendings.track(SkuId::new("small"), 11, now);

        assert_eq!(pendings.sweep_expired(now), 1);
        assert_eq!(pendings.len(), 1);
        assert!(pendings.resolve(&SkuId::new("small"), 11).is_some());
    }

    #[test]
    fn retrack_replaces_the_stale_entry() {
        let mut pendings = table();
        let old = Utc::now() - Duration::seconds(5);
        let now = Utc::now();
        pendings.track(SkuId::new("large"), 15, old);
        pendings.track(SkuId::new("large"), 15, now);

        assert_eq!(pendings.sweep_expired(now), 0);
        assert_eq!(pendings.resolve(&SkuId::new("large"), 15).unwrap().created_at, now);
    }
}
