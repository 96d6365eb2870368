//! Scaler counters.
//!
//! Fatal-free error handling means failures surface here and in the logs
//! rather than as propagated errors; a hosting process exports these however
//! it likes.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ScalerMetrics {
    sample_ticks: AtomicU64,
    usage_query_failures: AtomicU64,
    rule_refreshes: AtomicU64,
    rule_refresh_failures: AtomicU64,
    scale_ups_emitted: AtomicU64,
    scale_downs_emitted: AtomicU64,
    dispatch_failures: AtomicU64,
    dropped_idle_replies: AtomicU64,
    expired_pendings: AtomicU64,
}

impl ScalerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample_tick(&self) {
        self.sample_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_usage_query_failure(&self) {
        self.usage_query_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rule_refresh(&self) {
        self.rule_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rule_refresh_failure(&self) {
        self.rule_refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scale_up(&self) {
        self.scale_ups_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scale_down(&self) {
        self.scale_downs_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_idle_reply(&self) {
        self.dropped_idle_replies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired_pendings(&self, count: u64) {
        self.expired_pendings.fetch_add(count, Ordering::Relaxed);
    }

    pub fn sample_ticks(&self) -> u64 {
        self.sample_ticks.load(Ordering::Relaxed)
    }

    pub fn usage_query_failures(&self) -> u64 {
        self.usage_query_failures.load(Ordering::Relaxed)
    }

    pub fn rule_refreshes(&self) -> u64 {
        self.rule_refreshes.load(Ordering::Relaxed)
    }

    pub fn rule_refresh_failures(&self) -> u64 {
        self.rule_refresh_failures.load(Ordering::Relaxed)
    }

    pub fn scale_ups_emitted(&self) -> u64 {
        self.scale_ups_emitted.load(Ordering::Relaxed)
    }

    pub fn scale_downs_emitted(&self) -> u64 {
        self.scale_downs_emitted.load(Ordering::Relaxed)
    }

    pub fn dispatch_failures(&self) -> u64 {
        self.dispatch_failures.load(Ordering::Relaxed)
    }

    pub fn dropped_idle_replies(&self) -> u64 {
        self.dropped_idle_replies.load(Ordering::Relaxed)
    }

    pub fn expired_pendings(&self) -> u64 {
        self.expired_pendings.load(Ordering::Relaxed)
    }
}
