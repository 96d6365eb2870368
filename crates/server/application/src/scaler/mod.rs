//! Cluster Scaler
//!
//! The outer control loop of the autoscaler. One actor per cluster owns the
//! rule set, the pending scale-down table and the two periodic timers, and
//! serializes all mutable state behind a FIFO mailbox.

pub mod actor;
pub mod dispatcher;
pub mod metrics;
pub mod resolver;

pub use actor::*;
pub use dispatcher::*;
pub use metrics::*;
pub use resolver::*;
