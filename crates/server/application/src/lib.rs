//! Application layer for the Stratus autoscaling control plane.
//!
//! Hosts the `ClusterScaler` actor: one single-threaded control loop per
//! resource cluster, driving usage evaluation, idle-instance resolution and
//! scale dispatch.

pub mod scaler;
