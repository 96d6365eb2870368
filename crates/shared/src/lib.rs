//! Shared kernel for the Stratus autoscaling control plane.
//!
//! This crate holds the identifier newtypes and the configuration system
//! used across the server crates. It deliberately has no async or I/O
//! dependencies beyond `.env` loading.

pub mod config;
pub mod ids;

pub use ids::{ClusterId, InstanceId, SkuId};
