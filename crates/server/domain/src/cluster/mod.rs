//! Resource Cluster Bounded Context
//!
//! Machine classes, usage snapshots, and the request/reply protocol spoken
//! with the resource cluster and the host provisioner.

pub mod gateway;
pub mod machine;
pub mod protocol;
pub mod usage;

pub use gateway::*;
pub use machine::*;
pub use protocol::*;
pub use usage::*;
