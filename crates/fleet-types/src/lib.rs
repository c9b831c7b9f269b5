//! Fleet data model
//!
//! Plain data shared by the cluster providers and their callers: cluster
//! requests and specs, identity providers, cloud regions, machine pools,
//! manual catalog entries and the data-plane capacity report.

pub mod capacity;
pub mod cloud;
pub mod cluster;
pub mod identity;
pub mod machine_pool;
pub mod manual_cluster;

pub use cloud::*;
pub use cluster::*;
pub use identity::*;
pub use machine_pool::*;
pub use manual_cluster::*;
