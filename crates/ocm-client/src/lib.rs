//! OpenShift Cluster Manager REST API Client
//!
//! A Rust client library for the cluster management service that provisions
//! and configures the managed OpenShift clusters hosting Kafka instances.
//!
//! # Example
//!
//! ```no_run
//! use ocm_client::{ClusterManagementClient, OcmClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OcmClient::new(
//!     "https://api.openshift.com".to_string(),
//!     "your-offline-token".to_string(),
//! )?;
//!
//! // Look up a cluster and its default ingress
//! let cluster = client.get_cluster("1234abcd").await?;
//! let ingresses = client.get_cluster_ingresses("1234abcd").await?;
//! let dns = ingresses.iter().find(|i| i.default).and_then(|i| i.dns_name.clone());
//! println!("{:?} is {:?} at {:?}", cluster.id, cluster.current_state(), dns);
//!
//! // Make sure an addon is installed
//! if client.get_addon("1234abcd", "managed-kafka").await?.is_none() {
//!     client.create_addon_with_params("1234abcd", "managed-kafka", &[]).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Clusters**: create, inspect, delete, scale compute nodes
//! - **Addons**: install and reconfigure addon installations
//! - **Syncsets**: push raw Kubernetes resources onto a cluster
//! - **Identity providers**: configure OpenID login
//! - **Mocking**: an in-memory client behind the `test-util` feature

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod ocm_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::OcmClient;
pub use common::HttpClient;
pub use error::OcmError;
pub use models::*;
pub use ocm_trait::ClusterManagementClient;
#[cfg(feature = "test-util")]
pub use mock::{MockFailure, MockOcmClient};
