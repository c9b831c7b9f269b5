//! Cluster providers for the Kafka fleet
//!
//! A [`Provider`] drives the lifecycle of one data-plane cluster backend:
//! creating and deleting clusters, checking their status, pushing Kubernetes
//! resources, installing operators and configuring identity providers.
//!
//! Two backends exist:
//!
//! - [`OcmProvider`] talks to the cluster management service through
//!   [`ocm_client::ClusterManagementClient`].
//! - [`StandaloneProvider`] applies manifests directly to existing clusters
//!   reached through a kubeconfig context.
//!
//! [`ProviderFactory`] picks the provider matching a cluster's
//! [`fleet_types::ClusterProviderType`].
//!
//! # Example
//!
//! ```no_run
//! use cluster_providers::{
//!     AwsConfig, DataplaneClusterConfig, OcmConfig, ProviderFactory, RequestContext,
//! };
//! use fleet_types::{ClusterProviderType, ClusterSpec};
//! use ocm_client::{ClusterManagementClient, OcmClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ocm_config = OcmConfig::from_env();
//! let mut dataplane = DataplaneClusterConfig::from_env()?;
//! dataplane.read_files()?;
//!
//! let client: Arc<dyn ClusterManagementClient> =
//!     Arc::new(OcmClient::new(ocm_config.base_url.clone(), ocm_config.token.clone())?);
//! let factory = ProviderFactory::from_config(client, ocm_config, AwsConfig::from_env(), Arc::new(dataplane));
//!
//! let provider = factory.get_provider(ClusterProviderType::Ocm)?;
//! let ctx = RequestContext::with_timeout(Duration::from_secs(30));
//! let spec = provider.check_cluster_status(&ctx, &ClusterSpec::new("1234abcd")).await?;
//! println!("{:?}", spec.status);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod ocm;
pub mod provider;
pub mod standalone;

pub use builder::{ClusterBuilder, IdGenerator, PrefixedIdGenerator};
pub use config::{AwsConfig, ClusterConfig, DataplaneClusterConfig, OcmConfig, OperatorInstallationConfig, ScalingType};
pub use context::RequestContext;
pub use error::{ProviderError, Result};
pub use factory::ProviderFactory;
pub use ocm::OcmProvider;
pub use provider::{ManagedOperator, Provider};
pub use standalone::StandaloneProvider;
