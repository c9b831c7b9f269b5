//! Provider for existing clusters reached through a kubeconfig context
//!
//! Standalone clusters are listed in the manual catalog and are never
//! created, scaled or deleted. The provider only applies manifests to them;
//! their nodes and machine pools are managed outside the fleet.

mod apply;
mod client;
mod manifests;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use apply::{apply_resource, canonical_json, prepare, should_apply, PreparedResource, LAST_APPLIED_ANNOTATION};
pub use client::{
    KubeResourceClient, KubeResourceClientFactory, ResolvedResource, ResourceClient, ResourceClientFactory,
    FIELD_MANAGER,
};
pub use manifests::OperatorManifests;

use crate::config::DataplaneClusterConfig;
use crate::context::RequestContext;
use crate::error::{ProviderError, Result};
use crate::provider::{ManagedOperator, Provider};
use fleet_types::{
    CloudProviderInfo, CloudProviderRegionInfo, ClusterProviderType, ClusterRequest, ClusterSpec, ClusterStatus,
    ComputeNodesInfo, IdentityProviderInfo, MachinePoolInfo, MachinePoolRequest, ManualCluster, Parameter,
    ResourceSet,
};
use std::sync::Arc;
use tracing::debug;

/// Provider for standalone clusters
#[derive(Clone)]
pub struct StandaloneProvider {
    config: Arc<DataplaneClusterConfig>,
    clients: Arc<dyn ResourceClientFactory>,
}

impl std::fmt::Debug for StandaloneProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandaloneProvider")
            .field("has_kubeconfig", &self.clients.has_kubeconfig())
            .finish_non_exhaustive()
    }
}

impl StandaloneProvider {
    /// Provider resolving clusters from `config` and reaching them through `clients`
    pub fn new(config: Arc<DataplaneClusterConfig>, clients: Arc<dyn ResourceClientFactory>) -> Self {
        Self { config, clients }
    }

    /// Provider using kube clients built from the loaded kubeconfig
    pub fn from_config(config: Arc<DataplaneClusterConfig>) -> Self {
        let clients = Arc::new(KubeResourceClientFactory::new(config.raw_kubeconfig.clone()));
        Self::new(config, clients)
    }

    /// Standalone catalog entries that are not being deleted
    fn active_clusters(&self) -> impl Iterator<Item = &ManualCluster> {
        self.config
            .cluster_config
            .manual_clusters()
            .iter()
            .filter(|c| c.provider_type == ClusterProviderType::Standalone && !c.status.is_deletion_status())
    }

    async fn apply(&self, spec: &ClusterSpec, resources: &[serde_json::Value]) -> Result<()> {
        let context = self
            .config
            .find_cluster_name_by_cluster_id(&spec.internal_id)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "no kubeconfig context known for standalone cluster {}",
                    spec.internal_id
                ))
            })?;
        let client = self.clients.client_for(&spec.internal_id, context).await?;
        for resource in resources {
            apply_resource(client.as_ref(), resource).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Provider for StandaloneProvider {
    async fn create(&self, _ctx: &RequestContext, _request: &ClusterRequest) -> Result<Option<ClusterSpec>> {
        Ok(None)
    }

    async fn delete(&self, _ctx: &RequestContext, _spec: &ClusterSpec) -> Result<bool> {
        Ok(true)
    }

    async fn check_cluster_status(&self, _ctx: &RequestContext, spec: &ClusterSpec) -> Result<ClusterSpec> {
        Ok(ClusterSpec {
            status: Some(ClusterStatus::Provisioned),
            ..spec.clone()
        })
    }

    async fn get_cluster_spec(&self, _ctx: &RequestContext, cluster_id: &str) -> Result<ClusterSpec> {
        let cluster = self
            .config
            .cluster_config
            .cluster(cluster_id)
            .filter(|c| c.provider_type == ClusterProviderType::Standalone)
            .ok_or_else(|| {
                ProviderError::InvalidArgument(format!("{} is not a standalone cluster of the catalog", cluster_id))
            })?;
        Ok(ClusterSpec {
            internal_id: cluster.cluster_id.clone(),
            external_id: cluster.cluster_id.clone(),
            status: Some(ClusterStatus::Provisioned),
            ..ClusterSpec::default()
        })
    }

    async fn get_cluster_dns(&self, _ctx: &RequestContext, spec: &ClusterSpec) -> Result<String> {
        Ok(self
            .config
            .cluster_config
            .cluster(&spec.internal_id)
            .map(|c| c.cluster_dns.clone())
            .unwrap_or_default())
    }

    async fn apply_resources(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        resources: ResourceSet,
    ) -> Result<ResourceSet> {
        if !self.clients.has_kubeconfig() {
            debug!(cluster_id = %spec.internal_id, "No kubeconfig loaded, skipping apply");
            return Ok(resources);
        }
        ctx.run("apply resources", self.apply(spec, &resources.resources))
            .await?;
        Ok(resources)
    }

    async fn remove_resources(&self, _ctx: &RequestContext, _spec: &ClusterSpec, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn add_identity_provider(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        identity_provider: IdentityProviderInfo,
    ) -> Result<Option<IdentityProviderInfo>> {
        let Some(open_id) = identity_provider.open_id.as_ref() else {
            return Ok(None);
        };
        let resources = vec![manifests::identity_provider_secret(open_id), manifests::oauth(open_id)];
        self.apply_resources(ctx, spec, ResourceSet::new("identity-provider", resources))
            .await?;
        Ok(Some(identity_provider))
    }

    async fn scale_up(&self, _ctx: &RequestContext, spec: &ClusterSpec, _increment: i64) -> Result<ClusterSpec> {
        Ok(spec.clone())
    }

    async fn scale_down(&self, _ctx: &RequestContext, spec: &ClusterSpec, _decrement: i64) -> Result<ClusterSpec> {
        Ok(spec.clone())
    }

    async fn set_compute_nodes(&self, _ctx: &RequestContext, spec: &ClusterSpec, _nodes: i64) -> Result<ClusterSpec> {
        Ok(spec.clone())
    }

    async fn get_compute_nodes(&self, _ctx: &RequestContext, _spec: &ClusterSpec) -> Result<ComputeNodesInfo> {
        Ok(ComputeNodesInfo::default())
    }

    async fn get_machine_pool(
        &self,
        _ctx: &RequestContext,
        _cluster_id: &str,
        _machine_pool_id: &str,
    ) -> Result<Option<MachinePoolInfo>> {
        Ok(None)
    }

    async fn create_machine_pool(&self, _ctx: &RequestContext, request: &MachinePoolRequest) -> Result<MachinePoolRequest> {
        Err(ProviderError::Unsupported(format!(
            "machine pool {} cannot be created on standalone cluster {}",
            request.id, request.cluster_id
        )))
    }

    async fn install_operator(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        operator: ManagedOperator,
        parameters: &[Parameter],
    ) -> Result<bool> {
        let resources = match operator {
            ManagedOperator::ClusterLogging => return Ok(true),
            ManagedOperator::Strimzi => OperatorManifests::new(&self.config.strimzi_operator).install(),
            ManagedOperator::Fleetshard => {
                let operator_config = &self.config.fleetshard_operator;
                let mut resources = OperatorManifests::new(operator_config).install();
                resources.insert(
                    1,
                    manifests::fleetshard_parameters_secret(&operator_config.namespace, parameters),
                );
                resources
            }
        };
        debug!(cluster_id = %spec.internal_id, operator = %operator, "Installing operator through OLM");
        self.apply_resources(ctx, spec, ResourceSet::new(operator.to_string(), resources))
            .await?;
        Ok(true)
    }

    async fn get_cloud_providers(&self, _ctx: &RequestContext) -> Result<Vec<CloudProviderInfo>> {
        let mut providers: Vec<CloudProviderInfo> = Vec::new();
        for cluster in self.active_clusters() {
            if providers.iter().all(|p| p.id != cluster.cloud_provider) {
                providers.push(CloudProviderInfo {
                    id: cluster.cloud_provider.clone(),
                    name: cluster.cloud_provider.clone(),
                    display_name: cluster.cloud_provider.clone(),
                });
            }
        }
        Ok(providers)
    }

    async fn get_cloud_provider_regions(
        &self,
        _ctx: &RequestContext,
        provider: &CloudProviderInfo,
    ) -> Result<Vec<CloudProviderRegionInfo>> {
        let mut regions: Vec<CloudProviderRegionInfo> = Vec::new();
        for cluster in self.active_clusters().filter(|c| c.cloud_provider == provider.id) {
            let seen = regions
                .iter()
                .any(|r| r.id == cluster.region && r.supports_multi_az == cluster.multi_az);
            if !seen {
                regions.push(CloudProviderRegionInfo {
                    id: cluster.region.clone(),
                    cloud_provider_id: provider.id.clone(),
                    name: cluster.region.clone(),
                    display_name: cluster.region.clone(),
                    supports_multi_az: cluster.multi_az,
                });
            }
        }
        Ok(regions)
    }
}
