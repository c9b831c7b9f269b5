//! Provider backed by the cluster management service
//!
//! Clusters are created and scaled through the service API, operators are
//! installed as addons, raw resources are pushed as syncsets and extra nodes
//! come from additional machine pools.

mod identity;
mod machine_pool;
mod syncset;

pub use syncset::resources_changed;

use crate::builder::ClusterBuilder;
use crate::config::OcmConfig;
use crate::context::RequestContext;
use crate::error::{ProviderError, Result};
use crate::provider::{ManagedOperator, Provider};
use fleet_types::{
    CloudProviderInfo, CloudProviderRegionInfo, ClusterRequest, ClusterSpec, ClusterStatus, ComputeNodesInfo,
    IdentityProviderInfo, MachinePoolInfo, MachinePoolRequest, OpenIdIdentityProviderInfo, Parameter, ResourceSet,
};
use ocm_client::{AddOnInstallationParameter, ClusterManagementClient, ClusterState, OcmError, Syncset};
use std::sync::Arc;
use tracing::{debug, info};

/// Provider for clusters owned by the cluster management service
#[derive(Clone)]
pub struct OcmProvider {
    client: Arc<dyn ClusterManagementClient>,
    builder: ClusterBuilder,
    config: OcmConfig,
}

impl std::fmt::Debug for OcmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcmProvider")
            .field("base_url", &self.client.base_url())
            .field("builder", &self.builder)
            .field("config", &self.config)
            .finish()
    }
}

fn to_addon_parameters(parameters: &[Parameter]) -> Vec<AddOnInstallationParameter> {
    parameters
        .iter()
        .map(|p| AddOnInstallationParameter {
            id: p.id.clone(),
            value: p.value.clone(),
        })
        .collect()
}

impl OcmProvider {
    pub fn new(client: Arc<dyn ClusterManagementClient>, builder: ClusterBuilder, config: OcmConfig) -> Self {
        Self { client, builder, config }
    }

    /// Install an addon without parameters; true once the installation is ready
    async fn install_addon(&self, cluster_id: &str, addon_id: &str) -> Result<bool> {
        let installation = match self
            .client
            .get_addon(cluster_id, addon_id)
            .await
            .map_err(|e| ProviderError::ocm(&format!("get addon {}", addon_id), cluster_id, e))?
        {
            Some(installation) => installation,
            None => {
                info!(cluster_id = %cluster_id, addon = %addon_id, "Installing addon");
                self.client
                    .create_addon_with_params(cluster_id, addon_id, &[])
                    .await
                    .map_err(|e| ProviderError::ocm(&format!("create addon {}", addon_id), cluster_id, e))?
            }
        };
        Ok(installation.is_ready())
    }

    /// Install an addon with parameters, pushing the parameters again once it is ready
    async fn install_addon_with_params(&self, cluster_id: &str, addon_id: &str, parameters: &[Parameter]) -> Result<bool> {
        let parameters = to_addon_parameters(parameters);
        let installation = match self
            .client
            .get_addon(cluster_id, addon_id)
            .await
            .map_err(|e| ProviderError::ocm(&format!("get addon {}", addon_id), cluster_id, e))?
        {
            Some(installation) => installation,
            None => {
                info!(cluster_id = %cluster_id, addon = %addon_id, "No existing addon found, installing it");
                self.client
                    .create_addon_with_params(cluster_id, addon_id, &parameters)
                    .await
                    .map_err(|e| ProviderError::ocm(&format!("create addon {}", addon_id), cluster_id, e))?
            }
        };

        if !installation.is_ready() {
            return Ok(false);
        }

        let installation_id = installation.id.as_deref().unwrap_or(addon_id);
        self.client
            .update_addon_parameters(cluster_id, installation_id, &parameters)
            .await
            .map_err(|e| {
                ProviderError::ocm(&format!("update parameters of addon {}", installation_id), cluster_id, e)
            })?;
        Ok(true)
    }

    /// Create an OpenID identity provider, reusing one with the same name
    async fn add_open_id_identity_provider(&self, cluster_id: &str, info: &OpenIdIdentityProviderInfo) -> Result<String> {
        let provider = identity::build_identity_provider(info);
        let error = match self.client.create_identity_provider(cluster_id, &provider).await {
            Ok(created) => {
                return created.id.ok_or_else(|| {
                    ProviderError::Backend(format!(
                        "identity provider {} created on cluster {} has no id",
                        info.name, cluster_id
                    ))
                });
            }
            Err(e) => e,
        };

        if error.to_string().contains(identity::ALREADY_EXISTS) {
            let existing = self
                .client
                .get_identity_providers(cluster_id)
                .await
                .map_err(|e| ProviderError::ocm("list identity providers", cluster_id, e))?;
            if let Some(id) = existing
                .into_iter()
                .find(|p| p.name.as_deref() == Some(info.name.as_str()))
                .and_then(|p| p.id)
            {
                debug!(cluster_id = %cluster_id, name = %info.name, "Identity provider already exists");
                return Ok(id);
            }
        }
        Err(ProviderError::ocm("add identity provider", cluster_id, error))
    }
}

#[async_trait::async_trait]
impl Provider for OcmProvider {
    async fn create(&self, ctx: &RequestContext, request: &ClusterRequest) -> Result<Option<ClusterSpec>> {
        let cluster = self.builder.build(Some(request))?;
        ctx.run("create cluster", async {
            let created = self.client.create_cluster(&cluster).await.map_err(|e| ProviderError::Ocm {
                context: "failed to create cluster".to_string(),
                source: e,
            })?;
            let spec = ClusterSpec {
                internal_id: created.id.unwrap_or_default(),
                external_id: created.external_id.unwrap_or_default(),
                status: Some(ClusterStatus::Provisioning),
                ..ClusterSpec::default()
            };
            info!(cluster_id = %spec.internal_id, "Cluster creation requested");
            Ok(Some(spec))
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<bool> {
        ctx.run("delete cluster", async {
            match self.client.delete_cluster(&spec.internal_id).await {
                Ok(()) => Ok(false),
                Err(e) if e.is_not_found() => Ok(true),
                Err(e) => Err(ProviderError::ocm("delete cluster", &spec.internal_id, e)),
            }
        })
        .await
    }

    async fn check_cluster_status(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<ClusterSpec> {
        ctx.run("check cluster status", async {
            let cluster = self
                .client
                .get_cluster(&spec.internal_id)
                .await
                .map_err(|e| ProviderError::ocm("get cluster", &spec.internal_id, e))?;

            let mut updated = spec.clone();
            updated.status = Some(spec.status_or_default());
            updated.status_details = cluster
                .status
                .as_ref()
                .and_then(|s| s.provision_error_message.clone())
                .unwrap_or_default();

            match cluster.current_state() {
                ClusterState::Ready => {
                    if updated.external_id.is_empty() {
                        updated.external_id = cluster.external_id.filter(|id| !id.is_empty()).ok_or_else(|| {
                            ProviderError::Backend(format!("external ID for cluster {} cannot be found", spec.internal_id))
                        })?;
                    }
                    updated.status = Some(ClusterStatus::Provisioned);
                }
                ClusterState::Error => updated.status = Some(ClusterStatus::Failed),
                _ => {}
            }
            Ok(updated)
        })
        .await
    }

    async fn get_cluster_spec(&self, ctx: &RequestContext, cluster_id: &str) -> Result<ClusterSpec> {
        ctx.run("get cluster spec", async {
            let cluster = self
                .client
                .get_cluster(cluster_id)
                .await
                .map_err(|e| ProviderError::ocm("get cluster", cluster_id, e))?;
            let status = match cluster.current_state() {
                ClusterState::Ready => ClusterStatus::Provisioned,
                ClusterState::Error => ClusterStatus::Failed,
                _ => ClusterStatus::Provisioning,
            };
            Ok(ClusterSpec {
                internal_id: cluster.id.clone().unwrap_or_else(|| cluster_id.to_string()),
                external_id: cluster.external_id.clone().unwrap_or_default(),
                status: Some(status),
                status_details: cluster
                    .status
                    .and_then(|s| s.provision_error_message)
                    .unwrap_or_default(),
                additional_info: serde_json::Value::Null,
            })
        })
        .await
    }

    async fn get_cluster_dns(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<String> {
        ctx.run("get cluster dns", async {
            let ingresses = self
                .client
                .get_cluster_ingresses(&spec.internal_id)
                .await
                .map_err(|e| ProviderError::ocm("get cluster ingresses", &spec.internal_id, e))?;
            ingresses
                .into_iter()
                .find(|i| i.default)
                .and_then(|i| i.dns_name)
                .ok_or_else(|| {
                    ProviderError::Backend(format!("cluster {} has no default ingress", spec.internal_id))
                })
        })
        .await
    }

    async fn apply_resources(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        resources: ResourceSet,
    ) -> Result<ResourceSet> {
        let cluster_id = spec.internal_id.as_str();
        ctx.run("apply resources", async {
            let desired = Syncset {
                id: Some(resources.name.clone()),
                href: None,
                resources: resources.resources.clone(),
            };

            match self.client.get_syncset(cluster_id, &resources.name).await {
                Err(e) if e.is_not_found() => {
                    info!(cluster_id = %cluster_id, name = %resources.name, "Syncset not found, creating it");
                    self.client
                        .create_syncset(cluster_id, &desired)
                        .await
                        .map_err(|e| ProviderError::ocm("create syncset", cluster_id, e))?;
                }
                Err(e) => return Err(ProviderError::ocm("get syncset", cluster_id, e)),
                Ok(existing) => {
                    if resources_changed(&existing.resources, &desired.resources) {
                        info!(cluster_id = %cluster_id, name = %resources.name, "Syncset changed, updating it");
                        self.client
                            .update_syncset(cluster_id, &resources.name, &desired)
                            .await
                            .map_err(|e| ProviderError::ocm("update syncset", cluster_id, e))?;
                    } else {
                        debug!(cluster_id = %cluster_id, name = %resources.name, "Syncset unchanged");
                    }
                }
            }
            Ok(resources.clone())
        })
        .await
    }

    async fn remove_resources(&self, ctx: &RequestContext, spec: &ClusterSpec, name: &str) -> Result<()> {
        ctx.run("remove resources", async {
            match self.client.delete_syncset(&spec.internal_id, name).await {
                Ok(()) => Ok(()),
                // already removed by an earlier call
                Err(e) if e.is_not_found() => Ok(()),
                Err(e) => Err(ProviderError::ocm("delete syncset", &spec.internal_id, e)),
            }
        })
        .await
    }

    async fn add_identity_provider(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        identity_provider: IdentityProviderInfo,
    ) -> Result<Option<IdentityProviderInfo>> {
        let Some(mut open_id) = identity_provider.open_id else {
            return Ok(None);
        };
        ctx.run("add identity provider", async {
            open_id.id = self.add_open_id_identity_provider(&spec.internal_id, &open_id).await?;
            Ok(Some(IdentityProviderInfo::open_id(open_id)))
        })
        .await
    }

    async fn scale_up(&self, ctx: &RequestContext, spec: &ClusterSpec, increment: i64) -> Result<ClusterSpec> {
        ctx.run("scale up", async {
            self.client
                .scale_up_compute_nodes(&spec.internal_id, increment)
                .await
                .map_err(|e| ProviderError::ocm("scale up compute nodes", &spec.internal_id, e))?;
            Ok(spec.clone())
        })
        .await
    }

    async fn scale_down(&self, ctx: &RequestContext, spec: &ClusterSpec, decrement: i64) -> Result<ClusterSpec> {
        ctx.run("scale down", async {
            self.client
                .scale_down_compute_nodes(&spec.internal_id, decrement)
                .await
                .map_err(|e| ProviderError::ocm("scale down compute nodes", &spec.internal_id, e))?;
            Ok(spec.clone())
        })
        .await
    }

    async fn set_compute_nodes(&self, ctx: &RequestContext, spec: &ClusterSpec, nodes: i64) -> Result<ClusterSpec> {
        ctx.run("set compute nodes", async {
            self.client
                .set_compute_nodes(&spec.internal_id, nodes)
                .await
                .map_err(|e| ProviderError::ocm("set compute nodes", &spec.internal_id, e))?;
            Ok(spec.clone())
        })
        .await
    }

    async fn get_compute_nodes(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<ComputeNodesInfo> {
        let cluster_id = spec.internal_id.as_str();
        ctx.run("get compute nodes", async {
            let cluster = self
                .client
                .get_cluster(cluster_id)
                .await
                .map_err(|e| ProviderError::ocm("get cluster", cluster_id, e))?;
            let metrics = self
                .client
                .get_existing_cluster_metrics(cluster_id)
                .await
                .map_err(|e| ProviderError::ocm("get cluster metrics", cluster_id, e))?
                .ok_or_else(|| ProviderError::Backend(format!("cluster {} has no subscription metrics", cluster_id)))?;

            let actual = metrics
                .nodes
                .and_then(|n| n.compute)
                .ok_or_else(|| ProviderError::Backend(format!("cluster {} has no compute node metrics", cluster_id)))?;
            let desired = cluster
                .desired_compute_nodes()
                .ok_or_else(|| ProviderError::Backend(format!("cluster {} has no desired compute nodes", cluster_id)))?;

            Ok(ComputeNodesInfo {
                actual: actual as i64,
                desired,
            })
        })
        .await
    }

    async fn get_machine_pool(
        &self,
        ctx: &RequestContext,
        cluster_id: &str,
        machine_pool_id: &str,
    ) -> Result<Option<MachinePoolInfo>> {
        ctx.run("get machine pool", async {
            let pool = self
                .client
                .get_machine_pool(cluster_id, machine_pool_id)
                .await
                .map_err(|e| {
                    ProviderError::ocm(&format!("get machine pool {}", machine_pool_id), cluster_id, e)
                })?;
            Ok(pool.map(machine_pool::machine_pool_info))
        })
        .await
    }

    async fn create_machine_pool(&self, ctx: &RequestContext, request: &MachinePoolRequest) -> Result<MachinePoolRequest> {
        let bounds = if request.auto_scaling_enabled {
            Some(machine_pool::effective_auto_scaling(request)?)
        } else {
            None
        };
        let pool = machine_pool::build_machine_pool(request, bounds);
        ctx.run("create machine pool", async {
            self.client
                .create_machine_pool(&request.cluster_id, &pool)
                .await
                .map_err(|e| {
                    ProviderError::ocm(&format!("create machine pool {}", request.id), &request.cluster_id, e)
                })?;
            info!(cluster_id = %request.cluster_id, machine_pool = %request.id, "Machine pool created");
            let mut created = request.clone();
            if let Some(bounds) = bounds {
                created.auto_scaling = bounds;
            }
            Ok(created)
        })
        .await
    }

    async fn install_operator(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        operator: ManagedOperator,
        parameters: &[Parameter],
    ) -> Result<bool> {
        let cluster_id = spec.internal_id.as_str();
        ctx.run("install operator", async {
            match operator {
                ManagedOperator::Strimzi => {
                    self.install_addon(cluster_id, &self.config.strimzi_operator_addon_id)
                        .await
                }
                ManagedOperator::ClusterLogging => {
                    self.install_addon_with_params(cluster_id, &self.config.cluster_logging_operator_addon_id, parameters)
                        .await
                }
                ManagedOperator::Fleetshard => {
                    self.install_addon_with_params(cluster_id, &self.config.kas_fleetshard_addon_id, parameters)
                        .await
                }
            }
        })
        .await
    }

    async fn get_cloud_providers(&self, ctx: &RequestContext) -> Result<Vec<CloudProviderInfo>> {
        ctx.run("get cloud providers", async {
            let providers = self.client.get_cloud_providers().await.map_err(|e| ProviderError::Ocm {
                context: "failed to get cloud providers".to_string(),
                source: e,
            })?;
            Ok(providers
                .into_iter()
                .map(|p| CloudProviderInfo {
                    id: p.id,
                    name: p.name,
                    display_name: p.display_name,
                })
                .collect())
        })
        .await
    }

    async fn get_cloud_provider_regions(
        &self,
        ctx: &RequestContext,
        provider: &CloudProviderInfo,
    ) -> Result<Vec<CloudProviderRegionInfo>> {
        ctx.run("get cloud provider regions", async {
            let regions = self.client.get_regions(&provider.id).await.map_err(|e: OcmError| ProviderError::Ocm {
                context: format!("failed to get regions for provider {}", provider.name),
                source: e,
            })?;
            Ok(regions
                .into_iter()
                .map(|r| CloudProviderRegionInfo {
                    cloud_provider_id: r
                        .cloud_provider
                        .and_then(|p| p.id)
                        .unwrap_or_else(|| provider.id.clone()),
                    id: r.id,
                    name: r.name,
                    display_name: r.display_name,
                    supports_multi_az: r.supports_multi_az,
                })
                .collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IdGenerator;
    use crate::config::{AwsConfig, DataplaneClusterConfig};
    use ocm_client::{
        AddOnInstallation, AddOnInstallationState, Cluster, ClusterNodes, IdentityProvider, Ingress, MockFailure,
        MockOcmClient, NodesMetric, ObjectReference, SubscriptionMetrics,
    };
    use serde_json::json;

    const CLUSTER_ID: &str = "cluster-1";

    struct FixedId;

    impl IdGenerator for FixedId {
        fn generate(&self) -> String {
            "mk-test".to_string()
        }
    }

    fn provider(mock: &MockOcmClient) -> OcmProvider {
        let builder = ClusterBuilder::new(AwsConfig::default(), Arc::new(DataplaneClusterConfig::default()))
            .with_id_generator(Some(Arc::new(FixedId)));
        OcmProvider::new(Arc::new(mock.clone()), builder, OcmConfig::default())
    }

    fn ctx() -> RequestContext {
        RequestContext::background()
    }

    fn cluster_in_state(state: ClusterState, external_id: Option<&str>) -> Cluster {
        Cluster {
            id: Some(CLUSTER_ID.to_string()),
            external_id: external_id.map(str::to_string),
            status: Some(ocm_client::ClusterStatus {
                state: Some(state),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_returns_provisioning_spec() {
        let mock = MockOcmClient::new("http://ocm.test");
        let request = ClusterRequest {
            cloud_provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            ..Default::default()
        };

        let spec = provider(&mock).create(&ctx(), &request).await.unwrap().unwrap();

        assert!(!spec.internal_id.is_empty());
        assert_eq!(spec.status, Some(ClusterStatus::Provisioning));
        let stored = mock.cluster(&spec.internal_id).unwrap();
        assert_eq!(stored.name.as_deref(), Some("mk-test"));
        assert_eq!(stored.multi_az, Some(true));
    }

    #[tokio::test]
    async fn test_check_status_ready_resolves_external_id() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(cluster_in_state(ClusterState::Ready, Some("ext-1")));

        let spec = provider(&mock)
            .check_cluster_status(&ctx(), &ClusterSpec::new(CLUSTER_ID))
            .await
            .unwrap();
        assert_eq!(spec.status, Some(ClusterStatus::Provisioned));
        assert_eq!(spec.external_id, "ext-1");
    }

    #[tokio::test]
    async fn test_check_status_ready_without_external_id_fails() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(cluster_in_state(ClusterState::Ready, None));

        let result = provider(&mock)
            .check_cluster_status(&ctx(), &ClusterSpec::new(CLUSTER_ID))
            .await;
        assert!(matches!(result, Err(ProviderError::Backend(_))));
    }

    #[tokio::test]
    async fn test_check_status_keeps_external_id() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(cluster_in_state(ClusterState::Installing, None));
        let spec = ClusterSpec {
            external_id: "ext-known".to_string(),
            ..ClusterSpec::new(CLUSTER_ID)
        };

        let updated = provider(&mock).check_cluster_status(&ctx(), &spec).await.unwrap();
        assert_eq!(updated.external_id, "ext-known");
        assert_eq!(updated.status, Some(ClusterStatus::Provisioning));
    }

    #[tokio::test]
    async fn test_check_status_error_copies_details() {
        let mock = MockOcmClient::new("http://ocm.test");
        let mut cluster = cluster_in_state(ClusterState::Error, None);
        if let Some(status) = cluster.status.as_mut() {
            status.provision_error_message = Some("quota exceeded".to_string());
        }
        mock.add_cluster(cluster);

        let spec = provider(&mock)
            .check_cluster_status(&ctx(), &ClusterSpec::new(CLUSTER_ID))
            .await
            .unwrap();
        assert_eq!(spec.status, Some(ClusterStatus::Failed));
        assert_eq!(spec.status_details, "quota exceeded");
    }

    #[tokio::test]
    async fn test_get_cluster_spec_maps_state() {
        let mock = MockOcmClient::new("http://ocm.test");
        let provider = provider(&mock);

        mock.add_cluster(cluster_in_state(ClusterState::Installing, None));
        let spec = provider.get_cluster_spec(&ctx(), CLUSTER_ID).await.unwrap();
        assert_eq!(spec.internal_id, CLUSTER_ID);
        assert_eq!(spec.status, Some(ClusterStatus::Provisioning));

        mock.add_cluster(cluster_in_state(ClusterState::Ready, Some("ext-1")));
        let spec = provider.get_cluster_spec(&ctx(), CLUSTER_ID).await.unwrap();
        assert_eq!(spec.status, Some(ClusterStatus::Provisioned));
        assert_eq!(spec.external_id, "ext-1");

        let mut failed = cluster_in_state(ClusterState::Error, None);
        if let Some(status) = failed.status.as_mut() {
            status.provision_error_message = Some("quota exceeded".to_string());
        }
        mock.add_cluster(failed);
        let spec = provider.get_cluster_spec(&ctx(), CLUSTER_ID).await.unwrap();
        assert_eq!(spec.status, Some(ClusterStatus::Failed));
        assert_eq!(spec.status_details, "quota exceeded");

        let err = provider.get_cluster_spec(&ctx(), "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_machine_pool() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_machine_pool(
            CLUSTER_ID,
            ocm_client::MachinePool {
                id: Some("kafka-standard".to_string()),
                instance_type: Some("m5.2xlarge".to_string()),
                replicas: Some(3),
                availability_zones: vec!["us-east-1a".to_string()],
                ..Default::default()
            },
        );
        let provider = provider(&mock);

        let pool = provider
            .get_machine_pool(&ctx(), CLUSTER_ID, "kafka-standard")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pool.instance_size, "m5.2xlarge");
        assert!(!pool.multi_az);
        assert!(!pool.auto_scaling_enabled);

        assert!(provider.get_machine_pool(&ctx(), CLUSTER_ID, "other").await.unwrap().is_none());

        mock.fail_on("get_machine_pool", MockFailure::Api("boom".to_string()));
        let err = provider.get_machine_pool(&ctx(), CLUSTER_ID, "other").await.unwrap_err();
        assert!(err.to_string().starts_with("failed to get machine pool other for cluster cluster-1"));
    }

    #[tokio::test]
    async fn test_create_multi_az_machine_pool() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(cluster_in_state(ClusterState::Ready, Some("ext")));
        let request = MachinePoolRequest {
            id: "kafka-standard".to_string(),
            cluster_id: CLUSTER_ID.to_string(),
            instance_size: "m5.2xlarge".to_string(),
            multi_az: true,
            auto_scaling_enabled: true,
            auto_scaling: fleet_types::MachinePoolAutoScaling { min_nodes: 1, max_nodes: 7 },
            node_labels: [("bf2.org/kafkaInstanceProfileType".to_string(), "standard".to_string())].into(),
            node_taints: vec![fleet_types::ClusterNodeTaint {
                key: "bf2.org/kafkaInstanceProfileType".to_string(),
                value: "standard".to_string(),
                effect: "NoExecute".to_string(),
            }],
        };

        let created = provider(&mock).create_machine_pool(&ctx(), &request).await.unwrap();
        assert_eq!(created.auto_scaling.min_nodes, 3);
        assert_eq!(created.auto_scaling.max_nodes, 9);

        let stored = mock.machine_pool(CLUSTER_ID, "kafka-standard").unwrap();
        let autoscaling = stored.autoscaling.unwrap();
        assert_eq!((autoscaling.min_replicas, autoscaling.max_replicas), (3, 9));
        assert_eq!(stored.instance_type.as_deref(), Some("m5.2xlarge"));
        assert_eq!(stored.taints[0].effect, "NoExecute");
        assert_eq!(stored.labels["bf2.org/kafkaInstanceProfileType"], "standard");
    }

    #[tokio::test]
    async fn test_create_machine_pool_rejects_inverted_bounds() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(cluster_in_state(ClusterState::Ready, Some("ext")));
        let request = MachinePoolRequest {
            id: "kafka-standard".to_string(),
            cluster_id: CLUSTER_ID.to_string(),
            auto_scaling_enabled: true,
            auto_scaling: fleet_types::MachinePoolAutoScaling { min_nodes: 6, max_nodes: 3 },
            ..Default::default()
        };

        let result = provider(&mock).create_machine_pool(&ctx(), &request).await;
        assert!(matches!(result, Err(ProviderError::InvalidArgument(_))));
        assert_eq!(mock.call_count("create_machine_pool"), 0);

        // without autoscaling the bounds are ignored
        let fixed = MachinePoolRequest {
            auto_scaling_enabled: false,
            ..request
        };
        let created = provider(&mock).create_machine_pool(&ctx(), &fixed).await.unwrap();
        assert_eq!(created, fixed);
        assert!(mock.machine_pool(CLUSTER_ID, "kafka-standard").unwrap().autoscaling.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(cluster_in_state(ClusterState::Ready, Some("ext")));
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);

        assert!(!provider.delete(&ctx(), &spec).await.unwrap());
        assert!(provider.delete(&ctx(), &spec).await.unwrap());

        mock.fail_on("delete_cluster", MockFailure::Api("boom".to_string()));
        let err = provider.delete(&ctx(), &spec).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to delete cluster for cluster cluster-1: OCM API error: boom");
    }

    #[tokio::test]
    async fn test_get_cluster_dns() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.set_ingresses(
            CLUSTER_ID,
            vec![
                Ingress {
                    id: Some("secondary".to_string()),
                    dns_name: Some("apps2.example.com".to_string()),
                    default: false,
                },
                Ingress {
                    id: Some("default".to_string()),
                    dns_name: Some("apps.example.com".to_string()),
                    default: true,
                },
            ],
        );
        let provider = provider(&mock);
        let dns = provider.get_cluster_dns(&ctx(), &ClusterSpec::new(CLUSTER_ID)).await.unwrap();
        assert_eq!(dns, "apps.example.com");

        let missing = provider.get_cluster_dns(&ctx(), &ClusterSpec::new("other")).await;
        assert!(matches!(missing, Err(ProviderError::Backend(_))));
    }

    #[tokio::test]
    async fn test_apply_resources_creates_then_skips_unchanged() {
        let mock = MockOcmClient::new("http://ocm.test");
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);
        let set = ResourceSet::new(
            "ext-managedservice-cluster-mgr",
            vec![json!({"apiVersion": "v1", "kind": "Namespace", "metadata": {"name": "kafka"}})],
        );

        provider.apply_resources(&ctx(), &spec, set.clone()).await.unwrap();
        assert_eq!(mock.call_count("create_syncset"), 1);

        provider.apply_resources(&ctx(), &spec, set.clone()).await.unwrap();
        assert_eq!(mock.call_count("create_syncset"), 1);
        assert_eq!(mock.call_count("update_syncset"), 0);
    }

    #[tokio::test]
    async fn test_apply_resources_updates_changed_set() {
        let mock = MockOcmClient::new("http://ocm.test");
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);
        let namespace = json!({"apiVersion": "v1", "kind": "Namespace", "metadata": {"name": "kafka"}});
        provider
            .apply_resources(&ctx(), &spec, ResourceSet::new("sync", vec![namespace.clone()]))
            .await
            .unwrap();

        let role = json!({"apiVersion": "rbac.authorization.k8s.io/v1", "kind": "ClusterRole", "metadata": {"name": "reader"}});
        provider
            .apply_resources(&ctx(), &spec, ResourceSet::new("sync", vec![namespace, role]))
            .await
            .unwrap();

        assert_eq!(mock.call_count("update_syncset"), 1);
        assert_eq!(mock.syncset(CLUSTER_ID, "sync").unwrap().resources.len(), 2);
    }

    #[tokio::test]
    async fn test_apply_resources_propagates_get_errors() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.fail_on("get_syncset", MockFailure::Api("unavailable".to_string()));
        let result = provider(&mock)
            .apply_resources(&ctx(), &ClusterSpec::new(CLUSTER_ID), ResourceSet::new("sync", vec![]))
            .await;
        assert!(matches!(result, Err(ProviderError::Ocm { .. })));
        assert_eq!(mock.call_count("create_syncset"), 0);
    }

    #[tokio::test]
    async fn test_remove_resources_ignores_missing_syncset() {
        let mock = MockOcmClient::new("http://ocm.test");
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);
        provider.remove_resources(&ctx(), &spec, "sync").await.unwrap();

        mock.fail_on("delete_syncset", MockFailure::Api("boom".to_string()));
        assert!(provider.remove_resources(&ctx(), &spec, "sync").await.is_err());
    }

    #[tokio::test]
    async fn test_install_strimzi_creates_once() {
        let mock = MockOcmClient::new("http://ocm.test");
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);

        let ready = provider
            .install_operator(&ctx(), &spec, ManagedOperator::Strimzi, &[])
            .await
            .unwrap();
        assert!(!ready);
        assert_eq!(mock.call_count("create_addon_with_params"), 1);

        mock.set_addon_state(CLUSTER_ID, "managed-kafka", AddOnInstallationState::Ready);
        let ready = provider
            .install_operator(&ctx(), &spec, ManagedOperator::Strimzi, &[])
            .await
            .unwrap();
        assert!(ready);
        assert_eq!(mock.call_count("create_addon_with_params"), 1);
    }

    #[tokio::test]
    async fn test_install_fleetshard_updates_parameters_when_ready() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_addon(
            CLUSTER_ID,
            AddOnInstallation {
                id: Some("kas-fleetshard-operator".to_string()),
                addon: Some(ObjectReference::with_id("kas-fleetshard-operator")),
                state: Some(AddOnInstallationState::Ready),
                ..Default::default()
            },
        );
        let params = [Parameter::new("sso-client-id", "fleetshard")];

        let ready = provider(&mock)
            .install_operator(&ctx(), &ClusterSpec::new(CLUSTER_ID), ManagedOperator::Fleetshard, &params)
            .await
            .unwrap();

        assert!(ready);
        assert_eq!(mock.call_count("create_addon_with_params"), 0);
        assert_eq!(mock.call_count("update_addon_parameters"), 1);
        let stored = mock.addon(CLUSTER_ID, "kas-fleetshard-operator").unwrap();
        assert_eq!(stored.parameters.unwrap().items[0].value, "fleetshard");
    }

    #[tokio::test]
    async fn test_install_cluster_logging_not_ready() {
        let mock = MockOcmClient::new("http://ocm.test");
        let ready = provider(&mock)
            .install_operator(&ctx(), &ClusterSpec::new(CLUSTER_ID), ManagedOperator::ClusterLogging, &[])
            .await
            .unwrap();
        assert!(!ready);
        assert!(mock.addon(CLUSTER_ID, "cluster-logging-operator").is_some());
        assert_eq!(mock.call_count("update_addon_parameters"), 0);
    }

    #[tokio::test]
    async fn test_add_identity_provider() {
        let mock = MockOcmClient::new("http://ocm.test");
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);

        let none = provider
            .add_identity_provider(&ctx(), &spec, IdentityProviderInfo::default())
            .await
            .unwrap();
        assert!(none.is_none());

        let info = IdentityProviderInfo::open_id(OpenIdIdentityProviderInfo {
            name: "Kafka_SRE".to_string(),
            client_id: "kafka-sre".to_string(),
            client_secret: "secret".to_string(),
            issuer: "https://sso.example.com".to_string(),
            ..Default::default()
        });
        let created = provider.add_identity_provider(&ctx(), &spec, info.clone()).await.unwrap().unwrap();
        let id = created.open_id.unwrap().id;
        assert!(!id.is_empty());

        // a second call resolves the existing provider by name
        let again = provider.add_identity_provider(&ctx(), &spec, info).await.unwrap().unwrap();
        assert_eq!(again.open_id.unwrap().id, id);
        assert_eq!(mock.call_count("get_identity_providers"), 1);
    }

    #[tokio::test]
    async fn test_add_identity_provider_other_error_propagates() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_identity_provider(
            CLUSTER_ID,
            IdentityProvider {
                id: Some("idp-1".to_string()),
                name: Some("Other".to_string()),
                ..Default::default()
            },
        );
        mock.fail_on("create_identity_provider", MockFailure::Api("forbidden".to_string()));
        let info = IdentityProviderInfo::open_id(OpenIdIdentityProviderInfo {
            name: "Kafka_SRE".to_string(),
            ..Default::default()
        });
        let result = provider(&mock)
            .add_identity_provider(&ctx(), &ClusterSpec::new(CLUSTER_ID), info)
            .await;
        assert!(matches!(result, Err(ProviderError::Ocm { .. })));
        assert_eq!(mock.call_count("get_identity_providers"), 0);
    }

    #[tokio::test]
    async fn test_add_identity_provider_without_returned_id() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.omit_created_ids();
        let info = IdentityProviderInfo::open_id(OpenIdIdentityProviderInfo {
            name: "Kafka_SRE".to_string(),
            ..Default::default()
        });
        let result = provider(&mock)
            .add_identity_provider(&ctx(), &ClusterSpec::new(CLUSTER_ID), info)
            .await;
        let Err(ProviderError::Backend(message)) = result else {
            panic!("expected a backend error, got {:?}", result);
        };
        assert!(message.contains("Kafka_SRE"));
    }

    #[tokio::test]
    async fn test_scaling_returns_input_spec() {
        let mock = MockOcmClient::new("http://ocm.test");
        let mut cluster = cluster_in_state(ClusterState::Ready, Some("ext"));
        cluster.nodes = Some(ClusterNodes {
            compute: Some(6),
            ..Default::default()
        });
        mock.add_cluster(cluster);
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);

        assert_eq!(provider.scale_up(&ctx(), &spec, 3).await.unwrap(), spec);
        assert_eq!(mock.cluster(CLUSTER_ID).unwrap().desired_compute_nodes(), Some(9));
        provider.scale_down(&ctx(), &spec, 3).await.unwrap();
        provider.set_compute_nodes(&ctx(), &spec, 12).await.unwrap();
        assert_eq!(mock.cluster(CLUSTER_ID).unwrap().desired_compute_nodes(), Some(12));
    }

    #[tokio::test]
    async fn test_get_compute_nodes() {
        let mock = MockOcmClient::new("http://ocm.test");
        let mut cluster = cluster_in_state(ClusterState::Ready, Some("ext"));
        cluster.nodes = Some(ClusterNodes {
            compute: Some(9),
            ..Default::default()
        });
        mock.add_cluster(cluster);
        let provider = provider(&mock);
        let spec = ClusterSpec::new(CLUSTER_ID);

        assert!(matches!(
            provider.get_compute_nodes(&ctx(), &spec).await,
            Err(ProviderError::Backend(_))
        ));

        mock.set_metrics(
            CLUSTER_ID,
            SubscriptionMetrics {
                nodes: Some(NodesMetric {
                    compute: Some(6.0),
                    ..Default::default()
                }),
            },
        );
        let nodes = provider.get_compute_nodes(&ctx(), &spec).await.unwrap();
        assert_eq!(nodes, ComputeNodesInfo { actual: 6, desired: 9 });
    }
}
