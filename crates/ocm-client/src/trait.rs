//! Trait for cluster management client operations
//!
//! This trait allows for mocking the cluster management client in tests.

use crate::error::OcmError;
use crate::models::*;

/// Operations the fleet manager needs from the cluster management service
#[async_trait::async_trait]
pub trait ClusterManagementClient: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    // Clusters
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Cluster, OcmError>;
    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster, OcmError>;
    /// Request deletion. `Err(OcmError::NotFound)` when the cluster is already gone.
    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), OcmError>;
    async fn get_cluster_ingresses(&self, cluster_id: &str) -> Result<Vec<Ingress>, OcmError>;

    // Compute nodes
    async fn scale_up_compute_nodes(&self, cluster_id: &str, increment: i64) -> Result<Cluster, OcmError>;
    async fn scale_down_compute_nodes(&self, cluster_id: &str, decrement: i64) -> Result<Cluster, OcmError>;
    async fn set_compute_nodes(&self, cluster_id: &str, nodes: i64) -> Result<Cluster, OcmError>;
    /// Observed metrics of the cluster subscription, `None` when nothing is reported yet.
    async fn get_existing_cluster_metrics(&self, cluster_id: &str) -> Result<Option<SubscriptionMetrics>, OcmError>;

    // Machine pools
    /// Machine pool `machine_pool_id` of the cluster, `None` when it does not exist.
    async fn get_machine_pool(&self, cluster_id: &str, machine_pool_id: &str) -> Result<Option<MachinePool>, OcmError>;
    async fn create_machine_pool(&self, cluster_id: &str, machine_pool: &MachinePool) -> Result<MachinePool, OcmError>;

    // Cloud providers
    async fn get_cloud_providers(&self) -> Result<Vec<CloudProvider>, OcmError>;
    async fn get_regions(&self, cloud_provider_id: &str) -> Result<Vec<CloudRegion>, OcmError>;

    // Addons
    /// Installation of `addon_id` on the cluster, `None` when it is not installed.
    async fn get_addon(&self, cluster_id: &str, addon_id: &str) -> Result<Option<AddOnInstallation>, OcmError>;
    async fn create_addon_with_params(
        &self,
        cluster_id: &str,
        addon_id: &str,
        parameters: &[AddOnInstallationParameter],
    ) -> Result<AddOnInstallation, OcmError>;
    async fn update_addon_parameters(
        &self,
        cluster_id: &str,
        addon_installation_id: &str,
        parameters: &[AddOnInstallationParameter],
    ) -> Result<AddOnInstallation, OcmError>;

    // Identity providers
    async fn create_identity_provider(
        &self,
        cluster_id: &str,
        identity_provider: &IdentityProvider,
    ) -> Result<IdentityProvider, OcmError>;
    async fn get_identity_providers(&self, cluster_id: &str) -> Result<Vec<IdentityProvider>, OcmError>;

    // Syncsets
    async fn get_syncset(&self, cluster_id: &str, syncset_id: &str) -> Result<Syncset, OcmError>;
    async fn create_syncset(&self, cluster_id: &str, syncset: &Syncset) -> Result<Syncset, OcmError>;
    async fn update_syncset(&self, cluster_id: &str, syncset_id: &str, syncset: &Syncset) -> Result<Syncset, OcmError>;
    async fn delete_syncset(&self, cluster_id: &str, syncset_id: &str) -> Result<(), OcmError>;
}
