//! Mock cluster management client for unit testing
//!
//! This module provides an in-memory implementation of
//! [`ClusterManagementClient`] so providers can be tested without a running
//! cluster service.
//!
//! The mock is organized into domain-specific modules:
//! - `clusters.rs` - clusters, ingresses, compute nodes, machine pools, metrics,
//!   cloud providers
//! - `addons.rs` - addon installations
//! - `configuration.rs` - identity providers and syncsets
//!
//! Every operation is recorded under its trait method name. Tests can inspect
//! the counters with [`MockOcmClient::call_count`] and make an operation fail
//! with [`MockOcmClient::fail_on`].

mod addons;
mod clusters;
mod configuration;

use crate::error::OcmError;
use crate::models::*;
use crate::ocm_trait::ClusterManagementClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Failure injected into a mocked operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// The operation answers with a 404
    NotFound,
    /// The operation answers with a generic API error carrying this message
    Api(String),
}

impl MockFailure {
    fn to_error(&self, operation: &str) -> OcmError {
        match self {
            MockFailure::NotFound => OcmError::NotFound(format!("{} (mocked)", operation)),
            MockFailure::Api(message) => OcmError::Api(message.clone()),
        }
    }
}

/// Mock cluster management client for testing
///
/// Clones share the same in-memory state.
#[derive(Debug, Clone, Default)]
pub struct MockOcmClient {
    pub(crate) base_url: String,
    pub(crate) clusters: Arc<Mutex<HashMap<String, Cluster>>>,
    pub(crate) ingresses: Arc<Mutex<HashMap<String, Vec<Ingress>>>>,
    pub(crate) metrics: Arc<Mutex<HashMap<String, SubscriptionMetrics>>>,
    pub(crate) cloud_providers: Arc<Mutex<Vec<CloudProvider>>>,
    pub(crate) regions: Arc<Mutex<HashMap<String, Vec<CloudRegion>>>>,
    // keyed by (cluster id, machine pool id)
    pub(crate) machine_pools: Arc<Mutex<HashMap<(String, String), MachinePool>>>,
    // keyed by (cluster id, addon id)
    pub(crate) addons: Arc<Mutex<HashMap<(String, String), AddOnInstallation>>>,
    pub(crate) identity_providers: Arc<Mutex<HashMap<String, Vec<IdentityProvider>>>>,
    // keyed by (cluster id, syncset id)
    pub(crate) syncsets: Arc<Mutex<HashMap<(String, String), Syncset>>>,
    failures: Arc<Mutex<HashMap<String, MockFailure>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    next_id: Arc<Mutex<u64>>,
    omit_ids: Arc<Mutex<bool>>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockOcmClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Add a cluster to the mock store (for test setup)
    pub fn add_cluster(&self, cluster: Cluster) {
        let id = cluster.id.clone().unwrap_or_else(|| self.generate_id("cluster"));
        lock(&self.clusters).insert(id, cluster);
    }

    /// Current copy of a stored cluster
    pub fn cluster(&self, cluster_id: &str) -> Option<Cluster> {
        lock(&self.clusters).get(cluster_id).cloned()
    }

    /// Set the ingresses of a cluster (for test setup)
    pub fn set_ingresses(&self, cluster_id: &str, ingresses: Vec<Ingress>) {
        lock(&self.ingresses).insert(cluster_id.to_string(), ingresses);
    }

    /// Set the subscription metrics of a cluster (for test setup)
    pub fn set_metrics(&self, cluster_id: &str, metrics: SubscriptionMetrics) {
        lock(&self.metrics).insert(cluster_id.to_string(), metrics);
    }

    /// Add a cloud provider and its regions (for test setup)
    pub fn add_cloud_provider(&self, provider: CloudProvider, regions: Vec<CloudRegion>) {
        lock(&self.regions).insert(provider.id.clone(), regions);
        lock(&self.cloud_providers).push(provider);
    }

    /// Store a machine pool for a cluster (for test setup)
    pub fn add_machine_pool(&self, cluster_id: &str, machine_pool: MachinePool) {
        let id = machine_pool.id.clone().unwrap_or_default();
        lock(&self.machine_pools).insert((cluster_id.to_string(), id), machine_pool);
    }

    /// Current copy of a stored machine pool
    pub fn machine_pool(&self, cluster_id: &str, machine_pool_id: &str) -> Option<MachinePool> {
        lock(&self.machine_pools)
            .get(&(cluster_id.to_string(), machine_pool_id.to_string()))
            .cloned()
    }

    /// Store an addon installation for a cluster (for test setup)
    pub fn add_addon(&self, cluster_id: &str, installation: AddOnInstallation) {
        let addon_id = installation
            .addon
            .as_ref()
            .and_then(|a| a.id.clone())
            .or_else(|| installation.id.clone())
            .unwrap_or_default();
        lock(&self.addons).insert((cluster_id.to_string(), addon_id), installation);
    }

    /// Change the state of a stored addon installation
    pub fn set_addon_state(&self, cluster_id: &str, addon_id: &str, state: AddOnInstallationState) {
        if let Some(installation) = lock(&self.addons).get_mut(&(cluster_id.to_string(), addon_id.to_string())) {
            installation.state = Some(state);
        }
    }

    /// Current copy of a stored addon installation
    pub fn addon(&self, cluster_id: &str, addon_id: &str) -> Option<AddOnInstallation> {
        lock(&self.addons)
            .get(&(cluster_id.to_string(), addon_id.to_string()))
            .cloned()
    }

    /// Add an identity provider to a cluster (for test setup)
    pub fn add_identity_provider(&self, cluster_id: &str, identity_provider: IdentityProvider) {
        lock(&self.identity_providers)
            .entry(cluster_id.to_string())
            .or_default()
            .push(identity_provider);
    }

    /// Store a syncset for a cluster (for test setup)
    pub fn add_syncset(&self, cluster_id: &str, syncset: Syncset) {
        let id = syncset.id.clone().unwrap_or_default();
        lock(&self.syncsets).insert((cluster_id.to_string(), id), syncset);
    }

    /// Current copy of a stored syncset
    pub fn syncset(&self, cluster_id: &str, syncset_id: &str) -> Option<Syncset> {
        lock(&self.syncsets)
            .get(&(cluster_id.to_string(), syncset_id.to_string()))
            .cloned()
    }

    /// Make every later call of `operation` fail
    ///
    /// `operation` is the trait method name, e.g. `"get_cluster"`.
    pub fn fail_on(&self, operation: &str, failure: MockFailure) {
        lock(&self.failures).insert(operation.to_string(), failure);
    }

    /// Remove an injected failure
    pub fn clear_failure(&self, operation: &str) {
        lock(&self.failures).remove(operation);
    }

    /// Number of times `operation` has been called
    pub fn call_count(&self, operation: &str) -> usize {
        lock(&self.calls).get(operation).copied().unwrap_or(0)
    }

    /// Record a call and return the injected failure, if any
    pub(crate) fn record(&self, operation: &str) -> Result<(), OcmError> {
        *lock(&self.calls).entry(operation.to_string()).or_insert(0) += 1;
        match lock(&self.failures).get(operation) {
            Some(failure) => Err(failure.to_error(operation)),
            None => Ok(()),
        }
    }

    /// Answer creates without an id in the returned body
    pub fn omit_created_ids(&self) {
        *lock(&self.omit_ids) = true;
    }

    /// Id for a newly created object, `None` when ids are omitted
    pub(crate) fn created_id(&self, prefix: &str) -> Option<String> {
        if *lock(&self.omit_ids) {
            return None;
        }
        Some(self.generate_id(prefix))
    }

    /// Generate a unique id with the given prefix
    pub(crate) fn generate_id(&self, prefix: &str) -> String {
        let mut id = lock(&self.next_id);
        *id += 1;
        format!("{}-{}", prefix, *id)
    }
}

#[async_trait::async_trait]
impl ClusterManagementClient for MockOcmClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    // Clusters - delegated to clusters module
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Cluster, OcmError> {
        clusters::create_cluster(self, cluster)
    }

    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster, OcmError> {
        clusters::get_cluster(self, cluster_id)
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), OcmError> {
        clusters::delete_cluster(self, cluster_id)
    }

    async fn get_cluster_ingresses(&self, cluster_id: &str) -> Result<Vec<Ingress>, OcmError> {
        clusters::get_cluster_ingresses(self, cluster_id)
    }

    async fn scale_up_compute_nodes(&self, cluster_id: &str, increment: i64) -> Result<Cluster, OcmError> {
        clusters::adjust_compute_nodes(self, "scale_up_compute_nodes", cluster_id, increment)
    }

    async fn scale_down_compute_nodes(&self, cluster_id: &str, decrement: i64) -> Result<Cluster, OcmError> {
        clusters::adjust_compute_nodes(self, "scale_down_compute_nodes", cluster_id, -decrement)
    }

    async fn set_compute_nodes(&self, cluster_id: &str, nodes: i64) -> Result<Cluster, OcmError> {
        clusters::set_compute_nodes(self, cluster_id, nodes)
    }

    async fn get_machine_pool(&self, cluster_id: &str, machine_pool_id: &str) -> Result<Option<MachinePool>, OcmError> {
        clusters::get_machine_pool(self, cluster_id, machine_pool_id)
    }

    async fn create_machine_pool(&self, cluster_id: &str, machine_pool: &MachinePool) -> Result<MachinePool, OcmError> {
        clusters::create_machine_pool(self, cluster_id, machine_pool)
    }

    async fn get_existing_cluster_metrics(&self, cluster_id: &str) -> Result<Option<SubscriptionMetrics>, OcmError> {
        clusters::get_existing_cluster_metrics(self, cluster_id)
    }

    async fn get_cloud_providers(&self) -> Result<Vec<CloudProvider>, OcmError> {
        clusters::get_cloud_providers(self)
    }

    async fn get_regions(&self, cloud_provider_id: &str) -> Result<Vec<CloudRegion>, OcmError> {
        clusters::get_regions(self, cloud_provider_id)
    }

    // Addons - delegated to addons module
    async fn get_addon(&self, cluster_id: &str, addon_id: &str) -> Result<Option<AddOnInstallation>, OcmError> {
        addons::get_addon(self, cluster_id, addon_id)
    }

    async fn create_addon_with_params(
        &self,
        cluster_id: &str,
        addon_id: &str,
        parameters: &[AddOnInstallationParameter],
    ) -> Result<AddOnInstallation, OcmError> {
        addons::create_addon_with_params(self, cluster_id, addon_id, parameters)
    }

    async fn update_addon_parameters(
        &self,
        cluster_id: &str,
        addon_installation_id: &str,
        parameters: &[AddOnInstallationParameter],
    ) -> Result<AddOnInstallation, OcmError> {
        addons::update_addon_parameters(self, cluster_id, addon_installation_id, parameters)
    }

    // Identity providers and syncsets - delegated to configuration module
    async fn create_identity_provider(
        &self,
        cluster_id: &str,
        identity_provider: &IdentityProvider,
    ) -> Result<IdentityProvider, OcmError> {
        configuration::create_identity_provider(self, cluster_id, identity_provider)
    }

    async fn get_identity_providers(&self, cluster_id: &str) -> Result<Vec<IdentityProvider>, OcmError> {
        configuration::get_identity_providers(self, cluster_id)
    }

    async fn get_syncset(&self, cluster_id: &str, syncset_id: &str) -> Result<Syncset, OcmError> {
        configuration::get_syncset(self, cluster_id, syncset_id)
    }

    async fn create_syncset(&self, cluster_id: &str, syncset: &Syncset) -> Result<Syncset, OcmError> {
        configuration::create_syncset(self, cluster_id, syncset)
    }

    async fn update_syncset(&self, cluster_id: &str, syncset_id: &str, syncset: &Syncset) -> Result<Syncset, OcmError> {
        configuration::update_syncset(self, cluster_id, syncset_id, syncset)
    }

    async fn delete_syncset(&self, cluster_id: &str, syncset_id: &str) -> Result<(), OcmError> {
        configuration::delete_syncset(self, cluster_id, syncset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_injected_failure_is_counted_and_cleared() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.fail_on("get_cluster", MockFailure::Api("boom".to_string()));

        let err = mock.get_cluster("abc").await.unwrap_err();
        assert!(matches!(err, OcmError::Api(ref m) if m == "boom"));
        assert_eq!(mock.call_count("get_cluster"), 1);

        mock.clear_failure("get_cluster");
        let err = mock.get_cluster("abc").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(mock.call_count("get_cluster"), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockOcmClient::new("http://ocm.test");
        let other = mock.clone();
        other.add_cluster(Cluster {
            id: Some("shared".to_string()),
            ..Default::default()
        });
        assert!(mock.get_cluster("shared").await.is_ok());
    }
}
