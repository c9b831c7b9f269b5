//! Cluster provider contract

use crate::context::RequestContext;
use crate::error::Result;
use fleet_types::{
    CloudProviderInfo, CloudProviderRegionInfo, ClusterRequest, ClusterSpec, ComputeNodesInfo,
    IdentityProviderInfo, MachinePoolInfo, MachinePoolRequest, Parameter, ResourceSet,
};
use std::fmt;

/// Operators a provider can install on a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagedOperator {
    Strimzi,
    ClusterLogging,
    Fleetshard,
}

impl fmt::Display for ManagedOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManagedOperator::Strimzi => "strimzi operator",
            ManagedOperator::ClusterLogging => "cluster logging operator",
            ManagedOperator::Fleetshard => "kas-fleetshard operator",
        };
        f.write_str(name)
    }
}

/// Lifecycle and configuration operations of a cluster backend
///
/// Calls take a snapshot of the cluster spec and return an updated value.
/// Every call makes one remote round trip, or a small bounded number, and
/// never retries.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Request a new cluster. Returns `None` for backends that never create clusters.
    async fn create(&self, ctx: &RequestContext, request: &ClusterRequest) -> Result<Option<ClusterSpec>>;

    /// Request deletion. Returns true once the backend no longer knows the cluster.
    async fn delete(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<bool>;

    /// Refresh the status of a cluster being provisioned
    async fn check_cluster_status(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<ClusterSpec>;

    /// Current spec of a cluster known only by its id
    ///
    /// The status is provisioned, failed or provisioning.
    async fn get_cluster_spec(&self, ctx: &RequestContext, cluster_id: &str) -> Result<ClusterSpec>;

    /// DNS name of the cluster's default ingress
    async fn get_cluster_dns(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<String>;

    /// Push `resources` to the cluster, skipping objects that did not change
    async fn apply_resources(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        resources: ResourceSet,
    ) -> Result<ResourceSet>;

    /// Remove a previously applied resource set
    async fn remove_resources(&self, ctx: &RequestContext, spec: &ClusterSpec, name: &str) -> Result<()>;

    /// Register an identity provider; `None` when there is nothing to register
    async fn add_identity_provider(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        identity_provider: IdentityProviderInfo,
    ) -> Result<Option<IdentityProviderInfo>>;

    async fn scale_up(&self, ctx: &RequestContext, spec: &ClusterSpec, increment: i64) -> Result<ClusterSpec>;

    async fn scale_down(&self, ctx: &RequestContext, spec: &ClusterSpec, decrement: i64) -> Result<ClusterSpec>;

    async fn set_compute_nodes(&self, ctx: &RequestContext, spec: &ClusterSpec, nodes: i64) -> Result<ClusterSpec>;

    async fn get_compute_nodes(&self, ctx: &RequestContext, spec: &ClusterSpec) -> Result<ComputeNodesInfo>;

    /// Machine pool `machine_pool_id` of the cluster, `None` when it does not exist
    async fn get_machine_pool(
        &self,
        ctx: &RequestContext,
        cluster_id: &str,
        machine_pool_id: &str,
    ) -> Result<Option<MachinePoolInfo>>;

    /// Add a machine pool to an existing cluster, returning the request with the bounds actually sent
    async fn create_machine_pool(&self, ctx: &RequestContext, request: &MachinePoolRequest) -> Result<MachinePoolRequest>;

    /// Install or update an operator. Returns true once the operator is ready.
    async fn install_operator(
        &self,
        ctx: &RequestContext,
        spec: &ClusterSpec,
        operator: ManagedOperator,
        parameters: &[Parameter],
    ) -> Result<bool>;

    async fn get_cloud_providers(&self, ctx: &RequestContext) -> Result<Vec<CloudProviderInfo>>;

    async fn get_cloud_provider_regions(
        &self,
        ctx: &RequestContext,
        provider: &CloudProviderInfo,
    ) -> Result<Vec<CloudProviderRegionInfo>>;
}
