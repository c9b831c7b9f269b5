//! Cluster management API models
//!
//! These models match the `clusters_mgmt/v1` and `accounts_mgmt/v1` JSON
//! representations. Every field is optional on the wire; the API omits
//! attributes it has no value for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// List response wrapper used by every collection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Reference to another object by id (cloud provider, region, version, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl ObjectReference {
    /// Reference an object by id only
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            href: None,
        }
    }
}

/// Cluster model matching the clusters_mgmt `Cluster` type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_az: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccs: Option<Ccs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<ClusterNodes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ClusterState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl Cluster {
    /// Desired compute node count, if the cluster reports one
    pub fn desired_compute_nodes(&self) -> Option<i64> {
        self.nodes.as_ref().and_then(|n| n.compute)
    }

    /// Current state, preferring the detailed status block over the top-level field
    pub fn current_state(&self) -> ClusterState {
        self.status
            .as_ref()
            .and_then(|s| s.state.clone())
            .or_else(|| self.state.clone())
            .unwrap_or(ClusterState::Unknown)
    }
}

/// Customer cloud subscription settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ccs {
    pub enabled: bool,
}

/// AWS account credentials used to provision a CCS cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

/// Node layout of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNodes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_machine_type: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale_compute: Option<MachinePoolAutoscaling>,
}

/// Autoscaling bounds of the default machine pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachinePoolAutoscaling {
    pub min_replicas: i64,
    pub max_replicas: i64,
}

/// Additional machine pool of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachinePool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<MachinePoolAutoscaling>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
}

/// Node taint applied to every node of a machine pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    #[serde(default)]
    pub value: String,
    pub effect: String,
}

/// Detailed provisioning status of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ClusterState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision_error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision_error_message: Option<String>,
}

/// Cluster state as reported by the cluster service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterState {
    Ready,
    Error,
    Installing,
    Pending,
    Validating,
    Waiting,
    Uninstalling,
    Hibernating,
    Resuming,
    PoweringDown,
    #[serde(other)]
    Unknown,
}

/// Ingress of a cluster; the default ingress carries the cluster DNS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    #[serde(default)]
    pub default: bool,
}

/// Cloud provider supported by the cluster service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProvider {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// Region of a cloud provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudRegion {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<ObjectReference>,
    #[serde(default)]
    pub supports_multi_az: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Addon installation on a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnInstallation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<AddOnInstallationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<AddOnInstallationParameterList>,
}

impl AddOnInstallation {
    /// Returns true once the addon reports the `ready` state
    pub fn is_ready(&self) -> bool {
        self.state == Some(AddOnInstallationState::Ready)
    }
}

/// Addon installation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnInstallationState {
    Ready,
    Installing,
    Pending,
    Failed,
    Deleting,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// Parameter list as serialized inside an addon installation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnInstallationParameterList {
    #[serde(default = "Vec::new")]
    pub items: Vec<AddOnInstallationParameter>,
}

/// Single addon parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnInstallationParameter {
    pub id: String,
    pub value: String,
}

/// Syncset: a bundle of raw Kubernetes resources synced onto a cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Syncset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default = "Vec::new")]
    pub resources: Vec<serde_json::Value>,
}

/// Identity provider configured on a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<OpenIdIdentityProvider>,
}

/// OpenID connect settings of an identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdIdentityProvider {
    pub client_id: String,
    pub client_secret: String,
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<OpenIdClaims>,
}

/// Claim mapping of an OpenID identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdClaims {
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default)]
    pub preferred_username: Vec<String>,
    #[serde(default)]
    pub name: Vec<String>,
}

/// Subscription as returned by accounts_mgmt, only the metrics are used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(default = "Vec::new")]
    pub metrics: Vec<SubscriptionMetrics>,
}

/// Observed metrics of a cluster subscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodesMetric>,
}

/// Observed node counts per role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodesMetric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infra: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_state_from_status_block() {
        let cluster: Cluster = serde_json::from_value(serde_json::json!({
            "id": "1234",
            "state": "installing",
            "status": {"state": "error", "provision_error_message": "quota exceeded"},
            "creation_timestamp": "2022-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(cluster.current_state(), ClusterState::Error);
        assert!(cluster.creation_timestamp.is_some());
    }

    #[test]
    fn test_unknown_states_are_tolerated() {
        let cluster: Cluster =
            serde_json::from_value(serde_json::json!({"state": "something_new"})).unwrap();
        assert_eq!(cluster.current_state(), ClusterState::Unknown);

        let addon: AddOnInstallation =
            serde_json::from_value(serde_json::json!({"id": "managed-kafka", "state": "upgrading"}))
                .unwrap();
        assert!(!addon.is_ready());
    }

    #[test]
    fn test_identity_provider_type_field_name() {
        let idp = IdentityProvider {
            name: Some("Kafka_SRE".to_string()),
            kind: Some("OpenIDIdentityProvider".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&idp).unwrap();
        assert_eq!(value["type"], "OpenIDIdentityProvider");
        assert!(value.get("kind").is_none(), "type must be serialized as 'type'");
    }
}
