//! Cluster request and spec types
//!
//! A `ClusterSpec` is the fleet manager's view of a data-plane cluster.
//! Providers take a snapshot of it and hand back an updated copy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status of a data-plane cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    /// Accepted by the fleet manager, nothing requested yet
    #[serde(rename = "cluster_accepted")]
    Accepted,
    /// Creation requested from the backend
    #[default]
    #[serde(rename = "cluster_provisioning")]
    Provisioning,
    /// Backend reports the cluster as ready
    #[serde(rename = "cluster_provisioned")]
    Provisioned,
    /// Provisioned, waiting for the fleetshard operator to report in
    WaitingForKasFleetshardOperator,
    /// Accepting Kafka instances
    Ready,
    /// Removal requested
    Deprovisioning,
    /// Removal finished, records being cleaned up
    Cleanup,
    /// Provisioning failed
    Failed,
    /// No capacity left
    Full,
}

impl ClusterStatus {
    /// All statuses in lifecycle order
    pub const ALL: [ClusterStatus; 9] = [
        ClusterStatus::Accepted,
        ClusterStatus::Provisioning,
        ClusterStatus::Provisioned,
        ClusterStatus::WaitingForKasFleetshardOperator,
        ClusterStatus::Ready,
        ClusterStatus::Deprovisioning,
        ClusterStatus::Cleanup,
        ClusterStatus::Failed,
        ClusterStatus::Full,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterStatus::Accepted => "cluster_accepted",
            ClusterStatus::Provisioning => "cluster_provisioning",
            ClusterStatus::Provisioned => "cluster_provisioned",
            ClusterStatus::WaitingForKasFleetshardOperator => "waiting_for_kas_fleetshard_operator",
            ClusterStatus::Ready => "ready",
            ClusterStatus::Deprovisioning => "deprovisioning",
            ClusterStatus::Cleanup => "cleanup",
            ClusterStatus::Failed => "failed",
            ClusterStatus::Full => "full",
        }
    }

    /// Statuses of a cluster that is being torn down
    pub fn is_deletion_status(&self) -> bool {
        matches!(self, ClusterStatus::Deprovisioning | ClusterStatus::Cleanup)
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown cluster status or provider type string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for ClusterStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClusterStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "cluster status",
                value: s.to_string(),
            })
    }
}

/// Backend that manages a cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String", into = "String")]
pub enum ClusterProviderType {
    /// Managed through the cluster management service
    #[default]
    Ocm,
    /// Existing cluster reached directly through a kubeconfig context
    Standalone,
}

impl ClusterProviderType {
    /// Wire name of the provider type
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterProviderType::Ocm => "ocm",
            ClusterProviderType::Standalone => "standalone",
        }
    }
}

impl fmt::Display for ClusterProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterProviderType {
    type Err = ParseEnumError;

    /// An empty string selects the default (`ocm`) provider.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "ocm" => Ok(ClusterProviderType::Ocm),
            "standalone" => Ok(ClusterProviderType::Standalone),
            other => Err(ParseEnumError {
                kind: "cluster provider type",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ClusterProviderType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClusterProviderType> for String {
    fn from(value: ClusterProviderType) -> Self {
        value.as_str().to_string()
    }
}

/// Request for a new data-plane cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClusterRequest {
    pub cloud_provider: String,
    pub region: String,
    #[serde(default)]
    pub multi_az: bool,
    #[serde(default)]
    pub additional_spec: serde_json::Value,
}

/// Observed state of a data-plane cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClusterSpec {
    /// Id assigned by the backend when the cluster was requested
    pub internal_id: String,
    /// Id of the running cluster, known once it is provisioned
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub status: Option<ClusterStatus>,
    #[serde(default)]
    pub status_details: String,
    #[serde(default)]
    pub additional_info: serde_json::Value,
}

impl ClusterSpec {
    /// Spec of a cluster known only by its id
    pub fn new(internal_id: impl Into<String>) -> Self {
        Self {
            internal_id: internal_id.into(),
            ..Default::default()
        }
    }

    /// Status, treating an unset value as provisioning
    pub fn status_or_default(&self) -> ClusterStatus {
        self.status.unwrap_or_default()
    }
}

/// Named, ordered bundle of raw Kubernetes objects reconciled together
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResourceSet {
    pub name: String,
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
}

impl ResourceSet {
    pub fn new(name: impl Into<String>, resources: Vec<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            resources,
        }
    }
}

/// Actual and desired compute node counts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ComputeNodesInfo {
    pub actual: i64,
    pub desired: i64,
}

/// Addon or operator parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub id: String,
    pub value: String,
}

impl Parameter {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}
