//! Data-plane status report as sent by the fleetshard agent
//!
//! Every field is optional on the wire; see [`super::validate_status_report`]
//! for the rules a report must satisfy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status report body
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataPlaneClusterUpdateStatusRequest {
    /// Conditions reported by the agent, passed through as-is
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionReport>,

    /// Total capacity of the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<CapacityReport>,

    /// Capacity still available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<CapacityReport>,

    /// Scaling envelope of the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_info: Option<NodeInfoReport>,

    /// Capacity added by the next scaling step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_info: Option<ResizeInfoReport>,

    /// Strimzi operator versions installed on the cluster
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strimzi: Vec<StrimziReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConditionReport {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Capacity quantities; sizes and throughputs are Kubernetes quantity strings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_retention_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_throughput_per_sec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress_throughput_per_sec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfoReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_work_load_minimum: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResizeInfoReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<CapacityReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StrimziReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
    #[serde(default)]
    pub kafka_versions: Vec<String>,
    #[serde(default)]
    pub kafka_ibp_versions: Vec<String>,
}
