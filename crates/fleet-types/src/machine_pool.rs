//! Additional machine pools of data-plane clusters

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Taint placed on every node of a machine pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClusterNodeTaint {
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// `NoSchedule`, `PreferNoSchedule` or `NoExecute`
    pub effect: String,
}

/// Autoscaling bounds of a machine pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MachinePoolAutoScaling {
    pub min_nodes: i64,
    pub max_nodes: i64,
}

/// Machine pool as reported by a provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MachinePoolInfo {
    pub id: String,
    pub instance_size: String,
    /// Nodes are spread over more than one availability zone
    pub multi_az: bool,
    pub auto_scaling_enabled: bool,
    #[serde(default)]
    pub auto_scaling: MachinePoolAutoScaling,
    #[serde(default)]
    pub node_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub node_taints: Vec<ClusterNodeTaint>,
}

/// Request for a new machine pool on an existing cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MachinePoolRequest {
    pub id: String,
    pub cluster_id: String,
    pub instance_size: String,
    pub multi_az: bool,
    pub auto_scaling_enabled: bool,
    #[serde(default)]
    pub auto_scaling: MachinePoolAutoScaling,
    #[serde(default)]
    pub node_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub node_taints: Vec<ClusterNodeTaint>,
}

impl MachinePoolAutoScaling {
    /// Bounds with both ends rounded up to the next multiple of `multiple`
    pub fn rounded_up(self, multiple: i64) -> Self {
        Self {
            min_nodes: round_up(self.min_nodes, multiple),
            max_nodes: round_up(self.max_nodes, multiple),
        }
    }
}

/// Smallest multiple of `multiple` not below `value`
pub fn round_up(value: i64, multiple: i64) -> i64 {
    if multiple <= 0 {
        return value;
    }
    let remainder = value.rem_euclid(multiple);
    if remainder == 0 {
        value
    } else {
        value + multiple - remainder
    }
}
