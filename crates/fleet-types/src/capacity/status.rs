//! Validated data-plane cluster status

use serde::{Deserialize, Serialize};

/// Fully validated status report
///
/// Sections absent from the report stay `None`; strimzi versions are sorted
/// ascending at every level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DataPlaneClusterStatus {
    pub conditions: Vec<StatusCondition>,
    pub total: Option<Capacity>,
    pub remaining: Option<Capacity>,
    pub node_info: Option<NodeInfo>,
    pub resize_info: Option<ResizeInfo>,
    pub strimzi: Vec<StrimziVersion>,
}

impl DataPlaneClusterStatus {
    /// Strimzi versions the agent reports as ready, oldest first
    pub fn ready_strimzi_versions(&self) -> impl Iterator<Item = &StrimziVersion> {
        self.strimzi.iter().filter(|s| s.ready)
    }

    /// Most recent ready strimzi version
    pub fn latest_ready_strimzi_version(&self) -> Option<&StrimziVersion> {
        self.ready_strimzi_versions().last()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusCondition {
    pub kind: String,
    pub reason: String,
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Capacity {
    pub connections: i64,
    pub data_retention_size: String,
    pub ingress_throughput_per_sec: String,
    pub egress_throughput_per_sec: String,
    pub partitions: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NodeInfo {
    pub ceiling: i64,
    pub floor: i64,
    pub current: i64,
    pub current_work_load_minimum: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResizeInfo {
    pub node_delta: i64,
    pub delta: Capacity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StrimziVersion {
    pub version: String,
    pub ready: bool,
    /// Kafka versions, oldest first
    pub kafka_versions: Vec<String>,
    /// Kafka inter-broker protocol versions, oldest first
    pub kafka_ibp_versions: Vec<String>,
}

impl StrimziVersion {
    pub fn latest_kafka_version(&self) -> Option<&str> {
        self.kafka_versions.last().map(String::as_str)
    }

    pub fn latest_kafka_ibp_version(&self) -> Option<&str> {
        self.kafka_ibp_versions.last().map(String::as_str)
    }
}
