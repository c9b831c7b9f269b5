//! Data-plane capacity and resize reporting
//!
//! Agents running on each data-plane cluster periodically send a
//! [`DataPlaneClusterUpdateStatusRequest`]. Placement and scaling decisions
//! only ever see the validated [`DataPlaneClusterStatus`].
//!
//! Validation rules:
//! - every section is optional, but a section that is present must be complete
//! - counts are taken as reported, negative values included
//! - each strimzi entry needs a version and non-empty Kafka and IBP version
//!   lists; a missing ready flag means not ready
//! - conditions are carried through unchecked
//!
//! All field errors of a report are collected before failing.

mod status;
mod version;
mod wire;

pub use status::*;
pub use version::{compare_strimzi_versions, compare_versions, strimzi_versions_deep_sort, VersionError};
pub use wire::*;

use std::fmt;
use thiserror::Error;

/// Validation failure of a single report field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the field, e.g. `nodeInfo.ceiling` or `strimzi[1].version`
    pub field: String,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every field error found in a report
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns true when `field` failed validation
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Errors returned when a status report is rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusReportError {
    #[error("invalid data plane cluster status: {0}")]
    Validation(ValidationErrors),

    #[error("invalid strimzi versions: {0}")]
    Version(#[from] VersionError),
}

const REQUIRED: &str = "is required";
const NOT_EMPTY: &str = "must not be empty";

#[derive(Default)]
struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn fail(&mut self, field: String, reason: &str) {
        self.errors.push(FieldError {
            field,
            reason: reason.to_string(),
        });
    }

    fn require<T>(&mut self, path: &str, name: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.fail(format!("{}.{}", path, name), REQUIRED);
        }
        value
    }

    fn count(&mut self, path: &str, name: &str, value: Option<i64>) -> Option<i64> {
        self.require(path, name, value)
    }

    fn quantity(&mut self, path: &str, name: &str, value: Option<String>) -> Option<String> {
        let value = self.require(path, name, value)?;
        if value.trim().is_empty() {
            self.fail(format!("{}.{}", path, name), NOT_EMPTY);
            return None;
        }
        Some(value)
    }

    fn capacity(&mut self, path: &str, report: CapacityReport) -> Option<Capacity> {
        let connections = self.count(path, "connections", report.connections);
        let data_retention_size = self.quantity(path, "dataRetentionSize", report.data_retention_size);
        let ingress = self.quantity(path, "ingressThroughputPerSec", report.ingress_throughput_per_sec);
        let egress = self.quantity(path, "egressThroughputPerSec", report.egress_throughput_per_sec);
        let partitions = self.count(path, "partitions", report.partitions);

        Some(Capacity {
            connections: connections?,
            data_retention_size: data_retention_size?,
            ingress_throughput_per_sec: ingress?,
            egress_throughput_per_sec: egress?,
            partitions: partitions?,
        })
    }

    fn node_info(&mut self, report: NodeInfoReport) -> Option<NodeInfo> {
        let path = "nodeInfo";
        let ceiling = self.count(path, "ceiling", report.ceiling);
        let floor = self.count(path, "floor", report.floor);
        let current = self.count(path, "current", report.current);
        let minimum = self.count(path, "currentWorkLoadMinimum", report.current_work_load_minimum);

        Some(NodeInfo {
            ceiling: ceiling?,
            floor: floor?,
            current: current?,
            current_work_load_minimum: minimum?,
        })
    }

    fn resize_info(&mut self, report: ResizeInfoReport) -> Option<ResizeInfo> {
        let path = "resizeInfo";
        let node_delta = self.count(path, "nodeDelta", report.node_delta);
        let delta = self
            .require(path, "delta", report.delta)
            .and_then(|delta| self.capacity("resizeInfo.delta", delta));

        Some(ResizeInfo {
            node_delta: node_delta?,
            delta: delta?,
        })
    }

    fn strimzi(&mut self, index: usize, report: StrimziReport) -> Option<StrimziVersion> {
        let path = format!("strimzi[{}]", index);
        let version = self.quantity(&path, "version", report.version);
        if report.kafka_versions.is_empty() {
            self.fail(format!("{}.kafkaVersions", path), NOT_EMPTY);
        }
        if report.kafka_ibp_versions.is_empty() {
            self.fail(format!("{}.kafkaIbpVersions", path), NOT_EMPTY);
        }
        if report.kafka_versions.is_empty() || report.kafka_ibp_versions.is_empty() {
            return None;
        }

        Some(StrimziVersion {
            version: version?,
            ready: report.ready.unwrap_or(false),
            kafka_versions: report.kafka_versions,
            kafka_ibp_versions: report.kafka_ibp_versions,
        })
    }
}

/// Validate a status report and convert it into its typed form
pub fn validate_status_report(
    request: DataPlaneClusterUpdateStatusRequest,
) -> Result<DataPlaneClusterStatus, StatusReportError> {
    let mut validator = Validator::default();

    let node_info = request.node_info.and_then(|n| validator.node_info(n));
    let resize_info = request.resize_info.and_then(|r| validator.resize_info(r));
    let total = request.total.and_then(|t| validator.capacity("total", t));
    let remaining = request.remaining.and_then(|r| validator.capacity("remaining", r));
    let strimzi: Vec<StrimziVersion> = request
        .strimzi
        .into_iter()
        .enumerate()
        .filter_map(|(i, s)| validator.strimzi(i, s))
        .collect();

    if !validator.errors.is_empty() {
        return Err(StatusReportError::Validation(ValidationErrors(validator.errors)));
    }

    let conditions = request
        .conditions
        .into_iter()
        .map(|c| StatusCondition {
            kind: c.kind.unwrap_or_default(),
            reason: c.reason.unwrap_or_default(),
            message: c.message.unwrap_or_default(),
            status: c.status.unwrap_or_default(),
        })
        .collect();

    Ok(DataPlaneClusterStatus {
        conditions,
        total,
        remaining,
        node_info,
        resize_info,
        strimzi: strimzi_versions_deep_sort(strimzi)?,
    })
}

impl TryFrom<DataPlaneClusterUpdateStatusRequest> for DataPlaneClusterStatus {
    type Error = StatusReportError;

    fn try_from(request: DataPlaneClusterUpdateStatusRequest) -> Result<Self, Self::Error> {
        validate_status_report(request)
    }
}

/// JSON schema of the status report body
pub fn status_report_schema() -> schemars::Schema {
    schemars::schema_for!(DataPlaneClusterUpdateStatusRequest)
}
