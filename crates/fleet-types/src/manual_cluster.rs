//! Manual cluster catalog entries
//!
//! Entries are read from the `clusters:` list of the data-plane cluster
//! configuration file. Parsing applies defaults and rejects entries a
//! provider could not work with.

use crate::cluster::{ClusterProviderType, ClusterStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instance types a cluster accepts when the entry does not say
pub const ALL_INSTANCE_TYPES: &str = "standard,developer";

/// Errors raised while parsing a catalog entry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManualClusterError {
    #[error("cluster_id is empty")]
    MissingClusterId,

    #[error("Standalone cluster with id {0} does not have the cluster dns field provided")]
    MissingClusterDns(String),

    #[error("Standalone cluster with id {0} does not have the name field provided")]
    MissingName(String),
}

/// Known cluster listed in the configuration catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawManualCluster")]
pub struct ManualCluster {
    pub name: String,
    pub cluster_id: String,
    pub cloud_provider: String,
    pub region: String,
    pub multi_az: bool,
    pub schedulable: bool,
    /// Maximum Kafka instances on the cluster, `-1` for no limit
    pub kafka_instance_limit: i64,
    pub status: ClusterStatus,
    pub provider_type: ClusterProviderType,
    pub cluster_dns: String,
    /// Comma separated instance types, e.g. `standard,developer`
    pub supported_instance_type: String,
}

#[derive(Deserialize)]
struct RawManualCluster {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cluster_id: String,
    #[serde(default)]
    cloud_provider: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    multi_az: bool,
    #[serde(default)]
    schedulable: bool,
    #[serde(default)]
    kafka_instance_limit: i64,
    #[serde(default)]
    status: Option<ClusterStatus>,
    #[serde(default)]
    provider_type: ClusterProviderType,
    #[serde(default)]
    cluster_dns: String,
    #[serde(default)]
    supported_instance_type: String,
}

impl TryFrom<RawManualCluster> for ManualCluster {
    type Error = ManualClusterError;

    fn try_from(raw: RawManualCluster) -> Result<Self, Self::Error> {
        if raw.cluster_id.is_empty() {
            return Err(ManualClusterError::MissingClusterId);
        }

        let mut status = raw.status.unwrap_or(ClusterStatus::Provisioning);
        if raw.provider_type == ClusterProviderType::Standalone {
            if raw.cluster_dns.is_empty() {
                return Err(ManualClusterError::MissingClusterDns(raw.cluster_id));
            }
            if raw.name.is_empty() {
                return Err(ManualClusterError::MissingName(raw.cluster_id));
            }
            // standalone clusters already exist and are never created by a provider
            status = ClusterStatus::Provisioning;
        }

        let supported_instance_type = if raw.supported_instance_type.is_empty() {
            ALL_INSTANCE_TYPES.to_string()
        } else {
            raw.supported_instance_type
        };

        Ok(ManualCluster {
            name: raw.name,
            cluster_id: raw.cluster_id,
            cloud_provider: raw.cloud_provider,
            region: raw.region,
            multi_az: raw.multi_az,
            schedulable: raw.schedulable,
            kafka_instance_limit: raw.kafka_instance_limit,
            status,
            provider_type: raw.provider_type,
            cluster_dns: raw.cluster_dns,
            supported_instance_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let cluster: ManualCluster = serde_yaml::from_str(
            r#"
cluster_id: "abc"
region: us-east-1
schedulable: true
kafka_instance_limit: 5
"#,
        )
        .unwrap();
        assert_eq!(cluster.status, ClusterStatus::Provisioning);
        assert_eq!(cluster.provider_type, ClusterProviderType::Ocm);
        assert_eq!(cluster.supported_instance_type, ALL_INSTANCE_TYPES);
    }

    #[test]
    fn test_missing_cluster_id_rejected() {
        let err = serde_yaml::from_str::<ManualCluster>("name: foo\n").unwrap_err();
        assert!(err.to_string().contains("cluster_id is empty"));
    }

    #[test]
    fn test_standalone_requires_dns_and_name() {
        let err = serde_yaml::from_str::<ManualCluster>(
            "cluster_id: abc\nprovider_type: standalone\nname: ctx\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("cluster dns"));

        let err = serde_yaml::from_str::<ManualCluster>(
            "cluster_id: abc\nprovider_type: standalone\ncluster_dns: apps.example.com\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("name field"));
    }

    #[test]
    fn test_standalone_forced_to_provisioning() {
        let cluster: ManualCluster = serde_yaml::from_str(
            r#"
cluster_id: abc
name: my-context
provider_type: standalone
cluster_dns: apps.example.com
status: ready
"#,
        )
        .unwrap();
        assert_eq!(cluster.status, ClusterStatus::Provisioning);

        let ocm: ManualCluster =
            serde_yaml::from_str("cluster_id: def\nstatus: ready\n").unwrap();
        assert_eq!(ocm.status, ClusterStatus::Ready);
    }

    #[test]
    fn test_unknown_provider_type_rejected() {
        assert!(serde_yaml::from_str::<ManualCluster>("cluster_id: abc\nprovider_type: gke\n").is_err());
    }
}
