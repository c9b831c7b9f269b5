//! Cluster creation payloads
//!
//! [`ClusterBuilder`] turns a [`ClusterRequest`] into the cluster object the
//! cluster management service expects on create.

use crate::config::{AwsConfig, DataplaneClusterConfig};
use crate::error::{ProviderError, Result};
use fleet_types::ClusterRequest;
use ocm_client::{
    AwsCredentials, Ccs, Cluster, ClusterNodes, MachinePoolAutoscaling, ObjectReference,
};
use std::sync::Arc;

/// Prefix of generated cluster names
pub const CLUSTER_NAME_PREFIX: &str = "mk-";

pub const MIN_NODES_FOR_DEFAULT_MACHINE_POOL: i64 = 3;
pub const MAX_NODES_FOR_DEFAULT_MACHINE_POOL: i64 = 18;

/// Generates unique cluster names
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates `<prefix><id>` where the id always starts with a letter
#[derive(Debug, Clone)]
pub struct PrefixedIdGenerator {
    prefix: String,
}

impl PrefixedIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for PrefixedIdGenerator {
    fn default() -> Self {
        Self::new(CLUSTER_NAME_PREFIX)
    }
}

impl IdGenerator for PrefixedIdGenerator {
    fn generate(&self) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut chars = id.chars();
        let first = match chars.next() {
            Some(c) if c.is_ascii_digit() => char::from(b'a' + (c as u8 - b'0')),
            Some(c) => c,
            None => 'a',
        };
        format!("{}{}{}", self.prefix, first, chars.as_str())
    }
}

/// Builds cluster creation payloads
///
/// Every collaborator is optional so a partially configured builder fails
/// with a configuration error instead of producing a half-filled payload.
#[derive(Clone, Default)]
pub struct ClusterBuilder {
    id_generator: Option<Arc<dyn IdGenerator>>,
    aws_config: Option<AwsConfig>,
    dataplane_config: Option<Arc<DataplaneClusterConfig>>,
}

impl std::fmt::Debug for ClusterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterBuilder")
            .field("id_generator", &self.id_generator.is_some())
            .field("aws_config", &self.aws_config)
            .field("dataplane_config", &self.dataplane_config.is_some())
            .finish()
    }
}

impl ClusterBuilder {
    /// Builder using the default `mk-` name generator
    pub fn new(aws_config: AwsConfig, dataplane_config: Arc<DataplaneClusterConfig>) -> Self {
        Self {
            id_generator: Some(Arc::new(PrefixedIdGenerator::default())),
            aws_config: Some(aws_config),
            dataplane_config: Some(dataplane_config),
        }
    }

    pub fn with_id_generator(mut self, id_generator: Option<Arc<dyn IdGenerator>>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn with_aws_config(mut self, aws_config: Option<AwsConfig>) -> Self {
        self.aws_config = aws_config;
        self
    }

    pub fn with_dataplane_config(mut self, dataplane_config: Option<Arc<DataplaneClusterConfig>>) -> Self {
        self.dataplane_config = dataplane_config;
        self
    }

    /// Build the creation payload for `request`
    ///
    /// The builder configuration is checked before the request. Multi-AZ,
    /// CCS and managed are always enabled whatever the request asks for.
    pub fn build(&self, request: Option<&ClusterRequest>) -> Result<Cluster> {
        let id_generator = self
            .id_generator
            .as_ref()
            .ok_or_else(|| ProviderError::Configuration("id generator is not defined".to_string()))?;
        let aws = self
            .aws_config
            .as_ref()
            .ok_or_else(|| ProviderError::Configuration("AWS config is not defined".to_string()))?;
        let dataplane = self.dataplane_config.as_ref().ok_or_else(|| {
            ProviderError::Configuration("data plane cluster config is not defined".to_string())
        })?;
        let request =
            request.ok_or_else(|| ProviderError::InvalidArgument("cluster request is missing".to_string()))?;

        let version = (!dataplane.openshift_version.is_empty())
            .then(|| ObjectReference::with_id(dataplane.openshift_version.as_str()));

        Ok(Cluster {
            name: Some(id_generator.generate()),
            cloud_provider: Some(ObjectReference::with_id(request.cloud_provider.as_str())),
            region: Some(ObjectReference::with_id(request.region.as_str())),
            multi_az: Some(true),
            version,
            ccs: Some(Ccs { enabled: true }),
            managed: Some(true),
            aws: Some(AwsCredentials {
                account_id: Some(aws.account_id.clone()),
                access_key_id: Some(aws.access_key.clone()),
                secret_access_key: Some(aws.secret_access_key.clone()),
            }),
            nodes: Some(ClusterNodes {
                compute: None,
                compute_machine_type: Some(ObjectReference::with_id(dataplane.compute_machine_type.as_str())),
                autoscale_compute: Some(MachinePoolAutoscaling {
                    min_replicas: MIN_NODES_FOR_DEFAULT_MACHINE_POOL,
                    max_replicas: MAX_NODES_FOR_DEFAULT_MACHINE_POOL,
                }),
            }),
            ..Cluster::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedId;

    impl IdGenerator for FixedId {
        fn generate(&self) -> String {
            "mk-fixed".to_string()
        }
    }

    fn aws() -> AwsConfig {
        AwsConfig {
            account_id: "123456789012".to_string(),
            access_key: "AKIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
        }
    }

    fn request() -> ClusterRequest {
        ClusterRequest {
            cloud_provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            multi_az: false,
            additional_spec: serde_json::Value::Null,
        }
    }

    fn builder() -> ClusterBuilder {
        ClusterBuilder::new(aws(), Arc::new(DataplaneClusterConfig::default()))
            .with_id_generator(Some(Arc::new(FixedId)))
    }

    #[test]
    fn test_generated_names_start_with_a_letter() {
        let generator = PrefixedIdGenerator::default();
        for _ in 0..50 {
            let name = generator.generate();
            let id = name.strip_prefix(CLUSTER_NAME_PREFIX).unwrap();
            assert!(id.chars().next().unwrap().is_ascii_alphabetic(), "{}", name);
        }
        assert_ne!(generator.generate(), generator.generate());
    }

    #[test]
    fn test_build_applies_fixed_policy() {
        let cluster = builder().build(Some(&request())).unwrap();

        assert_eq!(cluster.name.as_deref(), Some("mk-fixed"));
        assert_eq!(cluster.multi_az, Some(true));
        assert_eq!(cluster.managed, Some(true));
        assert_eq!(cluster.ccs, Some(Ccs { enabled: true }));
        assert_eq!(cluster.cloud_provider, Some(ObjectReference::with_id("aws")));
        assert_eq!(cluster.region, Some(ObjectReference::with_id("us-east-1")));
        assert!(cluster.version.is_none());

        let aws = cluster.aws.unwrap();
        assert_eq!(aws.account_id.as_deref(), Some("123456789012"));
        assert_eq!(aws.access_key_id.as_deref(), Some("AKIAEXAMPLE"));

        let nodes = cluster.nodes.unwrap();
        assert_eq!(nodes.compute_machine_type, Some(ObjectReference::with_id("m5.2xlarge")));
        assert_eq!(
            nodes.autoscale_compute,
            Some(MachinePoolAutoscaling {
                min_replicas: 3,
                max_replicas: 18
            })
        );
    }

    #[test]
    fn test_build_sets_version_when_configured() {
        let dataplane = DataplaneClusterConfig {
            openshift_version: "openshift-v4.9.15".to_string(),
            ..DataplaneClusterConfig::default()
        };
        let cluster = builder()
            .with_dataplane_config(Some(Arc::new(dataplane)))
            .build(Some(&request()))
            .unwrap();
        assert_eq!(cluster.version, Some(ObjectReference::with_id("openshift-v4.9.15")));
    }

    #[test]
    fn test_missing_configuration_fails_before_request() {
        let cases = [
            builder().with_id_generator(None),
            builder().with_aws_config(None),
            builder().with_dataplane_config(None),
        ];
        for builder in cases {
            assert!(matches!(builder.build(Some(&request())), Err(ProviderError::Configuration(_))));
            assert!(matches!(builder.build(None), Err(ProviderError::Configuration(_))));
        }
    }

    #[test]
    fn test_missing_request() {
        assert!(matches!(builder().build(None), Err(ProviderError::InvalidArgument(_))));
    }
}
