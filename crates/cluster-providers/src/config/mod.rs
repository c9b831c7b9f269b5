//! Provider configuration
//!
//! Everything is read from environment variables, with the data-plane
//! cluster catalog and operator subscription configs read from files by
//! [`DataplaneClusterConfig::read_files`].

mod catalog;
mod dataplane;

pub use catalog::ClusterConfig;
pub use dataplane::{
    DataplaneClusterConfig, OperatorInstallationConfig, ScalingType, DEFAULT_CLUSTER_CONFIG_FILE,
    DEFAULT_COMPUTE_MACHINE_TYPE,
};

use std::env;

/// Environment lookup; tests pass a map instead of the process environment
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub(crate) fn process_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

pub const DEFAULT_OCM_URL: &str = "https://api.openshift.com";
pub const DEFAULT_STRIMZI_OPERATOR_ADDON_ID: &str = "managed-kafka";
pub const DEFAULT_KAS_FLEETSHARD_ADDON_ID: &str = "kas-fleetshard-operator";
pub const DEFAULT_CLUSTER_LOGGING_OPERATOR_ADDON_ID: &str = "cluster-logging-operator";

/// AWS account used for customer-cloud clusters
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AwsConfig {
    pub account_id: String,
    pub access_key: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsConfig")
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl AwsConfig {
    /// Read `AWS_ACCOUNT_ID`, `AWS_ACCESS_KEY` and `AWS_SECRET_ACCESS_KEY`
    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }

    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            account_id: lookup("AWS_ACCOUNT_ID").unwrap_or_default(),
            access_key: lookup("AWS_ACCESS_KEY").unwrap_or_default(),
            secret_access_key: lookup("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
        }
    }
}

/// Cluster management service settings
#[derive(Clone, PartialEq, Eq)]
pub struct OcmConfig {
    pub base_url: String,
    /// Offline token; empty when the service is not used
    pub token: String,
    pub strimzi_operator_addon_id: String,
    pub kas_fleetshard_addon_id: String,
    pub cluster_logging_operator_addon_id: String,
}

impl std::fmt::Debug for OcmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcmConfig")
            .field("base_url", &self.base_url)
            .field("strimzi_operator_addon_id", &self.strimzi_operator_addon_id)
            .field("kas_fleetshard_addon_id", &self.kas_fleetshard_addon_id)
            .field("cluster_logging_operator_addon_id", &self.cluster_logging_operator_addon_id)
            .finish_non_exhaustive()
    }
}

impl Default for OcmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OCM_URL.to_string(),
            token: String::new(),
            strimzi_operator_addon_id: DEFAULT_STRIMZI_OPERATOR_ADDON_ID.to_string(),
            kas_fleetshard_addon_id: DEFAULT_KAS_FLEETSHARD_ADDON_ID.to_string(),
            cluster_logging_operator_addon_id: DEFAULT_CLUSTER_LOGGING_OPERATOR_ADDON_ID.to_string(),
        }
    }
}

impl OcmConfig {
    /// Read `OCM_URL`, `OCM_TOKEN` and the addon id overrides
    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }

    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("OCM_URL").unwrap_or(defaults.base_url),
            token: lookup("OCM_TOKEN").unwrap_or(defaults.token),
            strimzi_operator_addon_id: lookup("STRIMZI_OPERATOR_ADDON_ID")
                .unwrap_or(defaults.strimzi_operator_addon_id),
            kas_fleetshard_addon_id: lookup("KAS_FLEETSHARD_ADDON_ID")
                .unwrap_or(defaults.kas_fleetshard_addon_id),
            cluster_logging_operator_addon_id: lookup("CLUSTER_LOGGING_OPERATOR_ADDON_ID")
                .unwrap_or(defaults.cluster_logging_operator_addon_id),
        }
    }
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocm_config_defaults() {
        let config = OcmConfig::from_lookup(&lookup_from(&[]));
        assert_eq!(config.base_url, DEFAULT_OCM_URL);
        assert_eq!(config.strimzi_operator_addon_id, "managed-kafka");
        assert_eq!(config.kas_fleetshard_addon_id, "kas-fleetshard-operator");
        assert_eq!(config.cluster_logging_operator_addon_id, "cluster-logging-operator");
        assert!(config.token.is_empty());
    }

    #[test]
    fn test_ocm_config_overrides() {
        let config = OcmConfig::from_lookup(&lookup_from(&[
            ("OCM_URL", "https://api.stage.openshift.com"),
            ("OCM_TOKEN", "secret"),
            ("KAS_FLEETSHARD_ADDON_ID", "kas-fleetshard-operator-qe"),
        ]));
        assert_eq!(config.base_url, "https://api.stage.openshift.com");
        assert_eq!(config.token, "secret");
        assert_eq!(config.kas_fleetshard_addon_id, "kas-fleetshard-operator-qe");
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_aws_config_debug_hides_secrets() {
        let config = AwsConfig::from_lookup(&lookup_from(&[
            ("AWS_ACCOUNT_ID", "123456789012"),
            ("AWS_ACCESS_KEY", "AKIAEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "very-secret"),
        ]));
        assert_eq!(config.access_key, "AKIAEXAMPLE");
        let debug = format!("{:?}", config);
        assert!(debug.contains("123456789012"));
        assert!(!debug.contains("very-secret"));
    }
}
