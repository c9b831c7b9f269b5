//! Data-plane cluster configuration

use super::catalog::ClusterConfig;
use super::{process_env, Lookup};
use crate::error::{ProviderError, Result};
use fleet_types::{ClusterProviderType, ManualCluster};
use kube::config::Kubeconfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_COMPUTE_MACHINE_TYPE: &str = "m5.2xlarge";
pub const DEFAULT_CLUSTER_CONFIG_FILE: &str = "config/dataplane-cluster-configuration.yaml";

const STRIMZI_OPERATOR_NAMESPACE: &str = "redhat-managed-kafka-operator";
const STRIMZI_OPERATOR_PACKAGE: &str = "kas-strimzi-bundle";
const STRIMZI_OPERATOR_INDEX_IMAGE: &str =
    "quay.io/osd-addons/rhosak-strimzi-operator-bundle-index:v4.9-v0.1.5-2";
const STRIMZI_OPERATOR_SUBSCRIPTION_CONFIG_FILE: &str = "config/strimzi-operator-subscription-spec-config.yaml";

const FLEETSHARD_OPERATOR_NAMESPACE: &str = "redhat-kas-fleetshard-operator";
const FLEETSHARD_OPERATOR_PACKAGE: &str = "kas-fleetshard-operator";
const FLEETSHARD_OPERATOR_INDEX_IMAGE: &str =
    "quay.io/osd-addons/rhosak-fleetshard-operator-bundle-index:v4.9-v1.0.7-1";
const FLEETSHARD_OPERATOR_SUBSCRIPTION_CONFIG_FILE: &str =
    "config/kas-fleetshard-operator-subscription-spec-config.yaml";

const DEFAULT_SUBSCRIPTION_CHANNEL: &str = "alpha";

/// How the data-plane fleet is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingType {
    /// Clusters come from the manual catalog file
    #[default]
    Manual,
    /// Clusters are added and removed from reported capacity
    Auto,
    /// No scaling, used in testing
    None,
}

impl FromStr for ScalingType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "manual" => Ok(ScalingType::Manual),
            "auto" => Ok(ScalingType::Auto),
            "none" => Ok(ScalingType::None),
            other => Err(ProviderError::Configuration(format!(
                "invalid data plane cluster scaling type '{}', expected one of manual, auto, none",
                other
            ))),
        }
    }
}

/// How an operator is installed through OLM on standalone clusters
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorInstallationConfig {
    pub namespace: String,
    pub index_image: String,
    pub package: String,
    pub subscription_channel: String,
    pub subscription_starting_csv: String,
    /// Subscription `spec.config`, read from `subscription_config_file`
    pub subscription_config: Option<serde_json::Value>,
    pub subscription_config_file: String,
}

impl OperatorInstallationConfig {
    fn strimzi() -> Self {
        Self {
            namespace: STRIMZI_OPERATOR_NAMESPACE.to_string(),
            index_image: STRIMZI_OPERATOR_INDEX_IMAGE.to_string(),
            package: STRIMZI_OPERATOR_PACKAGE.to_string(),
            subscription_channel: DEFAULT_SUBSCRIPTION_CHANNEL.to_string(),
            subscription_starting_csv: String::new(),
            subscription_config: None,
            subscription_config_file: STRIMZI_OPERATOR_SUBSCRIPTION_CONFIG_FILE.to_string(),
        }
    }

    fn fleetshard() -> Self {
        Self {
            namespace: FLEETSHARD_OPERATOR_NAMESPACE.to_string(),
            index_image: FLEETSHARD_OPERATOR_INDEX_IMAGE.to_string(),
            package: FLEETSHARD_OPERATOR_PACKAGE.to_string(),
            subscription_channel: DEFAULT_SUBSCRIPTION_CHANNEL.to_string(),
            subscription_starting_csv: String::new(),
            subscription_config: None,
            subscription_config_file: FLEETSHARD_OPERATOR_SUBSCRIPTION_CONFIG_FILE.to_string(),
        }
    }

    fn apply_overrides(&mut self, prefix: &str, lookup: Lookup<'_>) {
        let var = |suffix: &str| lookup(&format!("{}_{}", prefix, suffix));
        if let Some(v) = var("NAMESPACE") {
            self.namespace = v;
        }
        if let Some(v) = var("INDEX_IMAGE") {
            self.index_image = v;
        }
        if let Some(v) = var("PACKAGE") {
            self.package = v;
        }
        if let Some(v) = var("SUB_CHANNEL") {
            self.subscription_channel = v;
        }
        if let Some(v) = var("STARTING_CSV") {
            self.subscription_starting_csv = v;
        }
        if let Some(v) = var("SUBSCRIPTION_CONFIG_FILE") {
            self.subscription_config_file = v;
        }
    }

    /// Read the subscription config file; a missing file keeps the default
    fn read_subscription_config(&mut self, operator: &str) -> Result<()> {
        if self.subscription_config_file.is_empty() {
            return Ok(());
        }
        match std::fs::read_to_string(&self.subscription_config_file) {
            Ok(contents) => {
                let config: serde_json::Value = serde_yaml::from_str(&contents).map_err(|e| {
                    ProviderError::Configuration(format!(
                        "failed to parse {} subscription config file {}: {}",
                        operator, self.subscription_config_file, e
                    ))
                })?;
                self.subscription_config = Some(config);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Specified {} subscription config file {} does not exist. Default configuration will be used",
                    operator, self.subscription_config_file
                );
                Ok(())
            }
            Err(e) => Err(ProviderError::Configuration(format!(
                "failed to read {} subscription config file {}: {}",
                operator, self.subscription_config_file, e
            ))),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    clusters: Vec<ManualCluster>,
}

/// Data-plane cluster settings
#[derive(Debug, Clone)]
pub struct DataplaneClusterConfig {
    /// OpenShift version of new clusters; empty lets the service pick
    pub openshift_version: String,
    pub compute_machine_type: String,
    pub scaling_type: ScalingType,
    pub cluster_config_file: PathBuf,
    pub kubeconfig: PathBuf,
    /// Parsed kubeconfig, loaded when the catalog holds standalone clusters
    pub raw_kubeconfig: Option<Kubeconfig>,
    pub cluster_config: ClusterConfig,
    pub strimzi_operator: OperatorInstallationConfig,
    pub fleetshard_operator: OperatorInstallationConfig,
}

fn default_kubeconfig(lookup: Lookup<'_>) -> PathBuf {
    if let Some(path) = lookup("KUBECONFIG") {
        return PathBuf::from(path);
    }
    lookup("HOME")
        .map(|home| Path::new(&home).join(".kube").join("config"))
        .unwrap_or_default()
}

impl Default for DataplaneClusterConfig {
    fn default() -> Self {
        Self {
            openshift_version: String::new(),
            compute_machine_type: DEFAULT_COMPUTE_MACHINE_TYPE.to_string(),
            scaling_type: ScalingType::Manual,
            cluster_config_file: PathBuf::from(DEFAULT_CLUSTER_CONFIG_FILE),
            kubeconfig: default_kubeconfig(&process_env),
            raw_kubeconfig: None,
            cluster_config: ClusterConfig::default(),
            strimzi_operator: OperatorInstallationConfig::strimzi(),
            fleetshard_operator: OperatorInstallationConfig::fleetshard(),
        }
    }
}

impl DataplaneClusterConfig {
    /// Read the settings from the environment; files are read separately by [`Self::read_files`]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let mut config = Self {
            kubeconfig: default_kubeconfig(lookup),
            ..Self::default()
        };
        if let Some(v) = lookup("CLUSTER_OPENSHIFT_VERSION") {
            config.openshift_version = v;
        }
        if let Some(v) = lookup("AWS_CLUSTER_COMPUTE_MACHINE_TYPE") {
            config.compute_machine_type = v;
        }
        if let Some(v) = lookup("DATAPLANE_CLUSTER_SCALING_TYPE") {
            config.scaling_type = v.parse()?;
        }
        if let Some(v) = lookup("DATAPLANE_CLUSTER_CONFIG_FILE") {
            config.cluster_config_file = PathBuf::from(v);
        }
        config.strimzi_operator.apply_overrides("STRIMZI_OPERATOR", lookup);
        config.fleetshard_operator.apply_overrides("KAS_FLEETSHARD_OPERATOR", lookup);
        Ok(config)
    }

    pub fn is_manual_scaling_enabled(&self) -> bool {
        self.scaling_type == ScalingType::Manual
    }

    pub fn is_auto_scaling_enabled(&self) -> bool {
        self.scaling_type == ScalingType::Auto
    }

    /// Read the cluster catalog, kubeconfig and subscription config files
    ///
    /// Only manual scaling uses files. Every standalone catalog entry must
    /// name a context of the kubeconfig.
    pub fn read_files(&mut self) -> Result<()> {
        if !self.is_manual_scaling_enabled() {
            return Ok(());
        }

        let clusters = read_cluster_catalog(&self.cluster_config_file)?;
        info!(
            "Loaded {} clusters from {}",
            clusters.len(),
            self.cluster_config_file.display()
        );
        self.cluster_config = ClusterConfig::new(clusters);

        for cluster in self.cluster_config.manual_clusters() {
            if cluster.provider_type != ClusterProviderType::Standalone {
                continue;
            }
            if self.raw_kubeconfig.is_none() {
                self.raw_kubeconfig = Some(read_kubeconfig(&self.kubeconfig)?);
            }
            if let Some(kubeconfig) = &self.raw_kubeconfig {
                validate_cluster_in_kubeconfig(kubeconfig, cluster)?;
            }
        }

        self.strimzi_operator.read_subscription_config("Strimzi operator")?;
        self.fleetshard_operator.read_subscription_config("kas-fleetshard operator")?;
        Ok(())
    }

    /// Kubeconfig context name of a catalog cluster
    pub fn find_cluster_name_by_cluster_id(&self, cluster_id: &str) -> Option<&str> {
        self.cluster_config.find_cluster_name_by_cluster_id(cluster_id)
    }
}

fn read_cluster_catalog(path: &Path) -> Result<Vec<ManualCluster>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ProviderError::Configuration(format!(
            "failed to read data plane cluster config file {}: {}",
            path.display(),
            e
        ))
    })?;
    let catalog: CatalogFile = serde_yaml::from_str(&contents).map_err(|e| {
        ProviderError::Configuration(format!(
            "failed to parse data plane cluster config file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(catalog.clusters)
}

fn read_kubeconfig(path: &Path) -> Result<Kubeconfig> {
    if !path.exists() {
        return Err(ProviderError::Kubeconfig(format!(
            "The kubeconfig file {} does not exist",
            path.display()
        )));
    }
    Kubeconfig::read_from(path)
        .map_err(|e| ProviderError::Kubeconfig(format!("failed to read {}: {}", path.display(), e)))
}

pub(crate) fn validate_cluster_in_kubeconfig(kubeconfig: &Kubeconfig, cluster: &ManualCluster) -> Result<()> {
    if kubeconfig.contexts.iter().any(|c| c.name == cluster.name) {
        return Ok(());
    }
    Err(ProviderError::Kubeconfig(format!(
        "standalone cluster with ID: {}, and Name {} not in kubeconfig context",
        cluster.cluster_id, cluster.name
    )))
}
