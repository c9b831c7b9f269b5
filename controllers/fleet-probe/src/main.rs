//! Fleet Probe
//!
//! One-shot diagnostic for the data-plane cluster catalog:
//! - Loads the provider configuration from the environment
//! - Reads the cluster catalog and, for standalone clusters, the kubeconfig
//! - Checks the status of every catalog cluster once and logs the result
//!
//! Configuration errors end the run with a non-zero exit code. Failing
//! clusters are only logged and counted.

mod error;
mod probe;

use crate::error::ProbeError;
use cluster_providers::{AwsConfig, DataplaneClusterConfig, OcmConfig, ProviderFactory, StandaloneProvider};
use fleet_types::ClusterProviderType;
use ocm_client::{ClusterManagementClient, OcmClient};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn probe_timeout() -> Result<Duration, ProbeError> {
    match env::var("FLEET_PROBE_TIMEOUT_SECS") {
        Ok(value) if !value.is_empty() => value.parse::<u64>().map(Duration::from_secs).map_err(|e| {
            ProbeError::InvalidConfig(format!("FLEET_PROBE_TIMEOUT_SECS '{}' is not a number of seconds: {}", value, e))
        }),
        _ => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    }
}

fn build_factory(
    ocm_config: OcmConfig,
    aws_config: AwsConfig,
    dataplane: Arc<DataplaneClusterConfig>,
) -> Result<ProviderFactory, ProbeError> {
    let uses_ocm = dataplane
        .cluster_config
        .manual_clusters()
        .iter()
        .any(|c| c.provider_type == ClusterProviderType::Ocm);
    if !uses_ocm {
        return Ok(ProviderFactory::new().register(
            ClusterProviderType::Standalone,
            Arc::new(StandaloneProvider::from_config(dataplane)),
        ));
    }

    if ocm_config.token.is_empty() {
        return Err(ProbeError::InvalidConfig(
            "OCM_TOKEN environment variable is required when the catalog lists ocm clusters".to_string(),
        ));
    }
    let client: Arc<dyn ClusterManagementClient> =
        Arc::new(OcmClient::new(ocm_config.base_url.clone(), ocm_config.token.clone())?);
    Ok(ProviderFactory::from_config(client, ocm_config, aws_config, dataplane))
}

#[tokio::main]
async fn main() -> Result<(), ProbeError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A rustls crypto provider was already installed");
    }

    info!("Starting Fleet Probe");

    let ocm_config = OcmConfig::from_env();
    let aws_config = AwsConfig::from_env();
    let mut dataplane = DataplaneClusterConfig::from_env()?;
    dataplane.read_files()?;
    let timeout = probe_timeout()?;

    info!("Configuration:");
    info!("  OCM URL: {}", ocm_config.base_url);
    info!("  Scaling type: {:?}", dataplane.scaling_type);
    info!("  Cluster catalog: {}", dataplane.cluster_config_file.display());
    info!("  Timeout per cluster: {:?}", timeout);

    let dataplane = Arc::new(dataplane);
    let factory = build_factory(ocm_config, aws_config, Arc::clone(&dataplane))?;

    let summary = probe::probe_clusters(&factory, dataplane.cluster_config.manual_clusters(), timeout).await;
    info!(
        checked = summary.checked,
        failed = summary.failed,
        "Probe finished"
    );
    Ok(())
}
