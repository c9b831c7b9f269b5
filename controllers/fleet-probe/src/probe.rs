//! Status check of the catalog clusters

use cluster_providers::{ProviderFactory, RequestContext};
use fleet_types::{ClusterSpec, ManualCluster};
use std::time::Duration;
use tracing::{error, info};

/// Outcome of one probe run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    pub checked: usize,
    pub failed: usize,
}

/// Check the status of every cluster once, each call bounded by `timeout`
///
/// Failures are logged and counted; they never stop the run.
pub async fn probe_clusters(factory: &ProviderFactory, clusters: &[ManualCluster], timeout: Duration) -> ProbeSummary {
    let mut summary = ProbeSummary::default();
    for cluster in clusters {
        summary.checked += 1;
        let provider = match factory.get_provider(cluster.provider_type) {
            Ok(provider) => provider,
            Err(e) => {
                error!(cluster_id = %cluster.cluster_id, error = %e, "No provider for cluster");
                summary.failed += 1;
                continue;
            }
        };

        let spec = ClusterSpec {
            status: Some(cluster.status),
            ..ClusterSpec::new(cluster.cluster_id.clone())
        };
        let ctx = RequestContext::with_timeout(timeout);
        match provider.check_cluster_status(&ctx, &spec).await {
            Ok(checked) => info!(
                cluster_id = %cluster.cluster_id,
                provider_type = %cluster.provider_type,
                status = %checked.status_or_default(),
                external_id = %checked.external_id,
                "Cluster checked"
            ),
            Err(e) => {
                error!(cluster_id = %cluster.cluster_id, error = %e, "Cluster status check failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_providers::{
        AwsConfig, ClusterBuilder, DataplaneClusterConfig, OcmConfig, OcmProvider, StandaloneProvider,
    };
    use fleet_types::ClusterProviderType;
    use ocm_client::{Cluster, ClusterState, MockOcmClient};
    use std::sync::Arc;

    fn catalog() -> Vec<ManualCluster> {
        serde_yaml::from_str(
            r#"
- cluster_id: osd-ready
- cluster_id: osd-missing
- cluster_id: standalone-1
  name: dev
  provider_type: standalone
  cluster_dns: apps.dev.example.com
"#,
        )
        .unwrap()
    }

    fn factory(mock: &MockOcmClient) -> ProviderFactory {
        let dataplane = Arc::new(DataplaneClusterConfig::default());
        let builder = ClusterBuilder::new(AwsConfig::default(), Arc::clone(&dataplane));
        ProviderFactory::new()
            .register(
                ClusterProviderType::Ocm,
                Arc::new(OcmProvider::new(Arc::new(mock.clone()), builder, OcmConfig::default())),
            )
            .register(
                ClusterProviderType::Standalone,
                Arc::new(StandaloneProvider::from_config(dataplane)),
            )
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(Cluster {
            id: Some("osd-ready".to_string()),
            external_id: Some("ext-1".to_string()),
            state: Some(ClusterState::Ready),
            ..Default::default()
        });

        let summary = probe_clusters(&factory(&mock), &catalog(), Duration::from_secs(5)).await;
        assert_eq!(summary, ProbeSummary { checked: 3, failed: 1 });
        assert_eq!(mock.call_count("get_cluster"), 2);
    }

    #[tokio::test]
    async fn test_missing_provider_counts_as_failure() {
        let factory = ProviderFactory::new();
        let summary = probe_clusters(&factory, &catalog(), Duration::from_secs(5)).await;
        assert_eq!(summary, ProbeSummary { checked: 3, failed: 3 });
    }
}
