//! Provider lookup by cluster provider type

use crate::builder::ClusterBuilder;
use crate::config::{AwsConfig, DataplaneClusterConfig, OcmConfig};
use crate::error::{ProviderError, Result};
use crate::ocm::OcmProvider;
use crate::provider::Provider;
use crate::standalone::StandaloneProvider;
use fleet_types::ClusterProviderType;
use ocm_client::ClusterManagementClient;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of providers keyed by the type tag stored on each cluster
#[derive(Default, Clone)]
pub struct ProviderFactory {
    providers: HashMap<ClusterProviderType, Arc<dyn Provider>>,
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.providers.keys().map(ClusterProviderType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ProviderFactory").field("providers", &types).finish()
    }
}

impl ProviderFactory {
    /// Factory with no providers registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with the managed-service and standalone providers
    pub fn from_config(
        ocm_client: Arc<dyn ClusterManagementClient>,
        ocm_config: OcmConfig,
        aws_config: AwsConfig,
        dataplane_config: Arc<DataplaneClusterConfig>,
    ) -> Self {
        let builder = ClusterBuilder::new(aws_config, Arc::clone(&dataplane_config));
        Self::new()
            .register(
                ClusterProviderType::Ocm,
                Arc::new(OcmProvider::new(ocm_client, builder, ocm_config)),
            )
            .register(
                ClusterProviderType::Standalone,
                Arc::new(StandaloneProvider::from_config(dataplane_config)),
            )
    }

    /// Register `provider` for `provider_type`, replacing any previous one
    #[must_use]
    pub fn register(mut self, provider_type: ClusterProviderType, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(provider_type, provider);
        self
    }

    /// Provider registered for `provider_type`
    pub fn get_provider(&self, provider_type: ClusterProviderType) -> Result<Arc<dyn Provider>> {
        self.providers
            .get(&provider_type)
            .cloned()
            .ok_or(ProviderError::UnsupportedProviderType(provider_type))
    }
}
