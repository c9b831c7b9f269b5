//! Probe error types.

use cluster_providers::ProviderError;
use ocm_client::OcmError;
use thiserror::Error;

/// Errors that stop the probe before any cluster is checked.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Provider configuration could not be loaded
    #[error("Provider configuration error: {0}")]
    Provider(#[from] ProviderError),

    /// Cluster management client could not be built
    #[error("Cluster management client error: {0}")]
    Ocm(#[from] OcmError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
