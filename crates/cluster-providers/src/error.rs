//! Provider error types.
//!
//! Remote failures keep the operation and cluster id they happened in so a
//! caller can log them without further context.

use fleet_types::ClusterProviderType;
use ocm_client::OcmError;
use thiserror::Error;

/// Errors that can occur in a cluster provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller passed an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cluster management API call failed
    #[error("{context}: {source}")]
    Ocm {
        context: String,
        #[source]
        source: OcmError,
    },

    /// Kubernetes API call failed
    #[error("{context}: {source}")]
    Kube {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// A kubeconfig could not be read or does not contain the requested context
    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    /// Discovery did not find the resource kind on the cluster
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported cluster provider type: {0}")]
    UnsupportedProviderType(ClusterProviderType),

    /// The backend has no counterpart for the requested operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The request context deadline passed before the operation finished
    #[error("Deadline exceeded while running {0}")]
    DeadlineExceeded(String),

    /// The backend answered but its state is unusable, e.g. a ready cluster without an external id
    #[error("Backend error: {0}")]
    Backend(String),
}

impl ProviderError {
    /// Wrap a cluster management API error with the failing operation and cluster
    pub fn ocm(operation: &str, cluster_id: &str, source: OcmError) -> Self {
        ProviderError::Ocm {
            context: format!("failed to {} for cluster {}", operation, cluster_id),
            source,
        }
    }

    /// Wrap a Kubernetes API error with the failing operation and cluster
    pub fn kube(operation: &str, cluster_id: &str, source: kube::Error) -> Self {
        ProviderError::Kube {
            context: format!("failed to {} for cluster {}", operation, cluster_id),
            source,
        }
    }

    /// Returns true when the underlying remote call answered 404
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::Ocm { source, .. } => source.is_not_found(),
            ProviderError::Kube {
                source: kube::Error::Api(response),
                ..
            } => response.code == 404,
            _ => false,
        }
    }
}

/// Result alias used throughout the providers
pub type Result<T, E = ProviderError> = std::result::Result<T, E>;
