//! OCM client errors

use thiserror::Error;

/// Errors that can occur when interacting with the cluster management API
#[derive(Debug, Error)]
pub enum OcmError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error
    #[error("OCM API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl OcmError {
    /// Returns true when the API answered with a 404 for the addressed resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, OcmError::NotFound(_))
    }
}
