//! Identity provider configuration pushed onto data-plane clusters

use serde::{Deserialize, Serialize};

/// Identity provider to configure on a cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IdentityProviderInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<OpenIdIdentityProviderInfo>,
}

/// OpenID connect identity provider
///
/// `id` is assigned by the backend and only set on returned values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OpenIdIdentityProviderInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub issuer: String,
}

impl IdentityProviderInfo {
    /// Wrap an OpenID provider
    pub fn open_id(info: OpenIdIdentityProviderInfo) -> Self {
        Self { open_id: Some(info) }
    }
}
