//! OpenID identity providers on managed clusters

use fleet_types::OpenIdIdentityProviderInfo;
use ocm_client::{IdentityProvider, OpenIdClaims, OpenIdIdentityProvider};

/// Message the cluster service returns when a provider name is taken
pub(crate) const ALREADY_EXISTS: &str = "already exists";

const OPEN_ID_PROVIDER_TYPE: &str = "OpenIDIdentityProvider";
const MAPPING_METHOD_CLAIM: &str = "claim";

pub(crate) fn build_identity_provider(info: &OpenIdIdentityProviderInfo) -> IdentityProvider {
    IdentityProvider {
        id: None,
        name: Some(info.name.clone()),
        kind: Some(OPEN_ID_PROVIDER_TYPE.to_string()),
        mapping_method: Some(MAPPING_METHOD_CLAIM.to_string()),
        open_id: Some(OpenIdIdentityProvider {
            client_id: info.client_id.clone(),
            client_secret: info.client_secret.clone(),
            issuer: info.issuer.clone(),
            claims: Some(OpenIdClaims {
                email: vec!["email".to_string()],
                preferred_username: vec!["preferred_username".to_string()],
                name: vec!["last_name".to_string(), "preferred_username".to_string()],
            }),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_identity_provider() {
        let info = OpenIdIdentityProviderInfo {
            id: String::new(),
            name: "Kafka_SRE".to_string(),
            client_id: "kafka-sre".to_string(),
            client_secret: "s3cret".to_string(),
            issuer: "https://sso.example.com/auth/realms/sre".to_string(),
        };
        let provider = build_identity_provider(&info);

        assert_eq!(provider.name.as_deref(), Some("Kafka_SRE"));
        assert_eq!(provider.kind.as_deref(), Some("OpenIDIdentityProvider"));
        assert_eq!(provider.mapping_method.as_deref(), Some("claim"));
        let open_id = provider.open_id.unwrap();
        assert_eq!(open_id.issuer, "https://sso.example.com/auth/realms/sre");
        let claims = open_id.claims.unwrap();
        assert_eq!(claims.email, vec!["email"]);
        assert_eq!(claims.preferred_username, vec!["preferred_username"]);
        assert_eq!(claims.name, vec!["last_name", "preferred_username"]);
    }
}
