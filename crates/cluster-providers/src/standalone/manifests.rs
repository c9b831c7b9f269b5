//! Manifests applied to standalone clusters
//!
//! Operators are installed through OLM: a namespace, a catalog source
//! serving the index image, an operator group and a subscription.

use crate::config::OperatorInstallationConfig;
use fleet_types::{OpenIdIdentityProviderInfo, Parameter};
use serde_json::{json, Map, Value};

pub const CATALOG_SOURCE_NAMESPACE: &str = "openshift-marketplace";
pub const FLEETSHARD_PARAMETERS_SECRET_NAME: &str = "addon-kas-fleetshard-operator-parameters";
pub const IDENTITY_PROVIDER_SECRET_NAME: &str = "kafka-sre-idp-secret";
const OPENSHIFT_CONFIG_NAMESPACE: &str = "openshift-config";

/// OLM objects installing one operator
#[derive(Debug, Clone, Copy)]
pub struct OperatorManifests<'a> {
    config: &'a OperatorInstallationConfig,
}

impl<'a> OperatorManifests<'a> {
    pub fn new(config: &'a OperatorInstallationConfig) -> Self {
        Self { config }
    }

    fn catalog_source_name(&self) -> String {
        format!("{}-cs", self.config.package)
    }

    pub fn namespace(&self) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {"name": self.config.namespace}
        })
    }

    pub fn catalog_source(&self) -> Value {
        json!({
            "apiVersion": "operators.coreos.com/v1alpha1",
            "kind": "CatalogSource",
            "metadata": {
                "name": self.catalog_source_name(),
                "namespace": CATALOG_SOURCE_NAMESPACE
            },
            "spec": {
                "sourceType": "grpc",
                "image": self.config.index_image
            }
        })
    }

    /// Operator group without target namespaces, selecting every namespace
    pub fn operator_group(&self) -> Value {
        json!({
            "apiVersion": "operators.coreos.com/v1alpha2",
            "kind": "OperatorGroup",
            "metadata": {
                "name": format!("{}-og", self.config.package),
                "namespace": self.config.namespace
            },
            "spec": {}
        })
    }

    pub fn subscription(&self) -> Value {
        let mut spec = Map::new();
        spec.insert("channel".to_string(), json!(self.config.subscription_channel));
        spec.insert("name".to_string(), json!(self.config.package));
        spec.insert("source".to_string(), json!(self.catalog_source_name()));
        spec.insert("sourceNamespace".to_string(), json!(CATALOG_SOURCE_NAMESPACE));
        spec.insert("installPlanApproval".to_string(), json!("Automatic"));
        if !self.config.subscription_starting_csv.is_empty() {
            spec.insert("startingCSV".to_string(), json!(self.config.subscription_starting_csv));
        }
        if let Some(config) = &self.config.subscription_config {
            spec.insert("config".to_string(), config.clone());
        }

        json!({
            "apiVersion": "operators.coreos.com/v1alpha1",
            "kind": "Subscription",
            "metadata": {
                "name": format!("{}-sub", self.config.package),
                "namespace": self.config.namespace
            },
            "spec": spec
        })
    }

    /// Objects in apply order
    pub fn install(&self) -> Vec<Value> {
        vec![
            self.namespace(),
            self.catalog_source(),
            self.operator_group(),
            self.subscription(),
        ]
    }
}

/// Secret carrying the fleetshard operator parameters
pub fn fleetshard_parameters_secret(namespace: &str, parameters: &[Parameter]) -> Value {
    let data: Map<String, Value> = parameters
        .iter()
        .map(|p| (p.id.clone(), Value::String(p.value.clone())))
        .collect();
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": FLEETSHARD_PARAMETERS_SECRET_NAME,
            "namespace": namespace
        },
        "type": "Opaque",
        "stringData": data
    })
}

/// Secret holding the OpenID client secret referenced by the OAuth resource
pub fn identity_provider_secret(info: &OpenIdIdentityProviderInfo) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": IDENTITY_PROVIDER_SECRET_NAME,
            "namespace": OPENSHIFT_CONFIG_NAMESPACE
        },
        "type": "Opaque",
        "stringData": {"clientSecret": info.client_secret}
    })
}

/// Cluster OAuth configuration with a single OpenID identity provider
pub fn oauth(info: &OpenIdIdentityProviderInfo) -> Value {
    json!({
        "apiVersion": "config.openshift.io/v1",
        "kind": "OAuth",
        "metadata": {"name": "cluster"},
        "spec": {
            "identityProviders": [{
                "name": info.name,
                "mappingMethod": "claim",
                "type": "OpenID",
                "openID": {
                    "clientID": info.client_id,
                    "issuer": info.issuer,
                    "clientSecret": {"name": IDENTITY_PROVIDER_SECRET_NAME},
                    "claims": {
                        "email": ["email"],
                        "preferredUsername": ["preferred_username"],
                        "name": ["last_name", "preferred_username"]
                    }
                }
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OperatorInstallationConfig {
        OperatorInstallationConfig {
            namespace: "redhat-managed-kafka-operator".to_string(),
            index_image: "quay.io/osd-addons/strimzi-index:v1".to_string(),
            package: "kas-strimzi-bundle".to_string(),
            subscription_channel: "alpha".to_string(),
            subscription_starting_csv: String::new(),
            subscription_config: None,
            subscription_config_file: String::new(),
        }
    }

    #[test]
    fn test_install_order_and_names() {
        let config = config();
        let objects = OperatorManifests::new(&config).install();
        let kinds: Vec<_> = objects.iter().map(|o| o["kind"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["Namespace", "CatalogSource", "OperatorGroup", "Subscription"]);

        assert_eq!(objects[1]["metadata"]["namespace"], "openshift-marketplace");
        assert_eq!(objects[1]["spec"]["image"], "quay.io/osd-addons/strimzi-index:v1");
        assert_eq!(objects[3]["spec"]["source"], "kas-strimzi-bundle-cs");
        assert_eq!(objects[3]["spec"]["installPlanApproval"], "Automatic");
    }

    #[test]
    fn test_subscription_optional_fields() {
        let mut config = config();
        let plain = OperatorManifests::new(&config).subscription();
        assert!(plain["spec"].get("startingCSV").is_none());
        assert!(plain["spec"].get("config").is_none());

        config.subscription_starting_csv = "kas-strimzi-bundle.v0.1.5".to_string();
        config.subscription_config = Some(json!({"resources": {"limits": {"memory": "1Gi"}}}));
        let full = OperatorManifests::new(&config).subscription();
        assert_eq!(full["spec"]["startingCSV"], "kas-strimzi-bundle.v0.1.5");
        assert_eq!(full["spec"]["config"]["resources"]["limits"]["memory"], "1Gi");
    }

    #[test]
    fn test_fleetshard_parameters_secret() {
        let secret = fleetshard_parameters_secret(
            "redhat-kas-fleetshard-operator",
            &[Parameter::new("sso-client-id", "abc"), Parameter::new("sso-secret", "xyz")],
        );
        assert_eq!(secret["metadata"]["name"], FLEETSHARD_PARAMETERS_SECRET_NAME);
        assert_eq!(secret["stringData"]["sso-client-id"], "abc");
        assert_eq!(secret["stringData"]["sso-secret"], "xyz");
    }

    #[test]
    fn test_identity_provider_manifests() {
        let info = OpenIdIdentityProviderInfo {
            name: "Kafka_SRE".to_string(),
            client_id: "kafka-sre".to_string(),
            client_secret: "s3cret".to_string(),
            issuer: "https://sso.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(identity_provider_secret(&info)["stringData"]["clientSecret"], "s3cret");

        let oauth = oauth(&info);
        let provider = &oauth["spec"]["identityProviders"][0];
        assert_eq!(provider["name"], "Kafka_SRE");
        assert_eq!(provider["openID"]["clientSecret"]["name"], IDENTITY_PROVIDER_SECRET_NAME);
        assert_eq!(provider["openID"]["issuer"], "https://sso.example.com");
    }
}
