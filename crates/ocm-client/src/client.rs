//! Cluster management API client
//!
//! Implements the `clusters_mgmt/v1` REST API used to provision and
//! configure managed data-plane clusters, plus the single `accounts_mgmt/v1`
//! query needed to read observed node metrics.

use crate::common::HttpClient;
use crate::error::OcmError;
use crate::models::*;
use crate::ocm_trait::ClusterManagementClient;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const CLUSTERS_MGMT: &str = "/api/clusters_mgmt/v1";
const ACCOUNTS_MGMT: &str = "/api/accounts_mgmt/v1";

/// Cluster management API client
#[derive(Debug)]
pub struct OcmClient {
    http: HttpClient,
}

impl OcmClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API base URL (e.g., "https://api.openshift.com")
    /// * `token` - Offline or access token sent as a bearer token
    pub fn new(base_url: String, token: String) -> Result<Self, OcmError> {
        if token.is_empty() {
            return Err(OcmError::InvalidRequest(
                "a token is required to build the cluster management client".to_string(),
            ));
        }
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }

    fn cluster_path(cluster_id: &str) -> String {
        format!("{}/clusters/{}", CLUSTERS_MGMT, urlencoding::encode(cluster_id))
    }

    fn syncsets_path(cluster_id: &str) -> String {
        format!("{}/external_configuration/syncsets", Self::cluster_path(cluster_id))
    }

    async fn patch_compute_nodes(&self, cluster_id: &str, nodes: i64) -> Result<Cluster, OcmError> {
        if nodes < 0 {
            return Err(OcmError::InvalidRequest(format!(
                "compute node count for cluster {} cannot be negative: {}",
                cluster_id, nodes
            )));
        }
        debug!(cluster_id = %cluster_id, nodes, "Setting compute nodes");
        self.http
            .patch(&Self::cluster_path(cluster_id), &json!({"nodes": {"compute": nodes}}))
            .await
    }

    async fn current_compute_nodes(&self, cluster_id: &str) -> Result<i64, OcmError> {
        let cluster = self.get_cluster(cluster_id).await?;
        cluster.desired_compute_nodes().ok_or_else(|| {
            OcmError::Api(format!("cluster {} does not report a compute node count", cluster_id))
        })
    }
}

fn parameter_list(parameters: &[AddOnInstallationParameter]) -> serde_json::Value {
    json!({
        "items": parameters
            .iter()
            .map(|p| json!({"id": p.id, "value": p.value}))
            .collect::<Vec<_>>()
    })
}

fn same_parameters(existing: &[AddOnInstallationParameter], wanted: &[AddOnInstallationParameter]) -> bool {
    existing.len() == wanted.len() && wanted.iter().all(|w| existing.contains(w))
}

#[async_trait::async_trait]
impl ClusterManagementClient for OcmClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn create_cluster(&self, cluster: &Cluster) -> Result<Cluster, OcmError> {
        let body = serde_json::to_value(cluster)?;
        self.http.post(&format!("{}/clusters", CLUSTERS_MGMT), &body).await
    }

    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster, OcmError> {
        self.http.get(&Self::cluster_path(cluster_id)).await
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), OcmError> {
        self.http.delete(&Self::cluster_path(cluster_id)).await
    }

    async fn get_cluster_ingresses(&self, cluster_id: &str) -> Result<Vec<Ingress>, OcmError> {
        self.http
            .get_all(&format!("{}/ingresses", Self::cluster_path(cluster_id)))
            .await
    }

    async fn scale_up_compute_nodes(&self, cluster_id: &str, increment: i64) -> Result<Cluster, OcmError> {
        let current = self.current_compute_nodes(cluster_id).await?;
        self.patch_compute_nodes(cluster_id, current + increment).await
    }

    async fn scale_down_compute_nodes(&self, cluster_id: &str, decrement: i64) -> Result<Cluster, OcmError> {
        let current = self.current_compute_nodes(cluster_id).await?;
        self.patch_compute_nodes(cluster_id, current - decrement).await
    }

    async fn set_compute_nodes(&self, cluster_id: &str, nodes: i64) -> Result<Cluster, OcmError> {
        self.patch_compute_nodes(cluster_id, nodes).await
    }

    async fn get_existing_cluster_metrics(&self, cluster_id: &str) -> Result<Option<SubscriptionMetrics>, OcmError> {
        let search = format!("cluster_id='{}'", cluster_id);
        let path = format!(
            "{}/subscriptions?search={}",
            ACCOUNTS_MGMT,
            urlencoding::encode(&search)
        );
        let response: ListResponse<Subscription> = self.http.get(&path).await?;
        match response.items.len() {
            0 => Ok(None),
            1 => Ok(response.items.into_iter().next().and_then(|s| s.metrics.into_iter().next())),
            n => Err(OcmError::Api(format!(
                "expected a single subscription for cluster {}, found {}",
                cluster_id, n
            ))),
        }
    }

    async fn get_cloud_providers(&self) -> Result<Vec<CloudProvider>, OcmError> {
        self.http
            .get_all(&format!("{}/cloud_providers", CLUSTERS_MGMT))
            .await
    }

    async fn get_regions(&self, cloud_provider_id: &str) -> Result<Vec<CloudRegion>, OcmError> {
        self.http
            .get_all(&format!(
                "{}/cloud_providers/{}/regions",
                CLUSTERS_MGMT,
                urlencoding::encode(cloud_provider_id)
            ))
            .await
    }

    async fn get_addon(&self, cluster_id: &str, addon_id: &str) -> Result<Option<AddOnInstallation>, OcmError> {
        let installations: Vec<AddOnInstallation> = self
            .http
            .get_all(&format!("{}/addons", Self::cluster_path(cluster_id)))
            .await?;
        Ok(installations
            .into_iter()
            .find(|i| i.id.as_deref() == Some(addon_id)))
    }

    async fn create_addon_with_params(
        &self,
        cluster_id: &str,
        addon_id: &str,
        parameters: &[AddOnInstallationParameter],
    ) -> Result<AddOnInstallation, OcmError> {
        let mut body = json!({"addon": {"id": addon_id}});
        if !parameters.is_empty() {
            body["parameters"] = parameter_list(parameters);
        }
        self.http
            .post(&format!("{}/addons", Self::cluster_path(cluster_id)), &body)
            .await
    }

    async fn update_addon_parameters(
        &self,
        cluster_id: &str,
        addon_installation_id: &str,
        parameters: &[AddOnInstallationParameter],
    ) -> Result<AddOnInstallation, OcmError> {
        let path = format!(
            "{}/addons/{}",
            Self::cluster_path(cluster_id),
            urlencoding::encode(addon_installation_id)
        );
        let existing: AddOnInstallation = self.http.get(&path).await?;
        if let Some(current) = &existing.parameters {
            if same_parameters(&current.items, parameters) {
                return Ok(existing);
            }
        }
        if parameters.is_empty() {
            return Ok(existing);
        }
        self.http
            .patch(&path, &json!({"parameters": parameter_list(parameters)}))
            .await
    }

    async fn get_machine_pool(&self, cluster_id: &str, machine_pool_id: &str) -> Result<Option<MachinePool>, OcmError> {
        let path = format!(
            "{}/machine_pools/{}",
            Self::cluster_path(cluster_id),
            urlencoding::encode(machine_pool_id)
        );
        match self.http.get(&path).await {
            Ok(pool) => Ok(Some(pool)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_machine_pool(&self, cluster_id: &str, machine_pool: &MachinePool) -> Result<MachinePool, OcmError> {
        debug!(cluster_id = %cluster_id, machine_pool = ?machine_pool.id, "Creating machine pool");
        let body = serde_json::to_value(machine_pool)?;
        self.http
            .post(&format!("{}/machine_pools", Self::cluster_path(cluster_id)), &body)
            .await
    }

    async fn create_identity_provider(
        &self,
        cluster_id: &str,
        identity_provider: &IdentityProvider,
    ) -> Result<IdentityProvider, OcmError> {
        let body = serde_json::to_value(identity_provider)?;
        self.http
            .post(&format!("{}/identity_providers", Self::cluster_path(cluster_id)), &body)
            .await
    }

    async fn get_identity_providers(&self, cluster_id: &str) -> Result<Vec<IdentityProvider>, OcmError> {
        self.http
            .get_all(&format!("{}/identity_providers", Self::cluster_path(cluster_id)))
            .await
    }

    async fn get_syncset(&self, cluster_id: &str, syncset_id: &str) -> Result<Syncset, OcmError> {
        self.http
            .get(&format!(
                "{}/{}",
                Self::syncsets_path(cluster_id),
                urlencoding::encode(syncset_id)
            ))
            .await
    }

    async fn create_syncset(&self, cluster_id: &str, syncset: &Syncset) -> Result<Syncset, OcmError> {
        let body = serde_json::to_value(syncset)?;
        self.http.post(&Self::syncsets_path(cluster_id), &body).await
    }

    async fn update_syncset(&self, cluster_id: &str, syncset_id: &str, syncset: &Syncset) -> Result<Syncset, OcmError> {
        // the id is addressed by the path and must not be part of the body
        let body = json!({"resources": syncset.resources});
        self.http
            .patch(
                &format!("{}/{}", Self::syncsets_path(cluster_id), urlencoding::encode(syncset_id)),
                &body,
            )
            .await
    }

    async fn delete_syncset(&self, cluster_id: &str, syncset_id: &str) -> Result<(), OcmError> {
        self.http
            .delete(&format!(
                "{}/{}",
                Self::syncsets_path(cluster_id),
                urlencoding::encode(syncset_id)
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_token() {
        let err = OcmClient::new("https://api.openshift.com".to_string(), String::new()).unwrap_err();
        assert!(matches!(err, OcmError::InvalidRequest(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OcmClient::new("https://api.openshift.com/".to_string(), "token".to_string()).unwrap();
        assert_eq!(client.base_url(), "https://api.openshift.com");
    }

    #[test]
    fn test_same_parameters_ignores_order() {
        let a = AddOnInstallationParameter { id: "a".to_string(), value: "1".to_string() };
        let b = AddOnInstallationParameter { id: "b".to_string(), value: "2".to_string() };
        assert!(same_parameters(&[a.clone(), b.clone()], &[b.clone(), a.clone()]));
        assert!(!same_parameters(&[a.clone()], &[a, b]));
    }

    #[test]
    fn test_parameter_list_shape() {
        let params = vec![AddOnInstallationParameter { id: "sso-client-id".to_string(), value: "x".to_string() }];
        assert_eq!(
            parameter_list(&params),
            json!({"items": [{"id": "sso-client-id", "value": "x"}]})
        );
    }
}
