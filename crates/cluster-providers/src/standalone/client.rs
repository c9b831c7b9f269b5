//! Dynamic Kubernetes access for standalone clusters
//!
//! [`ResourceClient`] is the seam between the apply algorithm and the
//! cluster API so the algorithm can run against an in-memory client in
//! tests.

use crate::error::{ProviderError, Result};
use kube::api::{Api, DynamicObject, GroupVersionKind, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::discovery::{ApiResource, Scope};
use kube::{Client, Config};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Field manager recorded on every object written by the providers
pub const FIELD_MANAGER: &str = "kas-fleet-manager";

/// Resource kind resolved by discovery
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub api_resource: ApiResource,
    pub namespaced: bool,
}

impl ResolvedResource {
    /// Namespace to address an object in; cluster-wide when `None`
    pub fn scope_namespace<'a>(&self, namespace: Option<&'a str>) -> Option<&'a str> {
        namespace.filter(|ns| self.namespaced && !ns.is_empty())
    }
}

/// Dynamic object access on one cluster
#[async_trait::async_trait]
pub trait ResourceClient: Send + Sync {
    /// Resolve a kind to its API resource
    async fn resolve(&self, gvk: &GroupVersionKind) -> Result<ResolvedResource>;

    /// Read an object; `None` when it does not exist
    async fn get(&self, resource: &ResolvedResource, namespace: Option<&str>, name: &str)
        -> Result<Option<DynamicObject>>;

    async fn create(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject>;

    /// Replace the whole object; `object` must carry the current resource version
    async fn replace(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        name: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject>;
}

/// Hands out a [`ResourceClient`] per kubeconfig context
#[async_trait::async_trait]
pub trait ResourceClientFactory: Send + Sync {
    /// False when no kubeconfig was loaded and standalone clusters cannot be reached
    fn has_kubeconfig(&self) -> bool;

    async fn client_for(&self, cluster_id: &str, context: &str) -> Result<Arc<dyn ResourceClient>>;
}

fn gvk_key(gvk: &GroupVersionKind) -> String {
    format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    }
}

/// [`ResourceClient`] backed by a kube [`Client`]
///
/// Discovery results are cached for the lifetime of the client.
pub struct KubeResourceClient {
    cluster_id: String,
    client: Client,
    resources: RwLock<HashMap<String, ResolvedResource>>,
}

impl KubeResourceClient {
    /// Client for one standalone cluster reached through `client`
    pub fn new(cluster_id: impl Into<String>, client: Client) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            client,
            resources: RwLock::new(HashMap::new()),
        }
    }

    fn api(&self, resource: &ResolvedResource, namespace: Option<&str>) -> Api<DynamicObject> {
        match resource.scope_namespace(namespace) {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource.api_resource),
            None => Api::all_with(self.client.clone(), &resource.api_resource),
        }
    }
}

#[async_trait::async_trait]
impl ResourceClient for KubeResourceClient {
    async fn resolve(&self, gvk: &GroupVersionKind) -> Result<ResolvedResource> {
        let key = gvk_key(gvk);
        if let Some(resolved) = self.resources.read().await.get(&key) {
            return Ok(resolved.clone());
        }

        let (api_resource, capabilities) = kube::discovery::pinned_kind(&self.client, gvk)
            .await
            .map_err(|e| match e {
                kube::Error::Api(response) if response.code == 404 => ProviderError::UnknownResource(key.clone()),
                other => ProviderError::kube(&format!("discover {}", key), &self.cluster_id, other),
            })?;
        let resolved = ResolvedResource {
            api_resource,
            namespaced: matches!(capabilities.scope, Scope::Namespaced),
        };
        debug!(cluster_id = %self.cluster_id, kind = %key, namespaced = resolved.namespaced, "Resolved resource kind");
        self.resources.write().await.insert(key, resolved.clone());
        Ok(resolved)
    }

    async fn get(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>> {
        self.api(resource, namespace)
            .get_opt(name)
            .await
            .map_err(|e| ProviderError::kube(&format!("get {} {}", resource.api_resource.kind, name), &self.cluster_id, e))
    }

    async fn create(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        self.api(resource, namespace)
            .create(&post_params(), object)
            .await
            .map_err(|e| ProviderError::kube(&format!("create {}", resource.api_resource.kind), &self.cluster_id, e))
    }

    async fn replace(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        name: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        self.api(resource, namespace)
            .replace(name, &post_params(), object)
            .await
            .map_err(|e| {
                ProviderError::kube(&format!("replace {} {}", resource.api_resource.kind, name), &self.cluster_id, e)
            })
    }
}

/// Builds kube clients from the contexts of a stored kubeconfig
///
/// One client is kept per context so discovery is not repeated.
pub struct KubeResourceClientFactory {
    kubeconfig: Option<Kubeconfig>,
    clients: RwLock<HashMap<String, Arc<KubeResourceClient>>>,
}

impl KubeResourceClientFactory {
    /// Factory building clients from the contexts of `kubeconfig`
    pub fn new(kubeconfig: Option<Kubeconfig>) -> Self {
        Self {
            kubeconfig,
            clients: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl ResourceClientFactory for KubeResourceClientFactory {
    fn has_kubeconfig(&self) -> bool {
        self.kubeconfig.is_some()
    }

    async fn client_for(&self, cluster_id: &str, context: &str) -> Result<Arc<dyn ResourceClient>> {
        if let Some(client) = self.clients.read().await.get(context) {
            let client: Arc<dyn ResourceClient> = client.clone();
            return Ok(client);
        }

        let kubeconfig = self
            .kubeconfig
            .clone()
            .ok_or_else(|| ProviderError::Kubeconfig("no kubeconfig loaded".to_string()))?;
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            ..Default::default()
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|e| ProviderError::Kubeconfig(format!("failed to load context {}: {}", context, e)))?;
        let client = Client::try_from(config).map_err(|e| ProviderError::kube("build client", cluster_id, e))?;

        let client = Arc::new(KubeResourceClient::new(cluster_id, client));
        self.clients
            .write()
            .await
            .insert(context.to_string(), client.clone());
        let client: Arc<dyn ResourceClient> = client;
        Ok(client)
    }
}
