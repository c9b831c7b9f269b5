//! In-memory resource client for testing the standalone provider
//!
//! Objects are stored by kind, namespace and name. Every kind resolves
//! unless it was denied with [`MockResourceClient::deny_kind`]; a few
//! well-known kinds are cluster scoped.

use super::client::{ResolvedResource, ResourceClient, ResourceClientFactory};
use crate::error::{ProviderError, Result};
use kube::api::{DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const CLUSTER_SCOPED_KINDS: &[&str] = &["Namespace", "OAuth", "ClusterRole", "ClusterRoleBinding", "Project"];

type ObjectKey = (String, String, String);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<ObjectKey, DynamicObject>,
    denied_kinds: HashSet<String>,
    get_failure: Option<String>,
    creates: usize,
    replaces: usize,
    last_replaced_resource_version: Option<String>,
}

/// Mock resource client for testing
///
/// Clones share the same in-memory state.
#[derive(Debug, Clone, Default)]
pub struct MockResourceClient {
    state: Arc<Mutex<State>>,
}

fn object_key(resource: &ResolvedResource, namespace: Option<&str>, name: &str) -> ObjectKey {
    (
        resource.api_resource.kind.clone(),
        resource.scope_namespace(namespace).unwrap_or_default().to_string(),
        name.to_string(),
    )
}

impl MockResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object as if it already existed on the cluster
    pub fn insert(&self, object: DynamicObject) {
        let kind = object.types.as_ref().map(|t| t.kind.clone()).unwrap_or_default();
        let namespace = if CLUSTER_SCOPED_KINDS.contains(&kind.as_str()) {
            String::new()
        } else {
            object.metadata.namespace.clone().unwrap_or_default()
        };
        let name = object.metadata.name.clone().unwrap_or_default();
        lock(&self.state).objects.insert((kind, namespace, name), object);
    }

    /// Stored object, looked up by kind, namespace and name
    pub fn object(&self, kind: &str, namespace: Option<&str>, name: &str) -> Option<DynamicObject> {
        let key = (kind.to_string(), namespace.unwrap_or_default().to_string(), name.to_string());
        lock(&self.state).objects.get(&key).cloned()
    }

    /// All stored objects of a kind
    pub fn objects_of_kind(&self, kind: &str) -> Vec<DynamicObject> {
        lock(&self.state)
            .objects
            .iter()
            .filter(|((k, _, _), _)| k == kind)
            .map(|(_, o)| o.clone())
            .collect()
    }

    /// Make discovery fail for `kind`
    pub fn deny_kind(&self, kind: &str) {
        lock(&self.state).denied_kinds.insert(kind.to_string());
    }

    /// Make every later read fail with a backend error
    pub fn fail_gets(&self, message: &str) {
        lock(&self.state).get_failure = Some(message.to_string());
    }

    pub fn create_count(&self) -> usize {
        lock(&self.state).creates
    }

    pub fn replace_count(&self) -> usize {
        lock(&self.state).replaces
    }

    /// Resource version the last replaced object was sent with
    pub fn last_replaced_resource_version(&self) -> Option<String> {
        lock(&self.state).last_replaced_resource_version.clone()
    }
}

#[async_trait::async_trait]
impl ResourceClient for MockResourceClient {
    async fn resolve(&self, gvk: &GroupVersionKind) -> Result<ResolvedResource> {
        if lock(&self.state).denied_kinds.contains(&gvk.kind) {
            return Err(ProviderError::UnknownResource(format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)));
        }
        Ok(ResolvedResource {
            api_resource: ApiResource::from_gvk(gvk),
            namespaced: !CLUSTER_SCOPED_KINDS.contains(&gvk.kind.as_str()),
        })
    }

    async fn get(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>> {
        let state = lock(&self.state);
        if let Some(message) = &state.get_failure {
            return Err(ProviderError::Backend(message.clone()));
        }
        Ok(state.objects.get(&object_key(resource, namespace, name)).cloned())
    }

    async fn create(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        let name = object.metadata.name.clone().unwrap_or_default();
        let key = object_key(resource, namespace, &name);
        let mut state = lock(&self.state);
        if state.objects.contains_key(&key) {
            return Err(ProviderError::Backend(format!("{} {} already exists", key.0, name)));
        }
        let mut created = object.clone();
        created.metadata.resource_version = Some("1".to_string());
        state.creates += 1;
        state.objects.insert(key, created.clone());
        Ok(created)
    }

    async fn replace(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        name: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        let key = object_key(resource, namespace, name);
        let mut state = lock(&self.state);
        let current = state
            .objects
            .get(&key)
            .ok_or_else(|| ProviderError::Backend(format!("{} {} not found", key.0, name)))?;
        if current.metadata.resource_version != object.metadata.resource_version {
            return Err(ProviderError::Backend(format!("{} {} resource version conflict", key.0, name)));
        }

        let next_version = current
            .metadata
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        let mut replaced = object.clone();
        replaced.metadata.resource_version = Some(next_version.to_string());
        state.replaces += 1;
        state.last_replaced_resource_version = object.metadata.resource_version.clone();
        state.objects.insert(key, replaced.clone());
        Ok(replaced)
    }
}

/// Factory handing out one shared [`MockResourceClient`]
#[derive(Debug, Clone)]
pub struct MockResourceClientFactory {
    client: MockResourceClient,
    has_kubeconfig: bool,
    contexts: Arc<Mutex<Vec<String>>>,
}

impl MockResourceClientFactory {
    pub fn new(client: MockResourceClient) -> Self {
        Self {
            client,
            has_kubeconfig: true,
            contexts: Arc::default(),
        }
    }

    /// Factory behaving as if no kubeconfig was loaded
    pub fn without_kubeconfig() -> Self {
        Self {
            has_kubeconfig: false,
            ..Self::new(MockResourceClient::new())
        }
    }

    /// Contexts clients were requested for, in order
    pub fn requested_contexts(&self) -> Vec<String> {
        lock(&self.contexts).clone()
    }
}

#[async_trait::async_trait]
impl ResourceClientFactory for MockResourceClientFactory {
    fn has_kubeconfig(&self) -> bool {
        self.has_kubeconfig
    }

    async fn client_for(&self, _cluster_id: &str, context: &str) -> Result<Arc<dyn ResourceClient>> {
        lock(&self.contexts).push(context.to_string());
        let client: Arc<dyn ResourceClient> = Arc::new(self.client.clone());
        Ok(client)
    }
}
