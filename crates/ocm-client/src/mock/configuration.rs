//! Identity provider and syncset operations for MockOcmClient

use super::{lock, MockOcmClient};
use crate::error::OcmError;
use crate::models::*;

pub fn create_identity_provider(
    client: &MockOcmClient,
    cluster_id: &str,
    identity_provider: &IdentityProvider,
) -> Result<IdentityProvider, OcmError> {
    client.record("create_identity_provider")?;

    let mut providers = lock(&client.identity_providers);
    let existing = providers.entry(cluster_id.to_string()).or_default();
    if existing.iter().any(|p| p.name == identity_provider.name) {
        // mirrors the conflict message returned by the real service
        return Err(OcmError::Api(format!(
            "Identity provider named '{}' already exists",
            identity_provider.name.as_deref().unwrap_or_default()
        )));
    }

    let mut created = identity_provider.clone();
    created.id = client.created_id("idp");
    existing.push(created.clone());
    Ok(created)
}

pub fn get_identity_providers(client: &MockOcmClient, cluster_id: &str) -> Result<Vec<IdentityProvider>, OcmError> {
    client.record("get_identity_providers")?;
    Ok(lock(&client.identity_providers)
        .get(cluster_id)
        .cloned()
        .unwrap_or_default())
}

pub fn get_syncset(client: &MockOcmClient, cluster_id: &str, syncset_id: &str) -> Result<Syncset, OcmError> {
    client.record("get_syncset")?;
    lock(&client.syncsets)
        .get(&(cluster_id.to_string(), syncset_id.to_string()))
        .cloned()
        .ok_or_else(|| OcmError::NotFound(format!("Syncset {} not found on cluster {}", syncset_id, cluster_id)))
}

pub fn create_syncset(client: &MockOcmClient, cluster_id: &str, syncset: &Syncset) -> Result<Syncset, OcmError> {
    client.record("create_syncset")?;

    let id = syncset.id.clone().ok_or_else(|| {
        OcmError::InvalidRequest("syncset id is required".to_string())
    })?;
    let key = (cluster_id.to_string(), id.clone());
    let mut syncsets = lock(&client.syncsets);
    if syncsets.contains_key(&key) {
        return Err(OcmError::Api(format!("Syncset {} already exists on cluster {}", id, cluster_id)));
    }
    syncsets.insert(key, syncset.clone());
    Ok(syncset.clone())
}

pub fn update_syncset(
    client: &MockOcmClient,
    cluster_id: &str,
    syncset_id: &str,
    syncset: &Syncset,
) -> Result<Syncset, OcmError> {
    client.record("update_syncset")?;

    let mut syncsets = lock(&client.syncsets);
    let stored = syncsets
        .get_mut(&(cluster_id.to_string(), syncset_id.to_string()))
        .ok_or_else(|| OcmError::NotFound(format!("Syncset {} not found on cluster {}", syncset_id, cluster_id)))?;
    stored.resources = syncset.resources.clone();
    Ok(stored.clone())
}

pub fn delete_syncset(client: &MockOcmClient, cluster_id: &str, syncset_id: &str) -> Result<(), OcmError> {
    client.record("delete_syncset")?;
    lock(&client.syncsets)
        .remove(&(cluster_id.to_string(), syncset_id.to_string()))
        .map(|_| ())
        .ok_or_else(|| OcmError::NotFound(format!("Syncset {} not found on cluster {}", syncset_id, cluster_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocm_trait::ClusterManagementClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_duplicate_identity_provider_reports_already_exists() {
        let mock = MockOcmClient::new("http://ocm.test");
        let idp = IdentityProvider {
            name: Some("Kafka_SRE".to_string()),
            ..Default::default()
        };
        mock.create_identity_provider("c1", &idp).await.unwrap();
        let err = mock.create_identity_provider("c1", &idp).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(mock.get_identity_providers("c1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_syncset_lifecycle() {
        let mock = MockOcmClient::new("http://ocm.test");
        assert!(mock.get_syncset("c1", "ext-1").await.unwrap_err().is_not_found());

        let syncset = Syncset {
            id: Some("ext-1".to_string()),
            href: None,
            resources: vec![json!({"kind": "Namespace"})],
        };
        mock.create_syncset("c1", &syncset).await.unwrap();

        let updated = Syncset {
            resources: vec![json!({"kind": "Namespace"}), json!({"kind": "Secret"})],
            ..syncset.clone()
        };
        mock.update_syncset("c1", "ext-1", &updated).await.unwrap();
        assert_eq!(mock.syncset("c1", "ext-1").unwrap().resources.len(), 2);

        mock.delete_syncset("c1", "ext-1").await.unwrap();
        assert!(mock.delete_syncset("c1", "ext-1").await.unwrap_err().is_not_found());
    }
}
