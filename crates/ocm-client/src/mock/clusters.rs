//! Cluster operations for MockOcmClient
//!
//! Handles clusters, ingresses, compute nodes, machine pools, metrics and
//! cloud providers

use super::{lock, MockOcmClient};
use crate::error::OcmError;
use crate::models::*;

fn not_found(kind: &str, id: &str) -> OcmError {
    OcmError::NotFound(format!("{} {} not found", kind, id))
}

pub fn create_cluster(client: &MockOcmClient, cluster: &Cluster) -> Result<Cluster, OcmError> {
    client.record("create_cluster")?;

    let mut created = cluster.clone();
    let id = created.id.clone().unwrap_or_else(|| client.generate_id("cluster"));
    created.id = Some(id.clone());
    created.href = Some(format!("{}/api/clusters_mgmt/v1/clusters/{}", client.base_url, id));
    created.state = Some(ClusterState::Pending);
    created.status = Some(ClusterStatus {
        state: Some(ClusterState::Pending),
        ..Default::default()
    });

    lock(&client.clusters).insert(id, created.clone());
    Ok(created)
}

pub fn get_cluster(client: &MockOcmClient, cluster_id: &str) -> Result<Cluster, OcmError> {
    client.record("get_cluster")?;
    lock(&client.clusters)
        .get(cluster_id)
        .cloned()
        .ok_or_else(|| not_found("Cluster", cluster_id))
}

pub fn delete_cluster(client: &MockOcmClient, cluster_id: &str) -> Result<(), OcmError> {
    client.record("delete_cluster")?;
    lock(&client.clusters)
        .remove(cluster_id)
        .map(|_| ())
        .ok_or_else(|| not_found("Cluster", cluster_id))
}

pub fn get_cluster_ingresses(client: &MockOcmClient, cluster_id: &str) -> Result<Vec<Ingress>, OcmError> {
    client.record("get_cluster_ingresses")?;
    Ok(lock(&client.ingresses)
        .get(cluster_id)
        .cloned()
        .unwrap_or_default())
}

fn store_compute_nodes(client: &MockOcmClient, cluster_id: &str, nodes: i64) -> Result<Cluster, OcmError> {
    if nodes < 0 {
        return Err(OcmError::InvalidRequest(format!(
            "compute node count for cluster {} cannot be negative: {}",
            cluster_id, nodes
        )));
    }
    let mut clusters = lock(&client.clusters);
    let cluster = clusters
        .get_mut(cluster_id)
        .ok_or_else(|| not_found("Cluster", cluster_id))?;
    cluster.nodes.get_or_insert_with(ClusterNodes::default).compute = Some(nodes);
    Ok(cluster.clone())
}

pub fn adjust_compute_nodes(
    client: &MockOcmClient,
    operation: &str,
    cluster_id: &str,
    delta: i64,
) -> Result<Cluster, OcmError> {
    client.record(operation)?;
    let current = lock(&client.clusters)
        .get(cluster_id)
        .ok_or_else(|| not_found("Cluster", cluster_id))?
        .desired_compute_nodes()
        .ok_or_else(|| OcmError::Api(format!("cluster {} does not report a compute node count", cluster_id)))?;
    store_compute_nodes(client, cluster_id, current + delta)
}

pub fn set_compute_nodes(client: &MockOcmClient, cluster_id: &str, nodes: i64) -> Result<Cluster, OcmError> {
    client.record("set_compute_nodes")?;
    store_compute_nodes(client, cluster_id, nodes)
}

pub fn get_machine_pool(
    client: &MockOcmClient,
    cluster_id: &str,
    machine_pool_id: &str,
) -> Result<Option<MachinePool>, OcmError> {
    client.record("get_machine_pool")?;
    Ok(lock(&client.machine_pools)
        .get(&(cluster_id.to_string(), machine_pool_id.to_string()))
        .cloned())
}

pub fn create_machine_pool(
    client: &MockOcmClient,
    cluster_id: &str,
    machine_pool: &MachinePool,
) -> Result<MachinePool, OcmError> {
    client.record("create_machine_pool")?;
    if !lock(&client.clusters).contains_key(cluster_id) {
        return Err(not_found("Cluster", cluster_id));
    }

    let id = machine_pool
        .id
        .clone()
        .ok_or_else(|| OcmError::InvalidRequest("machine pool id is required".to_string()))?;
    let mut pools = lock(&client.machine_pools);
    let key = (cluster_id.to_string(), id.clone());
    if pools.contains_key(&key) {
        return Err(OcmError::Api(format!("Machine pool '{}' already exists", id)));
    }

    let mut created = machine_pool.clone();
    created.href = Some(format!(
        "{}/api/clusters_mgmt/v1/clusters/{}/machine_pools/{}",
        client.base_url, cluster_id, id
    ));
    pools.insert(key, created.clone());
    Ok(created)
}

pub fn get_existing_cluster_metrics(
    client: &MockOcmClient,
    cluster_id: &str,
) -> Result<Option<SubscriptionMetrics>, OcmError> {
    client.record("get_existing_cluster_metrics")?;
    Ok(lock(&client.metrics).get(cluster_id).cloned())
}

pub fn get_cloud_providers(client: &MockOcmClient) -> Result<Vec<CloudProvider>, OcmError> {
    client.record("get_cloud_providers")?;
    Ok(lock(&client.cloud_providers).clone())
}

pub fn get_regions(client: &MockOcmClient, cloud_provider_id: &str) -> Result<Vec<CloudRegion>, OcmError> {
    client.record("get_regions")?;
    lock(&client.regions)
        .get(cloud_provider_id)
        .cloned()
        .ok_or_else(|| not_found("Cloud provider", cloud_provider_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocm_trait::ClusterManagementClient;

    fn cluster_with_nodes(id: &str, compute: i64) -> Cluster {
        Cluster {
            id: Some(id.to_string()),
            nodes: Some(ClusterNodes {
                compute: Some(compute),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_cluster_assigns_id() {
        let mock = MockOcmClient::new("http://ocm.test");
        let created = mock.create_cluster(&Cluster::default()).await.unwrap();
        let id = created.id.clone().unwrap();
        assert_eq!(created.current_state(), ClusterState::Pending);
        assert_eq!(mock.get_cluster(&id).await.unwrap().id, Some(id));
    }

    #[tokio::test]
    async fn test_scale_compute_nodes() {
        let mock = MockOcmClient::new("http://ocm.test");
        mock.add_cluster(cluster_with_nodes("c1", 3));

        let scaled = mock.scale_up_compute_nodes("c1", 3).await.unwrap();
        assert_eq!(scaled.desired_compute_nodes(), Some(6));

        let scaled = mock.scale_down_compute_nodes("c1", 2).await.unwrap();
        assert_eq!(scaled.desired_compute_nodes(), Some(4));

        let err = mock.scale_down_compute_nodes("c1", 10).await.unwrap_err();
        assert!(matches!(err, OcmError::InvalidRequest(_)));

        let set = mock.set_compute_nodes("c1", 9).await.unwrap();
        assert_eq!(set.desired_compute_nodes(), Some(9));
    }

    #[tokio::test]
    async fn test_machine_pool_lifecycle() {
        let mock = MockOcmClient::new("http://ocm.test");
        let pool = MachinePool {
            id: Some("kafka-standard".to_string()),
            instance_type: Some("m5.2xlarge".to_string()),
            ..Default::default()
        };

        let err = mock.create_machine_pool("c1", &pool).await.unwrap_err();
        assert!(err.is_not_found());

        mock.add_cluster(cluster_with_nodes("c1", 3));
        assert!(mock.get_machine_pool("c1", "kafka-standard").await.unwrap().is_none());

        let created = mock.create_machine_pool("c1", &pool).await.unwrap();
        assert!(created.href.unwrap().ends_with("/clusters/c1/machine_pools/kafka-standard"));
        assert_eq!(
            mock.get_machine_pool("c1", "kafka-standard").await.unwrap().unwrap().instance_type.as_deref(),
            Some("m5.2xlarge")
        );
        assert!(matches!(mock.create_machine_pool("c1", &pool).await, Err(OcmError::Api(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_cluster_is_not_found() {
        let mock = MockOcmClient::new("http://ocm.test");
        assert!(mock.delete_cluster("missing").await.unwrap_err().is_not_found());
    }
}
