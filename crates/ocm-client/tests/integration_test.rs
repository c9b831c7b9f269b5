//! Integration tests for the cluster management client
//!
//! These tests require access to a cluster management service.
//! Set OCM_URL and OCM_TOKEN environment variables to run, and
//! OCM_CLUSTER_ID for the tests that inspect an existing cluster.

use ocm_client::{ClusterManagementClient, OcmClient};

fn client() -> OcmClient {
    let url = std::env::var("OCM_URL")
        .unwrap_or_else(|_| "https://api.stage.openshift.com".to_string());
    let token = std::env::var("OCM_TOKEN")
        .expect("OCM_TOKEN environment variable must be set");

    OcmClient::new(url, token).expect("Failed to create client")
}

fn cluster_id() -> String {
    std::env::var("OCM_CLUSTER_ID").expect("OCM_CLUSTER_ID environment variable must be set")
}

#[tokio::test]
#[ignore] // Requires a reachable cluster management service
async fn test_list_cloud_providers() {
    let client = client();

    let providers = client.get_cloud_providers().await
        .expect("Failed to list cloud providers");
    assert!(!providers.is_empty(), "Expected at least one cloud provider");

    let regions = client.get_regions(&providers[0].id).await
        .expect("Failed to list regions");
    println!("{} has {} regions", providers[0].id, regions.len());
}

#[tokio::test]
#[ignore]
async fn test_get_cluster() {
    let client = client();
    let id = cluster_id();

    let cluster = client.get_cluster(&id).await
        .expect("Failed to get cluster");
    assert_eq!(cluster.id.as_deref(), Some(id.as_str()));
    println!("Cluster {} is {:?}", id, cluster.current_state());
}

#[tokio::test]
#[ignore]
async fn test_get_cluster_ingresses() {
    let client = client();

    let ingresses = client.get_cluster_ingresses(&cluster_id()).await
        .expect("Failed to list ingresses");
    let default = ingresses.iter().find(|i| i.default);
    println!("Default ingress: {:?}", default.and_then(|i| i.dns_name.as_ref()));
}

#[tokio::test]
#[ignore]
async fn test_get_cluster_metrics() {
    let client = client();

    let metrics = client.get_existing_cluster_metrics(&cluster_id()).await
        .expect("Failed to query subscription metrics");
    println!("Metrics: {:?}", metrics);
}

#[tokio::test]
#[ignore]
async fn test_missing_cluster_is_not_found() {
    let client = client();

    let err = client.get_cluster("this-cluster-does-not-exist").await.unwrap_err();
    assert!(err.is_not_found(), "Expected NotFound, got {:?}", err);
}
