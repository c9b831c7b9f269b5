//! Queries over the manual cluster catalog

use fleet_types::ManualCluster;
use std::collections::HashMap;

/// Manual cluster catalog, in file order, indexed by cluster id
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    clusters: Vec<ManualCluster>,
    by_id: HashMap<String, usize>,
}

impl ClusterConfig {
    pub fn new(clusters: Vec<ManualCluster>) -> Self {
        let by_id = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.cluster_id.clone(), i))
            .collect();
        Self { clusters, by_id }
    }

    fn get(&self, cluster_id: &str) -> Option<&ManualCluster> {
        self.by_id.get(cluster_id).map(|&i| &self.clusters[i])
    }

    /// Catalog entry of a cluster
    pub fn cluster(&self, cluster_id: &str) -> Option<&ManualCluster> {
        self.get(cluster_id)
    }

    /// All catalog entries in file order
    pub fn manual_clusters(&self) -> &[ManualCluster] {
        &self.clusters
    }

    /// Total Kafka instance limit of the schedulable clusters in `region`
    pub fn capacity_for_region(&self, region: &str) -> i64 {
        self.clusters
            .iter()
            .filter(|c| c.region == region && c.schedulable)
            .map(|c| c.kafka_instance_limit)
            .sum()
    }

    /// Capacity of the schedulable clusters in `region` accepting `instance_type`
    ///
    /// With `isolated_only` only clusters dedicated to exactly that instance
    /// type count.
    pub fn capacity_for_region_and_instance_type(&self, region: &str, instance_type: &str, isolated_only: bool) -> i64 {
        self.clusters
            .iter()
            .filter(|c| c.region == region && c.schedulable)
            .filter(|c| {
                if isolated_only {
                    c.supported_instance_type == instance_type
                } else {
                    c.supported_instance_type.contains(instance_type)
                }
            })
            .map(|c| c.kafka_instance_limit)
            .sum()
    }

    /// Returns true when `count` instances fit the cluster limit
    ///
    /// A limit of `-1` means unlimited; clusters outside the catalog are not limited.
    pub fn is_number_of_kafka_within_limit(&self, cluster_id: &str, count: i64) -> bool {
        self.get(cluster_id)
            .is_none_or(|c| c.kafka_instance_limit == -1 || count <= c.kafka_instance_limit)
    }

    /// Clusters outside the catalog are schedulable
    pub fn is_cluster_schedulable(&self, cluster_id: &str) -> bool {
        self.get(cluster_id).is_none_or(|c| c.schedulable)
    }

    pub fn supported_instance_type(&self, cluster_id: &str) -> Option<&str> {
        self.get(cluster_id).map(|c| c.supported_instance_type.as_str())
    }

    /// Known cluster ids that are not in the catalog
    pub fn excess_clusters<'a, I>(&self, known_cluster_ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        known_cluster_ids
            .into_iter()
            .filter(|id| !self.by_id.contains_key(*id))
            .map(str::to_string)
            .collect()
    }

    /// Catalog entries whose id is not known, in catalog order
    pub fn missing_clusters<'a, I>(&self, known_cluster_ids: I) -> Vec<ManualCluster>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: std::collections::HashSet<&str> = known_cluster_ids.into_iter().collect();
        self.clusters
            .iter()
            .filter(|c| !known.contains(c.cluster_id.as_str()))
            .cloned()
            .collect()
    }

    /// Kubeconfig context name of a catalog cluster
    pub fn find_cluster_name_by_cluster_id(&self, cluster_id: &str) -> Option<&str> {
        self.get(cluster_id).map(|c| c.name.as_str())
    }
}
