//! Cloud providers and regions offered by the fleet

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Cloud provider a cluster can run on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CloudProviderInfo {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

/// Region of a cloud provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CloudProviderRegionInfo {
    pub id: String,
    pub cloud_provider_id: String,
    pub name: String,
    pub display_name: String,
    pub supports_multi_az: bool,
}

/// Append the regions of `source` whose id is not yet in `target`
///
/// Entries already in `target` win; new ids keep their order in `source`.
pub fn merge_regions(
    target: Vec<CloudProviderRegionInfo>,
    source: impl IntoIterator<Item = CloudProviderRegionInfo>,
) -> Vec<CloudProviderRegionInfo> {
    let mut seen: HashSet<String> = target.iter().map(|r| r.id.clone()).collect();
    let mut merged = target;
    for region in source {
        if seen.insert(region.id.clone()) {
            merged.push(region);
        }
    }
    merged
}
