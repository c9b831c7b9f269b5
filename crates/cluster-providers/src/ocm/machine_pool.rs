//! Machine pools on managed clusters

use crate::error::{ProviderError, Result};
use fleet_types::{ClusterNodeTaint, MachinePoolAutoScaling, MachinePoolInfo, MachinePoolRequest};
use ocm_client::{MachinePool, MachinePoolAutoscaling, Taint};

/// Multi-AZ pools spread nodes evenly over three zones
pub(crate) const MULTI_AZ_NODE_SCALING_MULTIPLE: i64 = 3;

pub(crate) fn machine_pool_info(pool: MachinePool) -> MachinePoolInfo {
    let auto_scaling = pool
        .autoscaling
        .as_ref()
        .map(|a| MachinePoolAutoScaling {
            min_nodes: a.min_replicas,
            max_nodes: a.max_replicas,
        })
        .unwrap_or_default();
    MachinePoolInfo {
        id: pool.id.unwrap_or_default(),
        instance_size: pool.instance_type.unwrap_or_default(),
        multi_az: pool.availability_zones.len() > 1,
        auto_scaling_enabled: pool.autoscaling.is_some(),
        auto_scaling,
        node_labels: pool.labels,
        node_taints: pool
            .taints
            .into_iter()
            .map(|t| ClusterNodeTaint {
                key: t.key,
                value: t.value,
                effect: t.effect,
            })
            .collect(),
    }
}

/// Autoscaling bounds to send, rounded up to whole zones for multi-AZ pools
pub(crate) fn effective_auto_scaling(request: &MachinePoolRequest) -> Result<MachinePoolAutoScaling> {
    let bounds = if request.multi_az {
        request.auto_scaling.rounded_up(MULTI_AZ_NODE_SCALING_MULTIPLE)
    } else {
        request.auto_scaling
    };
    if bounds.min_nodes > bounds.max_nodes {
        return Err(ProviderError::InvalidArgument(format!(
            "machine pool {} for cluster {}: minimum number of nodes {} cannot be more than maximum {}",
            request.id, request.cluster_id, bounds.min_nodes, bounds.max_nodes
        )));
    }
    Ok(bounds)
}

pub(crate) fn build_machine_pool(request: &MachinePoolRequest, bounds: Option<MachinePoolAutoScaling>) -> MachinePool {
    MachinePool {
        id: Some(request.id.clone()),
        instance_type: Some(request.instance_size.clone()),
        autoscaling: bounds.map(|b| MachinePoolAutoscaling {
            min_replicas: b.min_nodes,
            max_replicas: b.max_nodes,
        }),
        labels: request.node_labels.clone(),
        taints: request
            .node_taints
            .iter()
            .map(|t| Taint {
                key: t.key.clone(),
                value: t.value.clone(),
                effect: t.effect.clone(),
            })
            .collect(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request(multi_az: bool, min_nodes: i64, max_nodes: i64) -> MachinePoolRequest {
        MachinePoolRequest {
            id: "kafka-standard".to_string(),
            cluster_id: "c1".to_string(),
            instance_size: "m5.2xlarge".to_string(),
            multi_az,
            auto_scaling_enabled: true,
            auto_scaling: MachinePoolAutoScaling { min_nodes, max_nodes },
            ..Default::default()
        }
    }

    #[test]
    fn test_multi_az_bounds_rounded_to_zones() {
        let bounds = effective_auto_scaling(&request(true, 1, 5)).unwrap();
        assert_eq!(bounds, MachinePoolAutoScaling { min_nodes: 3, max_nodes: 6 });
    }

    #[test]
    fn test_single_az_bounds_unchanged() {
        let bounds = effective_auto_scaling(&request(false, 1, 5)).unwrap();
        assert_eq!(bounds, MachinePoolAutoScaling { min_nodes: 1, max_nodes: 5 });
    }

    #[test]
    fn test_min_above_max_rejected() {
        let err = effective_auto_scaling(&request(false, 6, 3)).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
        // bounds are compared after rounding
        assert!(effective_auto_scaling(&request(true, 4, 2)).is_err());
        assert!(effective_auto_scaling(&request(true, 5, 4)).is_ok());
    }

    #[test]
    fn test_machine_pool_info_from_backend() {
        let pool = MachinePool {
            id: Some("kafka-standard".to_string()),
            instance_type: Some("m5.2xlarge".to_string()),
            autoscaling: Some(MachinePoolAutoscaling {
                min_replicas: 3,
                max_replicas: 9,
            }),
            availability_zones: vec!["us-east-1a".to_string(), "us-east-1b".to_string()],
            labels: BTreeMap::from([("bf2.org/kafkaInstanceProfileType".to_string(), "standard".to_string())]),
            taints: vec![Taint {
                key: "bf2.org/kafkaInstanceProfileType".to_string(),
                value: "standard".to_string(),
                effect: "NoExecute".to_string(),
            }],
            ..Default::default()
        };

        let info = machine_pool_info(pool);
        assert!(info.multi_az);
        assert!(info.auto_scaling_enabled);
        assert_eq!(info.auto_scaling.max_nodes, 9);
        assert_eq!(info.node_taints[0].effect, "NoExecute");
        assert_eq!(info.node_labels.len(), 1);
    }
}
