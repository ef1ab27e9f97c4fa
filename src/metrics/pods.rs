use crate::error::GroupingError;
use crate::metrics::base::{add_fs_metrics, add_network_metrics, add_u64_raw_metric};
use crate::stats::{ContainerStats, PodStats};
use crate::types::{RawMetrics, RawValue};

/// Raw entity id of a pod: `"{namespace}_{podName}"`.
pub fn pod_entity_id(namespace: &str, pod_name: &str) -> String {
    format!("{}_{}", namespace, pod_name)
}

/// Raw entity id of a container or volume: `"{namespace}_{podName}_{name}"`.
pub fn pod_child_entity_id(namespace: &str, pod_name: &str, name: &str) -> String {
    format!("{}_{}_{}", namespace, pod_name, name)
}

/// Extract the pod record together with its raw entity id.
pub fn fetch_pod_stats(pod: &PodStats) -> Result<(RawMetrics, String), GroupingError> {
    let name = pod.pod_ref.name.as_str();
    let namespace = pod.pod_ref.namespace.as_str();
    if name.is_empty() || namespace.is_empty() {
        return Err(GroupingError::EmptyPodIdentifier {
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
    }

    let mut r = RawMetrics::new();
    r.insert("podName".to_string(), RawValue::from(name));
    r.insert("namespace".to_string(), RawValue::from(namespace));

    if let Some(network) = pod.network.as_ref() {
        add_network_metrics(&mut r, network);
    }

    Ok((r, pod_entity_id(namespace, name)))
}

/// Extract a container record. `pod_id` only labels the error.
pub fn fetch_container_stats(c: &ContainerStats, pod_id: &str) -> Result<RawMetrics, GroupingError> {
    if c.name.is_empty() {
        return Err(GroupingError::EmptyContainerIdentifier {
            pod: pod_id.to_string(),
        });
    }

    let mut r = RawMetrics::new();
    r.insert("containerName".to_string(), RawValue::from(c.name.as_str()));

    if let Some(cpu) = c.cpu.as_ref() {
        add_u64_raw_metric(&mut r, "usageNanoCores", cpu.usage_nano_cores);
    }
    if let Some(memory) = c.memory.as_ref() {
        add_u64_raw_metric(&mut r, "usageBytes", memory.usage_bytes);
        add_u64_raw_metric(&mut r, "workingSetBytes", memory.working_set_bytes);
    }
    if let Some(rootfs) = c.rootfs.as_ref() {
        add_fs_metrics(&mut r, "fs", rootfs);
    }

    Ok(r)
}
