use serde_json::json;

use crate::entity::{entity_id_from_key, entity_id_trim_prefix, entity_type, namespace_of};
use crate::error::EntityError;
use crate::types::{Grouping, RawGroups, CONTAINER_GROUP, NODE_GROUP, POD_GROUP, VOLUME_GROUP};

/// Result of one collection cycle, ready to be handed to a transmitter.
pub struct CycleReport {
    pub cluster_name: String,
    pub grouping: Grouping,
}

impl CycleReport {
    pub fn new(cluster_name: impl Into<String>, grouping: Grouping) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            grouping,
        }
    }

    fn count(&self, label: &str) -> usize {
        self.grouping.group(label).map_or(0, |g| g.len())
    }

    /// Check if any entity failed extraction during the cycle
    pub fn has_errors(&self) -> bool {
        !self.grouping.errors.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            node_count: self.count(NODE_GROUP),
            pod_count: self.count(POD_GROUP),
            container_count: self.count(CONTAINER_GROUP),
            volume_count: self.count(VOLUME_GROUP),
            error_count: self.grouping.errors.len(),
        }
    }

    /// Build the JSON payload: one labeled entry per record plus the cycle errors.
    ///
    /// Records whose entity labels cannot be derived are listed under `errors`.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut entities: Vec<serde_json::Value> = Vec::new();
        let mut errors: Vec<String> = self.grouping.errors.iter().map(|e| e.to_string()).collect();

        for (label, records) in &self.grouping.groups {
            for (raw_entity_id, metrics) in records {
                let labels = entity_id(label, raw_entity_id, &self.grouping.groups).and_then(|id| {
                    entity_type(label, raw_entity_id, &self.grouping.groups, &self.cluster_name).map(|t| (id, t))
                });
                match labels {
                    Ok((id, kind)) => entities.push(json!({
                        "entityType": kind,
                        "entityId": id,
                        "group": label,
                        "namespace": namespace_of(metrics),
                        "metrics": metrics,
                    })),
                    Err(e) => errors.push(format!("{} {}: {}", label, raw_entity_id, e)),
                }
            }
        }

        json!({
            "cluster": self.cluster_name,
            "summary": self.summary().to_json(),
            "entities": entities,
            "errors": errors,
        })
    }
}

fn entity_id(label: &str, raw_entity_id: &str, groups: &RawGroups) -> Result<String, EntityError> {
    match label {
        NODE_GROUP => entity_id_from_key("nodeName", label, raw_entity_id, groups),
        POD_GROUP => entity_id_trim_prefix("namespace", label, raw_entity_id, groups),
        CONTAINER_GROUP => entity_id_from_key("containerName", label, raw_entity_id, groups),
        _ => entity_id_from_key("volumeName", label, raw_entity_id, groups),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub node_count: usize,
    pub pod_count: usize,
    pub container_count: usize,
    pub volume_count: usize,
    pub error_count: usize,
}

impl ReportSummary {
    pub fn total_entities(&self) -> usize {
        self.node_count + self.pod_count + self.container_count + self.volume_count
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "nodes": self.node_count,
            "pods": self.pod_count,
            "containers": self.container_count,
            "volumes": self.volume_count,
            "errors": self.error_count,
        })
    }
}
