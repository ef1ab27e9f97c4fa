use crate::error::EntityError;
use crate::types::{RawGroups, RawMetrics, CONTAINER_GROUP, NODE_GROUP};

fn lookup<'a>(groups: &'a RawGroups, label: &str, raw_entity_id: &str) -> Result<&'a RawMetrics, EntityError> {
    let group = groups.get(label).ok_or_else(|| EntityError::GroupNotFound {
        label: label.to_string(),
    })?;
    group.get(raw_entity_id).ok_or_else(|| EntityError::EntityNotFound {
        raw_entity_id: raw_entity_id.to_string(),
        label: label.to_string(),
    })
}

fn string_field<'a>(metrics: &'a RawMetrics, key: &str, label: &str) -> Result<&'a str, EntityError> {
    let value = metrics.get(key).ok_or_else(|| EntityError::KeyNotFound {
        key: key.to_string(),
        label: label.to_string(),
    })?;
    value.as_str().ok_or_else(|| EntityError::IncorrectType {
        key: key.to_string(),
        label: label.to_string(),
    })
}

/// Entity id taken verbatim from the string field `key` of the record.
pub fn entity_id_from_key(key: &str, label: &str, raw_entity_id: &str, groups: &RawGroups) -> Result<String, EntityError> {
    let metrics = lookup(groups, label, raw_entity_id)?;
    string_field(metrics, key, label).map(str::to_string)
}

/// Entity id made of the raw entity id with the `"{record[key]}_"` prefix removed.
///
/// Used for pods, whose raw id is `"{namespace}_{podName}"`.
pub fn entity_id_trim_prefix(key: &str, label: &str, raw_entity_id: &str, groups: &RawGroups) -> Result<String, EntityError> {
    let metrics = lookup(groups, label, raw_entity_id)?;
    let prefix = format!("{}_", string_field(metrics, key, label)?);

    let id = raw_entity_id.strip_prefix(prefix.as_str()).unwrap_or(raw_entity_id);
    if id.is_empty() {
        return Err(EntityError::EmptyEntityId);
    }
    Ok(id.to_string())
}

/// Entity type of a record.
///
/// - `node` and `namespace`: `k8s:{cluster}:{label}`
/// - `container`: `k8s:{cluster}:{namespace}:{podName}:container`
/// - anything else: `k8s:{cluster}:{namespace}:{label}`
pub fn entity_type(label: &str, raw_entity_id: &str, groups: &RawGroups, cluster_name: &str) -> Result<String, EntityError> {
    if label == NODE_GROUP || label == "namespace" {
        return Ok(format!("k8s:{}:{}", cluster_name, label));
    }

    let metrics = lookup(groups, label, raw_entity_id)?;
    let namespace = string_field(metrics, "namespace", label)?;

    if label == CONTAINER_GROUP {
        let pod_name = string_field(metrics, "podName", label)?;
        if namespace.is_empty() || pod_name.is_empty() {
            return Err(EntityError::EmptyEntityType { label: label.to_string() });
        }
        return Ok(format!("k8s:{}:{}:{}:{}", cluster_name, namespace, pod_name, label));
    }

    if namespace.is_empty() {
        return Err(EntityError::EmptyEntityType { label: label.to_string() });
    }
    Ok(format!("k8s:{}:{}:{}", cluster_name, namespace, label))
}

/// Namespace of a record, or an empty string when it has none.
pub fn namespace_of(metrics: &RawMetrics) -> &str {
    metrics.get("namespace").and_then(|v| v.as_str()).unwrap_or_default()
}
