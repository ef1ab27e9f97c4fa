use crate::error::GroupingError;
use crate::metrics::base::add_fs_metrics;
use crate::stats::VolumeStats;
use crate::types::{RawMetrics, RawValue};

/// Extract a volume record. `pod_id` only labels the error.
pub fn fetch_volume_stats(v: &VolumeStats, pod_id: &str) -> Result<RawMetrics, GroupingError> {
    if v.name.is_empty() {
        return Err(GroupingError::EmptyVolumeIdentifier {
            pod: pod_id.to_string(),
        });
    }

    let mut r = RawMetrics::new();
    r.insert("volumeName".to_string(), RawValue::from(v.name.as_str()));
    if let Some(pvc) = v.pvc_ref.as_ref() {
        r.insert("pvcName".to_string(), RawValue::from(pvc.name.as_str()));
        r.insert("pvcNamespace".to_string(), RawValue::from(pvc.namespace.as_str()));
    }

    add_fs_metrics(&mut r, "fs", &v.fs_stats);

    Ok(r)
}
