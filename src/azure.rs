//! Identity and metadata of Azure-backed volumes.
//!
//! The same Azure File share or Azure Disk is often mounted by many pods on a
//! node; each of them reports identical filesystem counters. The identity
//! derived here lets the grouping stage keep a single record per resource.

use k8s_openapi::api::core::v1::Pod;
use std::collections::HashMap;

use crate::kubernetes::find_pod_volume;
use crate::types::{RawMetrics, RawValue};

/// Cross-pod identity of the Azure resource behind `volume_name`.
///
/// - Azure File: `azurefile:{pod namespace}:{secretName}:{shareName}`
/// - Azure Disk: `azuredisk:name:{diskName}`, or `azuredisk:uri:{diskURI}` when the name is empty
///
/// Returns `None` for any other volume kind, or when the pod or volume is unknown.
pub fn azure_volume_identifier(volume_name: &str, pod: Option<&Pod>) -> Option<String> {
    let pod = pod?;
    let vol = find_pod_volume(pod, volume_name)?;

    if let Some(file) = vol.azure_file.as_ref() {
        // Share names are only unique per secret and namespace
        return Some(format!(
            "azurefile:{}:{}:{}",
            pod.metadata.namespace.as_deref().unwrap_or_default(),
            file.secret_name,
            file.share_name
        ));
    }

    if let Some(disk) = vol.azure_disk.as_ref() {
        if !disk.disk_name.is_empty() {
            return Some(format!("azuredisk:name:{}", disk.disk_name));
        }
        if !disk.disk_uri.is_empty() {
            return Some(format!("azuredisk:uri:{}", disk.disk_uri));
        }
    }

    None
}

/// Attach Azure metadata to a volume record. Adding the same metadata twice is a no-op.
pub fn enrich_azure_volume_metrics(r: &mut RawMetrics, volume_name: &str, pod: Option<&Pod>) {
    let Some(vol) = pod.and_then(|p| find_pod_volume(p, volume_name)) else {
        return;
    };

    if let Some(file) = vol.azure_file.as_ref() {
        r.insert("azureVolumeType".to_string(), RawValue::from("azureFile"));
        r.insert("azureShareName".to_string(), RawValue::from(file.share_name.as_str()));
        r.insert("azureSecretName".to_string(), RawValue::from(file.secret_name.as_str()));
        r.insert("azureReadOnly".to_string(), RawValue::Bool(file.read_only.unwrap_or(false)));
    }

    if let Some(disk) = vol.azure_disk.as_ref() {
        r.insert("azureVolumeType".to_string(), RawValue::from("azureDisk"));
        if !disk.disk_name.is_empty() {
            r.insert("azureDiskName".to_string(), RawValue::from(disk.disk_name.as_str()));
        }
        if !disk.disk_uri.is_empty() {
            r.insert("azureDiskURI".to_string(), RawValue::from(disk.disk_uri.as_str()));
        }
        if let Some(fs_type) = disk.fs_type.as_ref() {
            r.insert("azureFSType".to_string(), RawValue::from(fs_type.as_str()));
        }
        if let Some(read_only) = disk.read_only {
            r.insert("azureReadOnly".to_string(), RawValue::Bool(read_only));
        }
    }
}

/// Azure volumes already reported during one grouping cycle.
///
/// Lives for exactly one cycle; never share it between cycles.
#[derive(Debug, Default)]
pub struct DedupTracker {
    // azure volume id -> raw entity id of the first reporting pod
    seen: HashMap<String, String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `volume_id` as reported by `pod_entity_id`.
    ///
    /// Returns false, leaving the first reporter in place, when the volume was already seen.
    pub fn observe(&mut self, volume_id: &str, pod_entity_id: &str) -> bool {
        if self.seen.contains_key(volume_id) {
            return false;
        }
        self.seen.insert(volume_id.to_string(), pod_entity_id.to_string());
        true
    }

    pub fn first_reporter(&self, volume_id: &str) -> Option<&str> {
        self.seen.get(volume_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.seen.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{AzureDiskVolumeSource, AzureFileVolumeSource, EmptyDirVolumeSource, PodSpec, Volume};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    const DISK_URI: &str = "/subscriptions/sub-id/resourceGroups/rg/providers/Microsoft.Compute/disks/my-disk-vol";

    fn create_test_pod(namespace: &str, volumes: Vec<Volume>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("test-pod".to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                volumes: Some(volumes),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn azure_file_volume(name: &str, secret: &str, share: &str) -> Volume {
        Volume {
            name: name.to_string(),
            azure_file: Some(AzureFileVolumeSource {
                secret_name: secret.to_string(),
                share_name: share.to_string(),
                read_only: Some(true),
            }),
            ..Default::default()
        }
    }

    fn azure_disk_volume(name: &str, disk_name: &str, disk_uri: &str) -> Volume {
        Volume {
            name: name.to_string(),
            azure_disk: Some(AzureDiskVolumeSource {
                disk_name: disk_name.to_string(),
                disk_uri: disk_uri.to_string(),
                fs_type: Some("ext4".to_string()),
                read_only: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_azure_file_identifier() {
        let pod = create_test_pod("default", vec![azure_file_volume("my-azure-file", "azure-secret", "logs-share")]);
        assert_eq!(
            azure_volume_identifier("my-azure-file", Some(&pod)).as_deref(),
            Some("azurefile:default:azure-secret:logs-share")
        );

        let pod = create_test_pod("production", vec![azure_file_volume("my-azure-file", "azure-secret", "logs-share")]);
        assert_eq!(
            azure_volume_identifier("my-azure-file", Some(&pod)).as_deref(),
            Some("azurefile:production:azure-secret:logs-share")
        );
    }

    #[test]
    fn test_azure_disk_identifier() {
        let pod = create_test_pod("default", vec![azure_disk_volume("disk", "my-disk-vol", DISK_URI)]);
        assert_eq!(
            azure_volume_identifier("disk", Some(&pod)).as_deref(),
            Some("azuredisk:name:my-disk-vol")
        );

        let pod = create_test_pod("default", vec![azure_disk_volume("disk", "", DISK_URI)]);
        assert_eq!(
            azure_volume_identifier("disk", Some(&pod)),
            Some(format!("azuredisk:uri:{}", DISK_URI))
        );

        let pod = create_test_pod("default", vec![azure_disk_volume("disk", "", "")]);
        assert_eq!(azure_volume_identifier("disk", Some(&pod)), None);
    }

    #[test]
    fn test_non_azure_identifier() {
        let pod = create_test_pod(
            "default",
            vec![Volume {
                name: "emptydir-vol".to_string(),
                empty_dir: Some(EmptyDirVolumeSource::default()),
                ..Default::default()
            }],
        );
        assert_eq!(azure_volume_identifier("emptydir-vol", Some(&pod)), None);
        assert_eq!(azure_volume_identifier("non-existent-volume", Some(&pod)), None);
        assert_eq!(azure_volume_identifier("any-volume", None), None);
    }

    #[test]
    fn test_enrich_azure_file() {
        let pod = create_test_pod("default", vec![azure_file_volume("share", "azure-secret", "logs-share")]);
        let mut r = RawMetrics::new();
        r.insert("volumeName".to_string(), RawValue::from("share"));

        enrich_azure_volume_metrics(&mut r, "share", Some(&pod));
        assert_eq!(r["azureVolumeType"], RawValue::from("azureFile"));
        assert_eq!(r["azureShareName"], RawValue::from("logs-share"));
        assert_eq!(r["azureSecretName"], RawValue::from("azure-secret"));
        assert_eq!(r["azureReadOnly"], RawValue::Bool(true));
        assert!(!r.contains_key("azureDiskName"));

        let once = r.clone();
        enrich_azure_volume_metrics(&mut r, "share", Some(&pod));
        assert_eq!(r, once);
    }

    #[test]
    fn test_enrich_azure_disk() {
        let pod = create_test_pod("default", vec![azure_disk_volume("disk", "my-disk-vol", DISK_URI)]);
        let mut r = RawMetrics::new();

        enrich_azure_volume_metrics(&mut r, "disk", Some(&pod));
        assert_eq!(r["azureVolumeType"], RawValue::from("azureDisk"));
        assert_eq!(r["azureDiskName"], RawValue::from("my-disk-vol"));
        assert_eq!(r["azureDiskURI"], RawValue::from(DISK_URI));
        assert_eq!(r["azureFSType"], RawValue::from("ext4"));
        assert_eq!(r["azureReadOnly"], RawValue::Bool(false));
        assert!(!r.contains_key("azureShareName"));
    }

    #[test]
    fn test_enrich_non_azure_leaves_record_untouched() {
        let pod = create_test_pod(
            "default",
            vec![Volume {
                name: "scratch".to_string(),
                empty_dir: Some(EmptyDirVolumeSource::default()),
                ..Default::default()
            }],
        );
        let mut r = RawMetrics::new();
        r.insert("volumeName".to_string(), RawValue::from("scratch"));

        enrich_azure_volume_metrics(&mut r, "scratch", Some(&pod));
        enrich_azure_volume_metrics(&mut r, "scratch", None);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_dedup_tracker_first_seen_wins() {
        let mut tracker = DedupTracker::new();
        assert!(tracker.is_empty());

        assert!(tracker.observe("azurefile:default:s:share", "default_pod-1"));
        assert!(!tracker.observe("azurefile:default:s:share", "default_pod-2"));
        assert!(tracker.observe("azuredisk:name:disk", "default_pod-2"));

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.first_reporter("azurefile:default:s:share"), Some("default_pod-1"));
        assert_eq!(tracker.first_reporter("azuredisk:name:disk"), Some("default_pod-2"));
        assert_eq!(tracker.first_reporter("unknown"), None);
        assert_eq!(tracker.iter().count(), 2);
    }
}
