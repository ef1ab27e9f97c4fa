//! Volume exclusion policy.
//!
//! Two independent checks decide whether a volume record is dropped: a
//! name check that always runs, and a type check driven by the pod spec and
//! [`FilterConfig`]. Turning off
//! `filter_service_account_volumes` disables only the projected-source check,
//! never the `kube-api-access-` prefix check.

use k8s_openapi::api::core::v1::Pod;
use tracing::{debug, warn};

use crate::kubernetes::{find_pod_volume, pod_display_name};
use crate::types::FilterConfig;

/// Name prefix of the projected service account token volume injected into every pod.
pub const SERVICE_ACCOUNT_VOLUME_PREFIX: &str = "kube-api-access-";

/// Unconditional name-based check for service account token volumes.
pub fn should_filter_volume(volume_name: &str) -> bool {
    volume_name.starts_with(SERVICE_ACCOUNT_VOLUME_PREFIX)
}

/// Type-based check against the volume declared in the pod spec.
///
/// Returns false when the pod spec or the configuration is missing, or when
/// the volume is not declared in the pod spec.
pub fn should_filter_volume_by_type(volume_name: &str, pod: Option<&Pod>, cfg: Option<&FilterConfig>) -> bool {
    let Some(pod) = pod else {
        debug!(volume = volume_name, "pod spec missing, type-based filtering skipped");
        return false;
    };
    let Some(cfg) = cfg else {
        debug!(volume = volume_name, "filter config missing, type-based filtering skipped");
        return false;
    };

    let Some(vol) = find_pod_volume(pod, volume_name) else {
        warn!(volume = volume_name, pod = %pod_display_name(pod), "volume not found in pod spec");
        return false;
    };

    if cfg.filter_secret_volumes && vol.secret.is_some() {
        debug!(volume = volume_name, pod = %pod_display_name(pod), "filtering secret volume");
        return true;
    }

    if cfg.filter_configmap_volumes && vol.config_map.is_some() {
        debug!(volume = volume_name, pod = %pod_display_name(pod), "filtering configmap volume");
        return true;
    }

    if let Some(sources) = vol.projected.as_ref().and_then(|p| p.sources.as_ref()) {
        for source in sources {
            if cfg.filter_service_account_volumes && source.service_account_token.is_some() {
                debug!(volume = volume_name, pod = %pod_display_name(pod), "filtering projected service account volume");
                return true;
            }
            if cfg.filter_configmap_volumes && source.config_map.is_some() {
                debug!(volume = volume_name, pod = %pod_display_name(pod), "filtering projected configmap volume");
                return true;
            }
        }
    }

    debug!(volume = volume_name, "volume type not matched by any enabled filter");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        ConfigMapProjection, ConfigMapVolumeSource, EmptyDirVolumeSource, PodSpec, ProjectedVolumeSource,
        SecretVolumeSource, ServiceAccountTokenProjection, Volume, VolumeProjection,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn create_test_pod(volumes: Vec<Volume>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("test-pod".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                volumes: Some(volumes),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn secret_volume(name: &str) -> Volume {
        Volume {
            name: name.to_string(),
            secret: Some(SecretVolumeSource {
                secret_name: Some("my-secret".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn configmap_volume(name: &str) -> Volume {
        Volume {
            name: name.to_string(),
            config_map: Some(ConfigMapVolumeSource {
                name: Some("my-config".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn projected_volume(name: &str, sources: Vec<VolumeProjection>) -> Volume {
        Volume {
            name: name.to_string(),
            projected: Some(ProjectedVolumeSource {
                sources: Some(sources),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn token_source() -> VolumeProjection {
        VolumeProjection {
            service_account_token: Some(ServiceAccountTokenProjection {
                path: "token".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn configmap_source() -> VolumeProjection {
        VolumeProjection {
            config_map: Some(ConfigMapProjection {
                name: Some("kube-root-ca.crt".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn all_filters() -> FilterConfig {
        FilterConfig {
            filter_service_account_volumes: true,
            filter_secret_volumes: true,
            filter_configmap_volumes: true,
            deduplicate_azure_volumes: false,
        }
    }

    fn no_filters() -> FilterConfig {
        FilterConfig {
            filter_service_account_volumes: false,
            filter_secret_volumes: false,
            filter_configmap_volumes: false,
            deduplicate_azure_volumes: false,
        }
    }

    #[test]
    fn test_should_filter_volume() {
        assert!(should_filter_volume("kube-api-access-abc123"));
        assert!(should_filter_volume("kube-api-access-"));
        assert!(!should_filter_volume("kube-api-access"));
        assert!(!should_filter_volume("my-kube-api-access-abc"));
        assert!(!should_filter_volume("regular-volume"));
        assert!(!should_filter_volume(""));
    }

    #[test]
    fn test_secret_volume() {
        let pod = create_test_pod(vec![secret_volume("my-secret")]);

        assert!(should_filter_volume_by_type("my-secret", Some(&pod), Some(&all_filters())));
        assert!(!should_filter_volume_by_type("my-secret", Some(&pod), Some(&no_filters())));
        assert!(!should_filter_volume_by_type("my-secret", None, Some(&all_filters())));
        assert!(!should_filter_volume_by_type("my-secret", Some(&pod), None));
    }

    #[test]
    fn test_configmap_volume() {
        let pod = create_test_pod(vec![configmap_volume("config")]);
        let cfg = FilterConfig {
            filter_configmap_volumes: true,
            ..no_filters()
        };

        assert!(should_filter_volume_by_type("config", Some(&pod), Some(&cfg)));
        // Secret filtering does not touch configmaps
        let cfg = FilterConfig {
            filter_secret_volumes: true,
            ..no_filters()
        };
        assert!(!should_filter_volume_by_type("config", Some(&pod), Some(&cfg)));
    }

    #[test]
    fn test_projected_service_account_volume() {
        let pod = create_test_pod(vec![projected_volume("kube-api-access-xyz", vec![token_source(), configmap_source()])]);

        let cfg = FilterConfig {
            filter_service_account_volumes: true,
            ..no_filters()
        };
        assert!(should_filter_volume_by_type("kube-api-access-xyz", Some(&pod), Some(&cfg)));

        // The projected check is gated by config even though the name check is not
        assert!(!should_filter_volume_by_type("kube-api-access-xyz", Some(&pod), Some(&no_filters())));
        assert!(should_filter_volume("kube-api-access-xyz"));
    }

    #[test]
    fn test_projected_configmap_volume() {
        let pod = create_test_pod(vec![projected_volume("bundle", vec![configmap_source()])]);

        let cfg = FilterConfig {
            filter_configmap_volumes: true,
            ..no_filters()
        };
        assert!(should_filter_volume_by_type("bundle", Some(&pod), Some(&cfg)));

        let cfg = FilterConfig {
            filter_service_account_volumes: true,
            ..no_filters()
        };
        assert!(!should_filter_volume_by_type("bundle", Some(&pod), Some(&cfg)));
    }

    #[test]
    fn test_projected_volume_without_sources() {
        let pod = create_test_pod(vec![Volume {
            name: "empty-projection".to_string(),
            projected: Some(ProjectedVolumeSource::default()),
            ..Default::default()
        }]);
        assert!(!should_filter_volume_by_type("empty-projection", Some(&pod), Some(&all_filters())));
    }

    #[test]
    fn test_unfiltered_volume_types() {
        let pod = create_test_pod(vec![Volume {
            name: "scratch".to_string(),
            empty_dir: Some(EmptyDirVolumeSource::default()),
            ..Default::default()
        }]);
        assert!(!should_filter_volume_by_type("scratch", Some(&pod), Some(&all_filters())));
    }

    #[test]
    fn test_volume_not_in_pod_spec() {
        let pod = create_test_pod(vec![secret_volume("my-secret")]);
        assert!(!should_filter_volume_by_type("other", Some(&pod), Some(&all_filters())));

        let pod_without_spec = Pod::default();
        assert!(!should_filter_volume_by_type("my-secret", Some(&pod_without_spec), Some(&all_filters())));
    }
}
