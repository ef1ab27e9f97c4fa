use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::azure::{azure_volume_identifier, enrich_azure_volume_metrics, DedupTracker};
use crate::error::GroupingError;
use crate::filter::{should_filter_volume, should_filter_volume_by_type};
use crate::metrics::{
    fetch_container_stats, fetch_node_stats, fetch_pod_stats, fetch_volume_stats, pod_child_entity_id,
};
use crate::stats::{PodStats, Summary};
use crate::types::{
    FilterConfig, Grouping, PodSpecIndex, RawMetrics, RawValue, CONTAINER_GROUP, NODE_GROUP, POD_GROUP, VOLUME_GROUP,
};

/// Process-wide latch for the first-cycle configuration log.
///
/// Shared by every cycle in the process, including concurrent ones.
static CONFIG_LOGGED: AtomicBool = AtomicBool::new(false);

/// Log the filtering configuration if `latch` has not fired yet. Returns whether it logged.
fn log_config_once(latch: &AtomicBool, pod_specs: Option<&PodSpecIndex>, cfg: Option<&FilterConfig>) -> bool {
    if latch
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return false;
    }

    info!(
        filter_service_account = cfg.map_or(false, |c| c.filter_service_account_volumes),
        filter_secret = cfg.map_or(false, |c| c.filter_secret_volumes),
        filter_configmap = cfg.map_or(false, |c| c.filter_configmap_volumes),
        deduplicate_azure = cfg.map_or(false, |c| c.deduplicate_azure_volumes),
        "volume filtering configuration"
    );
    match pod_specs {
        Some(specs) => info!("loaded {} pod specs on first scrape", specs.len()),
        None => warn!("pod specs not available, type-based volume filtering is disabled"),
    }
    true
}

/// Group a stats summary without type-based filtering or deduplication.
pub fn group_stats_summary(summary: Option<&Summary>) -> Result<Grouping, GroupingError> {
    group_stats_summary_with_config(summary, None, None)
}

/// Group a stats summary into node, pod, container and volume records.
///
/// Volumes are filtered by name first, then by declared type when both
/// `pod_specs` and `cfg` are given, then deduplicated by Azure identity when
/// `cfg.deduplicate_azure_volumes` is set and `pod_specs` is given.
///
/// A missing summary is the only fatal error. Per-entity failures are
/// collected in [`Grouping::errors`] and the rest of the summary is still processed.
pub fn group_stats_summary_with_config(
    summary: Option<&Summary>,
    pod_specs: Option<&PodSpecIndex>,
    cfg: Option<&FilterConfig>,
) -> Result<Grouping, GroupingError> {
    let summary = summary.ok_or(GroupingError::MissingSummary)?;

    log_config_once(&CONFIG_LOGGED, pod_specs, cfg);

    let mut grouper = CycleGrouper {
        pod_specs,
        cfg,
        seen_azure_volumes: DedupTracker::new(),
        out: Grouping::new(),
    };

    match fetch_node_stats(&summary.node) {
        Ok((raw_node_metrics, raw_entity_id)) => grouper.out.insert(NODE_GROUP, raw_entity_id, raw_node_metrics),
        Err(e) => grouper.out.errors.push(e),
    }

    let Some(pods) = summary.pods.as_ref() else {
        grouper.out.errors.push(GroupingError::PodsNotFound);
        return Ok(grouper.out);
    };

    for pod in pods {
        grouper.group_pod(pod);
    }

    grouper.log_dedup_summary();

    Ok(grouper.out)
}

/// State of a single grouping cycle.
struct CycleGrouper<'a> {
    pod_specs: Option<&'a PodSpecIndex>,
    cfg: Option<&'a FilterConfig>,
    seen_azure_volumes: DedupTracker,
    out: Grouping,
}

impl<'a> CycleGrouper<'a> {
    fn deduplicate_azure(&self) -> bool {
        self.pod_specs.is_some() && self.cfg.map_or(false, |c| c.deduplicate_azure_volumes)
    }

    fn group_pod(&mut self, pod: &PodStats) {
        let (raw_pod_metrics, raw_entity_id) = match fetch_pod_stats(pod) {
            Ok(v) => v,
            Err(e) => {
                self.out.errors.push(e);
                return;
            }
        };

        let pod_name = pod.pod_ref.name.as_str();
        let namespace = pod.pod_ref.namespace.as_str();

        for volume in &pod.volume_stats {
            debug!(volume = %volume.name, pod = %raw_entity_id, "processing volume");

            if should_filter_volume(&volume.name) {
                continue;
            }

            let pod_spec = self.pod_specs.and_then(|specs| specs.get(&raw_entity_id));

            if let (Some(_), Some(cfg)) = (self.pod_specs, self.cfg) {
                if should_filter_volume_by_type(&volume.name, pod_spec, Some(cfg)) {
                    continue;
                }
            }

            let mut azure_volume_id = None;
            if self.deduplicate_azure() {
                if let Some(id) = azure_volume_identifier(&volume.name, pod_spec) {
                    if !self.seen_azure_volumes.observe(&id, &raw_entity_id) {
                        debug!(
                            azure_volume = %id,
                            first_pod = self.seen_azure_volumes.first_reporter(&id).unwrap_or_default(),
                            pod = %raw_entity_id,
                            "skipping duplicate azure volume"
                        );
                        continue;
                    }
                    debug!(azure_volume = %id, pod = %raw_entity_id, "reporting azure volume for the first time");
                    azure_volume_id = Some(id);
                }
            }

            let mut raw_volume_metrics = match fetch_volume_stats(volume, &raw_entity_id) {
                Ok(r) => r,
                Err(e) => {
                    self.out.errors.push(e);
                    continue;
                }
            };

            if azure_volume_id.is_some() {
                enrich_azure_volume_metrics(&mut raw_volume_metrics, &volume.name, pod_spec);
            }

            attach_pod_identity(&mut raw_volume_metrics, pod_name, namespace);
            let volume_entity_id = pod_child_entity_id(namespace, pod_name, &volume.name);
            self.out.insert(VOLUME_GROUP, volume_entity_id, raw_volume_metrics);
        }

        for container in &pod.containers {
            let mut raw_container_metrics = match fetch_container_stats(container, &raw_entity_id) {
                Ok(r) => r,
                Err(e) => {
                    self.out.errors.push(e);
                    continue;
                }
            };
            attach_pod_identity(&mut raw_container_metrics, pod_name, namespace);
            let container_entity_id = pod_child_entity_id(namespace, pod_name, &container.name);
            self.out.insert(CONTAINER_GROUP, container_entity_id, raw_container_metrics);
        }

        self.out.insert(POD_GROUP, raw_entity_id, raw_pod_metrics);
    }

    fn log_dedup_summary(&self) {
        if !self.deduplicate_azure() || self.seen_azure_volumes.is_empty() {
            return;
        }
        debug!("reported {} unique azure volumes", self.seen_azure_volumes.len());
        for (azure_id, pod_id) in self.seen_azure_volumes.iter() {
            debug!("{} -> {}", azure_id, pod_id);
        }
    }
}

fn attach_pod_identity(r: &mut RawMetrics, pod_name: &str, namespace: &str) {
    r.insert("podName".to_string(), RawValue::from(pod_name));
    r.insert("namespace".to_string(), RawValue::from(namespace));
}
