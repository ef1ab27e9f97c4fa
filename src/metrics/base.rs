use anyhow::{anyhow, Context, Result};
use kube::Client;
use std::collections::BTreeMap;

use crate::stats::{FsStats, NetworkStats, Summary};
use crate::types::{RawMetrics, RawValue};

/// Path where the kubelet serves its stats summary.
pub const STATS_SUMMARY_PATH: &str = "/stats/summary";

/// Fetch the stats summary of `node_name` through the API server node proxy.
pub async fn fetch_stats_summary(client: &Client, node_name: &str) -> Result<Summary> {
    use http::Request as HttpRequest;
    let path = format!("/api/v1/nodes/{}/proxy{}", node_name, STATS_SUMMARY_PATH);
    let req = HttpRequest::builder()
        .method("GET")
        .uri(path)
        .body(Vec::new())
        .map_err(|e| anyhow!("build request: {}", e))?;
    let summary: Summary = client
        .request(req)
        .await
        .with_context(|| format!("performing GET request to kubelet endpoint {:?}", STATS_SUMMARY_PATH))?;
    Ok(summary)
}

/// Adds `name` to the record only when the source counter was measured.
pub fn add_u64_raw_metric(r: &mut RawMetrics, name: &str, value: Option<u64>) {
    if let Some(v) = value {
        r.insert(name.to_string(), RawValue::U64(v));
    }
}

/// Copy filesystem counters into `r`, each name prefixed with `prefix`
/// (`fs` gives `fsAvailableBytes`, `runtime` gives `runtimeAvailableBytes`).
pub fn add_fs_metrics(r: &mut RawMetrics, prefix: &str, fs: &FsStats) {
    add_u64_raw_metric(r, &format!("{}AvailableBytes", prefix), fs.available_bytes);
    add_u64_raw_metric(r, &format!("{}CapacityBytes", prefix), fs.capacity_bytes);
    add_u64_raw_metric(r, &format!("{}UsedBytes", prefix), fs.used_bytes);
    add_u64_raw_metric(r, &format!("{}InodesFree", prefix), fs.inodes_free);
    add_u64_raw_metric(r, &format!("{}Inodes", prefix), fs.inodes);
    add_u64_raw_metric(r, &format!("{}InodesUsed", prefix), fs.inodes_used);
}

/// Copy default-interface counters and the per-interface breakdown into `r`.
pub fn add_network_metrics(r: &mut RawMetrics, network: &NetworkStats) {
    add_u64_raw_metric(r, "rxBytes", network.interface.rx_bytes);
    add_u64_raw_metric(r, "txBytes", network.interface.tx_bytes);
    if let (Some(rx), Some(tx)) = (network.interface.rx_errors, network.interface.tx_errors) {
        r.insert("errors".to_string(), RawValue::U64(rx.wrapping_add(tx)));
    }

    let mut interfaces = BTreeMap::new();
    for i in &network.interfaces {
        let mut interface_metrics = RawMetrics::new();
        add_u64_raw_metric(&mut interface_metrics, "rxBytes", i.rx_bytes);
        add_u64_raw_metric(&mut interface_metrics, "txBytes", i.tx_bytes);
        if let (Some(rx), Some(tx)) = (i.rx_errors, i.tx_errors) {
            interface_metrics.insert("errors".to_string(), RawValue::U64(rx.wrapping_add(tx)));
        }
        interfaces.insert(i.name.clone(), interface_metrics);
    }
    r.insert("interfaces".to_string(), RawValue::Interfaces(interfaces));
}
