use crate::error::GroupingError;
use crate::metrics::base::{add_fs_metrics, add_network_metrics, add_u64_raw_metric};
use crate::stats::NodeStats;
use crate::types::{RawMetrics, RawValue};

/// Extract the node record. The raw entity id is the node name.
pub fn fetch_node_stats(n: &NodeStats) -> Result<(RawMetrics, String), GroupingError> {
    let node_name = n.node_name.as_str();
    if node_name.is_empty() {
        return Err(GroupingError::EmptyNodeIdentifier);
    }

    let mut r = RawMetrics::new();
    r.insert("nodeName".to_string(), RawValue::from(node_name));

    if let Some(cpu) = n.cpu.as_ref() {
        add_u64_raw_metric(&mut r, "usageNanoCores", cpu.usage_nano_cores);
        add_u64_raw_metric(&mut r, "usageCoreNanoSeconds", cpu.usage_core_nano_seconds);
    }

    if let Some(memory) = n.memory.as_ref() {
        add_u64_raw_metric(&mut r, "memoryUsageBytes", memory.usage_bytes);
        add_u64_raw_metric(&mut r, "memoryAvailableBytes", memory.available_bytes);
        add_u64_raw_metric(&mut r, "memoryWorkingSetBytes", memory.working_set_bytes);
        add_u64_raw_metric(&mut r, "memoryRssBytes", memory.rss_bytes);
        add_u64_raw_metric(&mut r, "memoryPageFaults", memory.page_faults);
        add_u64_raw_metric(&mut r, "memoryMajorPageFaults", memory.major_page_faults);
    }

    if let Some(network) = n.network.as_ref() {
        add_network_metrics(&mut r, network);
    }

    if let Some(fs) = n.fs.as_ref() {
        add_fs_metrics(&mut r, "fs", fs);
    }

    if let Some(image_fs) = n.runtime.as_ref().and_then(|rt| rt.image_fs.as_ref()) {
        add_fs_metrics(&mut r, "runtime", image_fs);
    }

    Ok((r, node_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{CpuStats, FsStats, MemoryStats, RuntimeStats};

    #[test]
    fn test_fetch_node_stats() {
        let node = NodeStats {
            node_name: "node-1".to_string(),
            cpu: Some(CpuStats {
                usage_nano_cores: Some(250_000_000),
                ..Default::default()
            }),
            memory: Some(MemoryStats {
                usage_bytes: Some(4096),
                rss_bytes: Some(1024),
                ..Default::default()
            }),
            fs: Some(FsStats {
                capacity_bytes: Some(1 << 30),
                ..Default::default()
            }),
            runtime: Some(RuntimeStats {
                image_fs: Some(FsStats {
                    used_bytes: Some(77),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };

        let (r, id) = fetch_node_stats(&node).unwrap();
        assert_eq!(id, "node-1");
        assert_eq!(r["nodeName"], RawValue::from("node-1"));
        assert_eq!(r["usageNanoCores"], RawValue::U64(250_000_000));
        assert_eq!(r["memoryUsageBytes"], RawValue::U64(4096));
        assert_eq!(r["memoryRssBytes"], RawValue::U64(1024));
        assert_eq!(r["fsCapacityBytes"], RawValue::U64(1 << 30));
        assert_eq!(r["runtimeUsedBytes"], RawValue::U64(77));

        // Unmeasured counters are left out instead of being reported as zero
        assert!(!r.contains_key("usageCoreNanoSeconds"));
        assert!(!r.contains_key("memoryPageFaults"));
        assert!(!r.contains_key("interfaces"));
    }

    #[test]
    fn test_fetch_node_stats_empty_name() {
        let err = fetch_node_stats(&NodeStats::default()).unwrap_err();
        assert_eq!(err, GroupingError::EmptyNodeIdentifier);
        assert!(err.to_string().contains("/stats/summary"));
    }
}
