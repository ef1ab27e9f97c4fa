// Record extractors for kubelet summary entities
pub mod base;
pub mod nodes;
pub mod pods;
pub mod volumes;

// Re-export commonly used items
pub use base::{fetch_stats_summary, STATS_SUMMARY_PATH};
pub use nodes::fetch_node_stats;
pub use pods::{fetch_container_stats, fetch_pod_stats, pod_child_entity_id, pod_entity_id};
pub use volumes::fetch_volume_stats;
