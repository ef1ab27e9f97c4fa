// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod stats;
pub mod kubernetes;
pub mod metrics;
pub mod filter;
pub mod azure;
pub mod collector;
pub mod entity;
pub mod report;

// Re-export commonly used items
pub use types::*;
pub use error::{EntityError, GroupingError};
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use stats::Summary;
pub use kubernetes::{build_pod_spec_index, list_node_pods};
pub use metrics::{fetch_stats_summary, STATS_SUMMARY_PATH};
pub use filter::{should_filter_volume, should_filter_volume_by_type, SERVICE_ACCOUNT_VOLUME_PREFIX};
pub use azure::{azure_volume_identifier, enrich_azure_volume_metrics, DedupTracker};
pub use collector::{group_stats_summary, group_stats_summary_with_config};
pub use report::{CycleReport, ReportSummary};
