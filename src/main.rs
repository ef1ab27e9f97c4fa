use anyhow::Result;
use kube::Client;
use std::time::Duration;
use tracing::{error, info, warn};

mod types;
mod error;
mod config;
mod stats;
mod kubernetes;
mod metrics;
mod filter;
mod azure;
mod collector;
mod entity;
mod report;

use config::load_config;
use collector::group_stats_summary_with_config;
use kubernetes::{build_pod_spec_index, list_node_pods};
use metrics::fetch_stats_summary;
use report::CycleReport;
use types::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    info!("node = {}, cluster = {}", cfg.node_name, cfg.cluster_name);

    let client = Client::try_default().await?;

    let Some(interval_seconds) = cfg.interval_seconds else {
        return run_cycle(&client, &cfg).await;
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
    loop {
        ticker.tick().await;
        // A failed fetch only skips this cycle
        if let Err(e) = run_cycle(&client, &cfg).await {
            error!("collection cycle failed: {:#}", e);
        }
    }
}

async fn run_cycle(client: &Client, cfg: &Config) -> Result<()> {
    let summary = fetch_stats_summary(client, &cfg.node_name).await?;

    // Without pod specs only name-based filtering applies
    let pod_specs = match list_node_pods(client, &cfg.node_name).await {
        Ok(pods) => Some(build_pod_spec_index(pods)),
        Err(e) => {
            warn!("pod specs unavailable: {:#}", e);
            None
        }
    };

    let grouping = group_stats_summary_with_config(Some(&summary), pod_specs.as_ref(), Some(&cfg.filter))?;
    let report = CycleReport::new(cfg.cluster_name.clone(), grouping);

    let summary = report.summary();
    info!(
        "grouped {} entities ({} volumes), {} errors",
        summary.total_entities(),
        summary.volume_count,
        summary.error_count
    );
    if report.has_errors() {
        for e in &report.grouping.errors {
            warn!("{}", e);
        }
    }

    println!("{}", report.to_payload());
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
