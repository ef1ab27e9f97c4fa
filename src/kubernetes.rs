use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Pod, Volume};
use kube::{api::ListParams, Api, Client};
use tracing::debug;

use crate::metrics::pod_entity_id;
use crate::types::PodSpecIndex;

/// List every pod scheduled on `node_name`.
pub async fn list_node_pods(client: &Client, node_name: &str) -> Result<Vec<Pod>> {
    let pod_api: Api<Pod> = Api::all(client.clone());
    let lp = ListParams::default().fields(&format!("spec.nodeName={}", node_name));
    let pods = pod_api
        .list(&lp)
        .await
        .with_context(|| format!("listing pods on node {}", node_name))?;
    Ok(pods.items)
}

/// Index pods by the same `"{namespace}_{podName}"` key the grouping stage uses.
pub fn build_pod_spec_index(pods: Vec<Pod>) -> PodSpecIndex {
    let mut index = PodSpecIndex::with_capacity(pods.len());
    for pod in pods {
        let key = match (pod.metadata.namespace.as_deref(), pod.metadata.name.as_deref()) {
            (Some(ns), Some(name)) if !ns.is_empty() && !name.is_empty() => pod_entity_id(ns, name),
            _ => {
                debug!("skipping pod without name or namespace in pod spec index");
                continue;
            }
        };
        index.insert(key, pod);
    }
    index
}

/// Find the declared volume called `volume_name` in the pod spec.
pub fn find_pod_volume<'a>(pod: &'a Pod, volume_name: &str) -> Option<&'a Volume> {
    pod.spec
        .as_ref()
        .and_then(|s| s.volumes.as_ref())
        .and_then(|volumes| volumes.iter().find(|v| v.name == volume_name))
}

/// `"{namespace}/{name}"` of a pod, for log lines.
pub fn pod_display_name(pod: &Pod) -> String {
    format!(
        "{}/{}",
        pod.metadata.namespace.as_deref().unwrap_or_default(),
        pod.metadata.name.as_deref().unwrap_or_default()
    )
}
