use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::GroupingError;

pub const NODE_GROUP: &str = "node";
pub const POD_GROUP: &str = "pod";
pub const CONTAINER_GROUP: &str = "container";
pub const VOLUME_GROUP: &str = "volume";

#[derive(Debug, Clone)]
pub struct Config {
    pub node_name: String,
    pub cluster_name: String,
    pub filter: FilterConfig,
    pub interval_seconds: Option<u64>,
}

/// Switches controlling which volume records are suppressed.
///
/// `kube-api-access-*` volumes are always dropped by name, independent of
/// `filter_service_account_volumes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub filter_service_account_volumes: bool,
    pub filter_secret_volumes: bool,
    pub filter_configmap_volumes: bool,
    pub deduplicate_azure_volumes: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_service_account_volumes: true,
            filter_secret_volumes: false,
            filter_configmap_volumes: false,
            deduplicate_azure_volumes: false,
        }
    }
}

/// A single field of a raw metric record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    U64(u64),
    Str(String),
    Bool(bool),
    Interfaces(BTreeMap<String, RawMetrics>),
}

impl RawValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RawValue::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<u64> for RawValue {
    fn from(v: u64) -> Self {
        RawValue::U64(v)
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Str(s)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Str(s.to_string())
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

pub type RawMetrics = BTreeMap<String, RawValue>;

/// entity-type label -> raw entity id -> record
pub type RawGroups = BTreeMap<String, BTreeMap<String, RawMetrics>>;

/// Pod specifications keyed by `"{namespace}_{podName}"`.
pub type PodSpecIndex = HashMap<String, Pod>;

/// Output of one grouping cycle together with the non-fatal errors hit along the way.
#[derive(Debug)]
pub struct Grouping {
    pub groups: RawGroups,
    pub errors: Vec<GroupingError>,
}

impl Default for Grouping {
    fn default() -> Self {
        Self::new()
    }
}

impl Grouping {
    pub fn new() -> Self {
        let mut groups = RawGroups::new();
        for label in [POD_GROUP, CONTAINER_GROUP, VOLUME_GROUP, NODE_GROUP] {
            groups.insert(label.to_string(), BTreeMap::new());
        }
        Self {
            groups,
            errors: Vec::new(),
        }
    }

    pub fn group(&self, label: &str) -> Option<&BTreeMap<String, RawMetrics>> {
        self.groups.get(label)
    }

    pub(crate) fn insert(&mut self, label: &str, raw_entity_id: String, metrics: RawMetrics) {
        self.groups
            .entry(label.to_string())
            .or_default()
            .insert(raw_entity_id, metrics);
    }
}
