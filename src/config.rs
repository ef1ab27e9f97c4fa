use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use crate::types::{Config, FilterConfig};

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }
    
    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }
    
    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

fn parse_bool<E: EnvironmentProvider>(env: &E, key: &str, default: bool) -> bool {
    env.get_var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let node_name = env.get_var("NODE_NAME")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("NODE_NAME env var must be set (usually from spec.nodeName)"))?;

    let cluster_name = env.get_var("CLUSTER_NAME")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("CLUSTER_NAME env var must be set"))?;

    let filter = FilterConfig {
        filter_service_account_volumes: parse_bool(env, "FILTER_SERVICE_ACCOUNT_VOLUMES", true),
        filter_secret_volumes: parse_bool(env, "FILTER_SECRET_VOLUMES", false),
        filter_configmap_volumes: parse_bool(env, "FILTER_CONFIGMAP_VOLUMES", false),
        deduplicate_azure_volumes: parse_bool(env, "DEDUPLICATE_AZURE_VOLUMES", false),
    };

    // 0 or unset runs a single cycle
    let interval_seconds = match env.get_var("INTERVAL_SECONDS") {
        Some(v) => {
            let secs: u64 = v.trim().parse().context("Invalid INTERVAL_SECONDS")?;
            Some(secs).filter(|s| *s > 0)
        }
        None => None,
    };

    Ok(Config {
        node_name,
        cluster_name,
        filter,
        interval_seconds,
    })
}
