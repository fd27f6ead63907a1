// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::k8s::pod::api_lister::{
    ApiServerSettings, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT, IN_CLUSTER_CA_FILE, IN_CLUSTER_TOKEN_FILE,
};
use crate::k8s::pod::Scope;
use crate::sampler::DEFAULT_PROBE_TIMEOUT;

pub const PROD: &str = "prod";
pub const TEST: &str = "test";

const DEFAULT_API_NAME: &str = "healthcheck-exporter";
const DEFAULT_API_PORT: &str = "9102";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Exporter {
    #[serde(rename = "exporter")]
    pub exporter: ExporterBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExporterBox {
    pub env: String,
    pub logs: Option<Logs>,
    pub api: Option<Api>,
    pub k8s: Option<K8S>,
    pub probe: Option<Probe>,
    pub metrics: Option<Metrics>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Api {
    pub name: Option<String>,
    pub port: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct K8S {
    /// Empty or absent means all namespaces.
    pub namespace: Option<String>,
    #[serde(rename = "api_server")]
    pub api_server: Option<String>,
    #[serde(rename = "token_file")]
    pub token_file: Option<PathBuf>,
    #[serde(rename = "ca_file")]
    pub ca_file: Option<PathBuf>,
    #[serde(rename = "page_size")]
    pub page_size: Option<usize>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Probe {
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metrics {
    /// Exposes process_* metrics next to the probe latencies.
    pub process: bool,
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    fn is_test(&self) -> bool;
    fn api(&self) -> Option<&Api>;
    fn k8s(&self) -> Option<&K8S>;
    fn scope(&self) -> Scope;
    fn probe_timeout(&self) -> Duration;
    fn process_metrics(&self) -> bool;
}

// Config type alias for convenience
pub type Config = Exporter;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.exporter.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.exporter.env == PROD
    }

    fn is_test(&self) -> bool {
        self.exporter.env == TEST
    }

    fn api(&self) -> Option<&Api> {
        self.exporter.api.as_ref()
    }

    fn k8s(&self) -> Option<&K8S> {
        self.exporter.k8s.as_ref()
    }

    fn scope(&self) -> Scope {
        Scope::from_namespace(self.k8s().and_then(|k| k.namespace.as_deref()))
    }

    fn probe_timeout(&self) -> Duration {
        self.exporter
            .probe
            .as_ref()
            .and_then(|p| p.timeout)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT)
    }

    fn process_metrics(&self) -> bool {
        self.exporter.metrics.as_ref().map(|m| m.process).unwrap_or(true)
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        let cfg = Self::from_yaml(&data).with_context(|| format!("unmarshal yaml from {:?}", abs_path))?;
        Ok(cfg)
    }

    /// Parses and validates configuration from YAML text.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let cfg: Exporter = serde_yaml::from_str(data)?;

        if let Some(api) = cfg.api() {
            if let Some(port) = api.port.as_deref() {
                port.trim_start_matches(':')
                    .parse::<u16>()
                    .with_context(|| format!("invalid api.port {:?}", port))?;
            }
        }
        if cfg.k8s().and_then(|k| k.page_size) == Some(0) {
            anyhow::bail!("k8s.page_size must be positive");
        }
        if cfg.probe_timeout().is_zero() {
            anyhow::bail!("probe.timeout must be positive");
        }

        Ok(cfg)
    }

    /// Overrides the namespace scope (CLI flag).
    pub fn set_namespace(&mut self, namespace: String) {
        self.exporter
            .k8s
            .get_or_insert_with(K8S::default)
            .namespace = Some(namespace);
    }

    /// HTTP listen name and port (without the leading ':').
    pub fn listen(&self) -> (String, String) {
        let api = self.api();
        let name = api
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| DEFAULT_API_NAME.to_string());
        let port = api
            .and_then(|a| a.port.as_deref())
            .unwrap_or(DEFAULT_API_PORT)
            .trim_start_matches(':')
            .to_string();
        (name, port)
    }

    /// API server connection settings, in-cluster defaults for anything unset.
    pub fn api_server_settings(&self) -> Result<ApiServerSettings> {
        let k8s = self.k8s().cloned().unwrap_or_default();

        let api_server = match k8s.api_server {
            Some(addr) if !addr.trim().is_empty() => addr,
            _ => ApiServerSettings::in_cluster_api_server().context(
                "k8s.api_server is not set and KUBERNETES_SERVICE_HOST is not available (not running in a cluster?)",
            )?,
        };

        let (token_file, token_required) = match k8s.token_file {
            Some(path) => (Some(path), true),
            None => (Some(PathBuf::from(IN_CLUSTER_TOKEN_FILE)), false),
        };

        Ok(ApiServerSettings {
            api_server,
            token_file,
            token_required,
            page_size: k8s.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            timeout: k8s.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    /// CA bundle for the API server: configured file, else the in-cluster one when present.
    pub fn api_ca_file(&self) -> Option<PathBuf> {
        if let Some(path) = self.k8s().and_then(|k| k.ca_file.clone()) {
            return Some(path);
        }
        let in_cluster = PathBuf::from(IN_CLUSTER_CA_FILE);
        in_cluster.exists().then_some(in_cluster)
    }
}

// Test config is always available for integration tests
mod test_config;
pub use test_config::new_test_config;
