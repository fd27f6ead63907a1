//! Subset of the Kubernetes `v1.Pod` object the exporter reads.
//!
//! Every field decodes as optional; unknown fields are ignored so the
//! model keeps working across API server versions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `v1.PodList` as returned by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PodList {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListMeta {
    /// Pagination token; empty or absent on the last page.
    #[serde(rename = "continue", default)]
    pub continue_token: Option<String>,
    #[serde(rename = "resourceVersion", default)]
    pub resource_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Container {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
    #[serde(rename = "livenessProbe", default)]
    pub liveness_probe: Option<Probe>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContainerPort {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "containerPort")]
    pub container_port: i32,
}

/// Only the HTTP handler matters here, exec/tcp/grpc probes decode into `None`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Probe {
    #[serde(rename = "httpGet", default)]
    pub http_get: Option<HttpGetAction>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpGetAction {
    /// `HTTP` or `HTTPS`.
    #[serde(default)]
    pub scheme: Option<String>,
    pub port: IntOrString,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

/// Kubernetes `IntOrString`: a numeric port or a named container port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntOrString::Int(n) => write!(f, "{}", n),
            IntOrString::String(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PodStatus {
    #[serde(rename = "podIP", default)]
    pub pod_ip: Option<String>,
}

impl Pod {
    /// Liveness probe of the first declared container, if any.
    pub fn first_liveness_probe(&self) -> Option<(&Container, &Probe)> {
        let container = self.spec.containers.first()?;
        container.liveness_probe.as_ref().map(|p| (container, p))
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }
}

impl Container {
    /// Resolves a probe port against this container's declared ports.
    pub fn resolve_port(&self, port: &IntOrString) -> Option<i32> {
        match port {
            IntOrString::Int(n) => Some(*n),
            IntOrString::String(s) => match s.parse::<i32>() {
                Ok(n) => Some(n),
                Err(_) => self
                    .ports
                    .iter()
                    .find(|p| p.name.as_deref() == Some(s.as_str()))
                    .map(|p| p.container_port),
            },
        }
    }
}
