//! Derives probe targets from pod snapshots. Pure, no I/O.

use std::fmt;

use crate::k8s::pod::model::{Container, HttpGetAction, Pod};

/// Pod label carrying the container name reported in observations.
pub const CONTAINER_LABEL_KEY: &str = "app";

const HTTP_SCHEME: &str = "HTTP";

/// Where a target is probed. Anything but `Url` fails without network I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `scheme://pod-ip:port/path`, always with an explicit numeric port.
    Url(String),
    /// The pod has no IP yet.
    MissingPodIp,
    /// The probe names a port the container does not declare.
    UnresolvedPort(String),
}

impl Endpoint {
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Endpoint::Url(url) => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Url(url) => write!(f, "{}", url),
            Endpoint::MissingPodIp => write!(f, "<no pod ip>"),
            Endpoint::UnresolvedPort(name) => write!(f, "<unresolved port {:?}>", name),
        }
    }
}

/// One probe to execute in the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodProbeTarget {
    pub namespace: String,
    pub pod_name: String,
    pub container_label: String,
    pub endpoint: Endpoint,
}

/// Builds the target of a pod, `None` when its first container
/// declares no HTTP liveness probe.
pub fn derive(pod: &Pod) -> Option<PodProbeTarget> {
    let (container, probe) = pod.first_liveness_probe()?;
    let http_get = probe.http_get.as_ref()?;

    Some(PodProbeTarget {
        namespace: pod.metadata.namespace.clone(),
        pod_name: pod.metadata.name.clone(),
        container_label: pod.label(CONTAINER_LABEL_KEY).unwrap_or_default().to_string(),
        endpoint: endpoint(http_get, container, pod.status.pod_ip.as_deref()),
    })
}

/// Targets of every eligible pod in the snapshot.
pub fn derive_all(pods: &[Pod]) -> Vec<PodProbeTarget> {
    pods.iter().filter_map(derive).collect()
}

fn endpoint(http_get: &HttpGetAction, container: &Container, pod_ip: Option<&str>) -> Endpoint {
    let port = match container.resolve_port(&http_get.port) {
        Some(port) if (1..=i32::from(u16::MAX)).contains(&port) => port,
        _ => return Endpoint::UnresolvedPort(http_get.port.to_string()),
    };
    let pod_ip = match pod_ip.map(str::trim) {
        Some(ip) if !ip.is_empty() => ip,
        _ => return Endpoint::MissingPodIp,
    };

    let scheme = match http_get.scheme.as_deref() {
        Some(s) if s.eq_ignore_ascii_case(HTTP_SCHEME) => "http",
        _ => "https",
    };

    let host = if pod_ip.contains(':') {
        format!("[{}]", pod_ip)
    } else {
        pod_ip.to_string()
    };

    let path = match http_get.path.as_deref() {
        None | Some("") => "/".to_string(),
        Some(p) if p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{}", p),
    };

    Endpoint::Url(format!("{}://{}:{}{}", scheme, host, port, path))
}
