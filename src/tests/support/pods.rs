// Pod fixtures and in-memory pod listers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::k8s::pod::model::{
    Container, ContainerPort, HttpGetAction, IntOrString, ObjectMeta, PodSpec, PodStatus, Probe,
};
use crate::k8s::pod::{ListError, Pod, PodLister, Scope};

/// HTTP liveness probe of a fixture pod.
#[derive(Debug, Clone)]
pub struct HttpProbeSpec {
    pub scheme: &'static str,
    pub port: IntOrString,
    pub path: &'static str,
}

impl HttpProbeSpec {
    pub fn http(port: u16, path: &'static str) -> Self {
        Self {
            scheme: "HTTP",
            port: IntOrString::Int(port as i32),
            path,
        }
    }
}

/// Builds a single-container pod.
pub fn pod(
    namespace: &str,
    name: &str,
    app: Option<&str>,
    probe: Option<HttpProbeSpec>,
    pod_ip: Option<&str>,
) -> Pod {
    let mut labels = BTreeMap::new();
    if let Some(app) = app {
        labels.insert("app".to_string(), app.to_string());
    }

    let liveness_probe = probe.map(|p| Probe {
        http_get: Some(HttpGetAction {
            scheme: Some(p.scheme.to_string()),
            port: p.port,
            path: Some(p.path.to_string()),
            host: None,
        }),
    });

    Pod {
        metadata: ObjectMeta {
            name: name.to_string(),
            namespace: namespace.to_string(),
            labels,
        },
        spec: PodSpec {
            containers: vec![Container {
                name: "main".to_string(),
                ports: vec![ContainerPort {
                    name: Some("http".to_string()),
                    container_port: 8080,
                }],
                liveness_probe,
            }],
        },
        status: PodStatus {
            pod_ip: pod_ip.map(str::to_string),
        },
    }
}

/// Lister returning a fixed snapshot, counting calls and scopes.
pub struct StaticLister {
    pods: Vec<Pod>,
    calls: AtomicUsize,
    last_scope: parking_lot::Mutex<Option<Scope>>,
}

impl StaticLister {
    pub fn new(pods: Vec<Pod>) -> Self {
        Self {
            pods,
            calls: AtomicUsize::new(0),
            last_scope: parking_lot::Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_scope(&self) -> Option<Scope> {
        self.last_scope.lock().clone()
    }
}

#[async_trait::async_trait]
impl PodLister for StaticLister {
    async fn list(&self, scope: &Scope) -> Result<Vec<Pod>, ListError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_scope.lock() = Some(scope.clone());
        Ok(self.pods.clone())
    }
}

/// Lister that fails with a 403 until switched healthy.
pub struct FlakyLister {
    inner: StaticLister,
    failing: AtomicBool,
}

impl FlakyLister {
    pub fn failing(pods: Vec<Pod>) -> Self {
        Self {
            inner: StaticLister::new(pods),
            failing: AtomicBool::new(true),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PodLister for FlakyLister {
    async fn list(&self, scope: &Scope) -> Result<Vec<Pod>, ListError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ListError::Status {
                status: 403,
                body: "pods is forbidden".to_string(),
            });
        }
        self.inner.list(scope).await
    }
}
