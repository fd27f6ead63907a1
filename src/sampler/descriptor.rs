// Static metric descriptors exported by the sampler.

use std::sync::Arc;

pub const HEALTH_CHECK_DURATION: &str = "container_health_check_duration_millisecond";
pub const HEALTH_CHECK_DURATION_HELP: &str =
    "The time(millisecond) taken to invoke the health check interface";

pub const LABEL_NAMESPACE: &str = "namespace";
pub const LABEL_CONTAINER_NAME: &str = "container_name";
pub const LABEL_POD_NAME: &str = "pod_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Name, help text and ordered label names of one exported metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl MetricDescriptor {
    pub fn health_check_duration() -> Self {
        Self {
            name: HEALTH_CHECK_DURATION,
            help: HEALTH_CHECK_DURATION_HELP,
            kind: MetricKind::Gauge,
            labels: &[LABEL_NAMESPACE, LABEL_CONTAINER_NAME, LABEL_POD_NAME],
        }
    }
}

/// Every descriptor the exporter can produce.
pub fn descriptors() -> Vec<Arc<MetricDescriptor>> {
    vec![Arc::new(MetricDescriptor::health_check_duration())]
}
