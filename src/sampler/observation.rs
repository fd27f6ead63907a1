// Observations and the sink they are delivered to.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::descriptor::MetricDescriptor;

/// Value emitted for a probe that failed at the transport level.
pub const FAILED_PROBE_VALUE: f64 = -1.0;

/// One timestamped metric value with its label values,
/// ordered like `descriptor.labels`.
#[derive(Debug, Clone)]
pub struct Observation {
    pub descriptor: Arc<MetricDescriptor>,
    pub value: f64,
    pub label_values: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// Label value by label name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .labels
            .iter()
            .position(|l| *l == name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }
}

/// Accepts the observations of a sampling cycle.
pub trait ObservationSink: Send {
    fn push(&mut self, observation: Observation);
}

impl ObservationSink for Vec<Observation> {
    fn push(&mut self, observation: Observation) {
        Vec::push(self, observation);
    }
}
