//! Prometheus text exposition (format 0.0.4) of sampled observations.

use std::fmt::Write;
use std::sync::Arc;

use crate::sampler::{MetricDescriptor, Observation, ObservationSink};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Sink collecting one cycle's observations for rendering.
///
/// Descriptors are registered up front so HELP/TYPE lines are written even
/// for a cycle without eligible pods.
pub struct Exposition {
    descriptors: Vec<Arc<MetricDescriptor>>,
    observations: Vec<Observation>,
}

impl Exposition {
    pub fn new(descriptors: &[Arc<MetricDescriptor>]) -> Self {
        Self {
            descriptors: descriptors.to_vec(),
            observations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Renders every registered metric family followed by its samples.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(128 + self.observations.len() * 128);
        for descriptor in &self.descriptors {
            let _ = writeln!(out, "# HELP {} {}", descriptor.name, escape_help(descriptor.help));
            let _ = writeln!(out, "# TYPE {} {}", descriptor.name, descriptor.kind.as_str());

            for obs in self.observations.iter().filter(|o| o.descriptor.name == descriptor.name) {
                write_sample(&mut out, descriptor, obs);
            }
        }
        out
    }
}

impl ObservationSink for Exposition {
    fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }
}

fn write_sample(out: &mut String, descriptor: &MetricDescriptor, obs: &Observation) {
    out.push_str(descriptor.name);
    if !descriptor.labels.is_empty() {
        out.push('{');
        for (i, (name, value)) in descriptor.labels.iter().zip(&obs.label_values).enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}=\"{}\"", name, escape_label_value(value));
        }
        out.push('}');
    }
    let _ = writeln!(
        out,
        " {} {}",
        format_value(obs.value),
        obs.timestamp.timestamp_millis()
    );
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// Escapes `\`, `"` and line feeds in a label value.
pub fn escape_label_value(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}
