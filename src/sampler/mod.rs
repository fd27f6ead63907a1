//! Health-check latency sampling.
//!
//! A cycle lists the pods in scope, derives one probe target per pod whose
//! first container declares an HTTP liveness probe, probes all targets
//! concurrently and emits one observation per target. Cycles are serialized.

pub mod descriptor;
pub mod engine;
pub mod observation;
pub mod prober;
pub mod target;


pub use descriptor::{descriptors, MetricDescriptor, MetricKind};
pub use engine::{CycleReport, SampleError, Sampler};
pub use observation::{Observation, ObservationSink, FAILED_PROBE_VALUE};
pub use prober::{HttpProber, ProbeOutcome, ProbeResult, Prober, DEFAULT_PROBE_TIMEOUT};
pub use target::{derive, derive_all, Endpoint, PodProbeTarget};
