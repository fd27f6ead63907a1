// HTTP controllers of the exporter.

pub mod controller;
pub mod metrics;
pub mod probe;


pub use controller::Controller;
pub use metrics::PrometheusMetricsController;
pub use probe::LivenessProbeController;
