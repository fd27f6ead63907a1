//! Prometheus metrics functionality.
//
//! Metrics organization:
//! - Probe latencies: exposition (rendered from each scrape's sampling cycle)
//! - Exporter metrics: meter (cycles, failures, panics) via the metrics facade
//! - Process metrics: metrics-process (process_resident_memory_bytes, process_cpu_*, etc.)

pub mod exposition;
pub mod meter;

#[cfg(test)]
mod exposition_test;

pub use exposition::Exposition;
pub use meter::*;
