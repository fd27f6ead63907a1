// Exporter self-metrics recorded through the `metrics` facade.

use std::time::Duration;

pub const CYCLES: &str = "healthcheck_exporter_cycles_total";
pub const CYCLE_FAILURES: &str = "healthcheck_exporter_cycle_failures_total";
pub const CYCLE_DURATION: &str = "healthcheck_exporter_cycle_duration_seconds";
pub const PROBE_TARGETS: &str = "healthcheck_exporter_probe_targets";
pub const PROBE_FAILURES: &str = "healthcheck_exporter_probe_failures_total";
pub const PANICKED: &str = "healthcheck_exporter_http_panics_total";

/// Registers HELP text for the self-metrics.
pub fn describe() {
    ::metrics::describe_counter!(CYCLES, "Sampling cycles completed");
    ::metrics::describe_counter!(CYCLE_FAILURES, "Sampling cycles aborted by a pod enumeration failure");
    ::metrics::describe_gauge!(CYCLE_DURATION, "Duration of the last completed sampling cycle");
    ::metrics::describe_gauge!(PROBE_TARGETS, "Probe targets in the last completed sampling cycle");
    ::metrics::describe_counter!(PROBE_FAILURES, "Probes that failed at the transport level");
    ::metrics::describe_counter!(PANICKED, "HTTP handlers recovered from a panic");
}

/// Records a completed cycle.
pub fn record_cycle(targets: usize, failed: usize, elapsed: Duration) {
    ::metrics::counter!(CYCLES).increment(1);
    ::metrics::counter!(PROBE_FAILURES).increment(failed as u64);
    ::metrics::gauge!(CYCLE_DURATION).set(elapsed.as_secs_f64());
    ::metrics::gauge!(PROBE_TARGETS).set(targets as f64);
}

/// Adds an aborted cycle.
pub fn inc_cycle_failures() {
    ::metrics::counter!(CYCLE_FAILURES).increment(1);
}

/// Adds recovered panics.
pub fn add_panics(value: u64) {
    ::metrics::counter!(PANICKED).increment(value);
}
