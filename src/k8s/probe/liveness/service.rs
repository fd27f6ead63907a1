// Component checked by the exporter's own liveness probe.

use std::time::Duration;

/// Service reports whether a long-running part of the exporter still works.
/// Runs on a blocking thread; `timeout` is the whole probe's budget.
pub trait Service: Send + Sync {
    fn is_alive(&self, timeout: Duration) -> bool;
}
