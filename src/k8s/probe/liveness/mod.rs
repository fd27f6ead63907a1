// Package liveness answers the exporter's own Kubernetes liveness probe.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

pub mod error;
pub mod service;

pub use error::TimeoutIsTooShortError;
pub use service::Service;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Liveness probe over a set of watched services.
pub struct Probe {
    services: RwLock<Vec<Arc<dyn Service>>>,
    timeout: Duration,
}

impl Probe {
    /// Creates a new liveness probe
    pub fn new(timeout_duration: Duration) -> Self {
        const MIN_TIMEOUT: Duration = Duration::from_millis(1);
        let timeout = if timeout_duration < MIN_TIMEOUT {
            warn!(
                component = "liveness",
                error = %TimeoutIsTooShortError,
                "min timeout duration is 1ms (timeout set up as 10ms as a more reasonable value)"
            );
            Duration::from_millis(10)
        } else {
            timeout_duration
        };

        Self {
            services: RwLock::new(Vec::new()),
            timeout,
        }
    }

    /// Replaces the watched services. Nothing watched means not alive.
    pub fn watch(&self, services: Vec<Arc<dyn Service>>) {
        *self.services.write() = services;
    }

    /// Checks whether every watched service is alive within the probe timeout.
    pub async fn is_alive_async(&self) -> bool {
        let services = self.services.read().clone();
        if services.is_empty() {
            return false;
        }

        let probe_timeout = self.timeout;
        let check = tokio::task::spawn_blocking(move || {
            services.iter().all(|s| s.is_alive(probe_timeout))
        });

        match timeout(probe_timeout, check).await {
            Ok(Ok(alive)) => alive,
            Ok(Err(e)) => {
                warn!(component = "liveness", error = %e, "liveness check task failed");
                false
            }
            Err(_) => {
                warn!(
                    component = "liveness",
                    "liveness probe deadline exceeded while checking service"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Flag(AtomicBool);

    impl Service for Flag {
        fn is_alive(&self, _timeout: Duration) -> bool {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[tokio::test]
    async fn test_alive_only_when_all_services_alive() {
        let probe = Probe::new(Duration::from_millis(200));
        assert!(!probe.is_alive_async().await, "nothing watched");

        let a = Arc::new(Flag(AtomicBool::new(true)));
        let b = Arc::new(Flag(AtomicBool::new(true)));
        probe.watch(vec![a.clone(), b.clone()]);
        assert!(probe.is_alive_async().await);

        b.0.store(false, Ordering::Relaxed);
        assert!(!probe.is_alive_async().await);
    }

    #[tokio::test]
    async fn test_too_short_timeout_is_raised() {
        let probe = Probe::new(Duration::ZERO);
        assert_eq!(probe.timeout, Duration::from_millis(10));
    }
}
