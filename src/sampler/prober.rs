//! Probe execution: one HTTP GET per target, timed.

use std::time::{Duration, Instant};

use http_body_util::BodyExt;
use hyper::{Method, Request, Uri};
use tokio::time::timeout;
use tracing::debug;

use super::observation::FAILED_PROBE_VALUE;
use super::target::PodProbeTarget;
use crate::http::client::{empty_body, HyperClient};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Result of one probe. Flattened to milliseconds only at the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeResult {
    /// Response head received after the elapsed wall-clock time.
    Success(Duration),
    /// Transport-level failure (timeout, refused connection, DNS) or no usable endpoint.
    Failed,
}

impl ProbeResult {
    /// Milliseconds, or `-1` for a failed probe.
    pub fn as_millis_value(&self) -> f64 {
        match self {
            ProbeResult::Success(elapsed) => elapsed.as_nanos() as f64 / 1_000_000.0,
            ProbeResult::Failed => FAILED_PROBE_VALUE,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeResult::Failed)
    }
}

/// Outcome of one target together with the labels it is reported under.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub namespace: String,
    pub container_label: String,
    pub pod_name: String,
    pub result: ProbeResult,
}

impl ProbeOutcome {
    pub fn new(target: &PodProbeTarget, result: ProbeResult) -> Self {
        Self {
            namespace: target.namespace.clone(),
            container_label: target.container_label.clone(),
            pod_name: target.pod_name.clone(),
            result,
        }
    }
}

/// Prober executes a single target. Never fails: errors become `ProbeResult::Failed`.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &PodProbeTarget) -> ProbeOutcome;
}

/// Prober over the shared pooled hyper client.
pub struct HttpProber {
    client: HyperClient,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(client: HyperClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn get(&self, endpoint: &str) -> ProbeResult {
        let uri: Uri = match endpoint.parse() {
            Ok(uri) => uri,
            Err(e) => {
                debug!(
                    component = "prober",
                    event = "invalid_endpoint",
                    endpoint = endpoint,
                    error = %e,
                    "probe endpoint does not parse"
                );
                return ProbeResult::Failed;
            }
        };
        // The connector would fall back to 80/443 for a missing port.
        if uri.host().map_or(true, str::is_empty) || uri.port_u16().is_none() {
            debug!(
                component = "prober",
                event = "invalid_endpoint",
                endpoint = endpoint,
                "probe endpoint has no host or no explicit port"
            );
            return ProbeResult::Failed;
        }

        let req = match Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(empty_body())
        {
            Ok(req) => req,
            Err(e) => {
                debug!(
                    component = "prober",
                    event = "invalid_request",
                    endpoint = endpoint,
                    error = %e,
                    "failed to build probe request"
                );
                return ProbeResult::Failed;
            }
        };

        let start = Instant::now();
        let response = match timeout(self.timeout, self.client.request(req)).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                debug!(
                    component = "prober",
                    event = "request_failed",
                    endpoint = endpoint,
                    error = %e,
                    "probe request failed"
                );
                return ProbeResult::Failed;
            }
            Err(_) => {
                debug!(
                    component = "prober",
                    event = "timeout",
                    endpoint = endpoint,
                    timeout = ?self.timeout,
                    "probe request timed out"
                );
                return ProbeResult::Failed;
            }
        };
        let elapsed = start.elapsed();

        // Drain the body so the connection goes back to the pool,
        // bounded by what is left of the probe timeout.
        let status = response.status();
        let remaining = self.timeout.saturating_sub(elapsed);
        if timeout(remaining, response.into_body().collect()).await.is_err() {
            debug!(
                component = "prober",
                event = "body_drain_timeout",
                endpoint = endpoint,
                "dropped probe response body before it was fully read"
            );
        }

        debug!(
            component = "prober",
            event = "probed",
            endpoint = endpoint,
            status = status.as_u16(),
            elapsed = ?elapsed,
            "probe completed"
        );

        ProbeResult::Success(elapsed)
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &PodProbeTarget) -> ProbeOutcome {
        let result = match target.endpoint.as_url() {
            Some(url) => self.get(url).await,
            None => {
                debug!(
                    component = "prober",
                    event = "unprobeable_target",
                    pod = %target.pod_name,
                    endpoint = %target.endpoint,
                    "target has no address to probe"
                );
                ProbeResult::Failed
            }
        };
        ProbeOutcome::new(target, result)
    }
}
