// Prober doubles recording when probes run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::sampler::{PodProbeTarget, ProbeOutcome, ProbeResult, Prober};

/// Sleeps `delay` per probe and records (pod, start, end) of every probe.
#[derive(Clone)]
pub struct RecordingProber {
    delay: Duration,
    events: Arc<Mutex<Vec<(String, Instant, Instant)>>>,
}

impl RecordingProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<(String, Instant, Instant)> {
        self.events.lock().clone()
    }
}

#[async_trait::async_trait]
impl Prober for RecordingProber {
    async fn probe(&self, target: &PodProbeTarget) -> ProbeOutcome {
        let start = Instant::now();
        tokio::time::sleep(self.delay).await;
        let end = Instant::now();
        self.events.lock().push((target.pod_name.clone(), start, end));
        ProbeOutcome::new(target, ProbeResult::Success(end - start))
    }
}
