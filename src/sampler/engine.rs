//! Sampling engine: one enumerate, probe, emit pass per call, never two at once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::descriptor::{descriptors, MetricDescriptor};
use super::observation::{Observation, ObservationSink};
use super::prober::{ProbeOutcome, ProbeResult, Prober};
use super::target::{derive_all, PodProbeTarget};
use crate::k8s::pod::{ListError, PodLister, Scope};
use crate::metrics;

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("failed to enumerate pods in scope {scope}: {source}")]
    Enumeration {
        scope: Scope,
        #[source]
        source: ListError,
    },
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub pods: usize,
    pub targets: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

pub struct Sampler {
    lister: Arc<dyn PodLister>,
    prober: Arc<dyn Prober>,
    scope: Scope,
    descriptors: Vec<Arc<MetricDescriptor>>,
    cycle: Mutex<()>,
}

impl Sampler {
    pub fn new(lister: Arc<dyn PodLister>, prober: Arc<dyn Prober>, scope: Scope) -> Self {
        Self {
            lister,
            prober,
            scope,
            descriptors: descriptors(),
            cycle: Mutex::new(()),
        }
    }

    /// Descriptors of every metric `collect` can emit.
    pub fn describe(&self) -> &[Arc<MetricDescriptor>] {
        &self.descriptors
    }

    /// Runs one sampling cycle and pushes its observations into `sink`.
    ///
    /// Waits for any cycle already in flight. On enumeration failure
    /// nothing is pushed.
    pub async fn collect(&self, sink: &mut dyn ObservationSink) -> Result<CycleReport, SampleError> {
        let _guard = self.cycle.lock().await;
        let start = Instant::now();

        let pods = match self.lister.list(&self.scope).await {
            Ok(pods) => pods,
            Err(source) => {
                metrics::inc_cycle_failures();
                error!(
                    component = "sampler",
                    event = "enumeration_failed",
                    scope = %self.scope,
                    error = %source,
                    "failed to list pods, cycle aborted"
                );
                return Err(SampleError::Enumeration {
                    scope: self.scope.clone(),
                    source,
                });
            }
        };

        let targets = derive_all(&pods);
        debug!(
            component = "sampler",
            event = "targets_derived",
            pods = pods.len(),
            targets = targets.len(),
            "probe targets derived"
        );

        let outcomes = self.probe_all(targets).await;

        let descriptor = &self.descriptors[0];
        let mut failed = 0;
        for outcome in &outcomes {
            if outcome.result.is_failed() {
                failed += 1;
            }
            sink.push(Observation {
                descriptor: Arc::clone(descriptor),
                value: outcome.result.as_millis_value(),
                label_values: vec![
                    outcome.namespace.clone(),
                    outcome.container_label.clone(),
                    outcome.pod_name.clone(),
                ],
                timestamp: Utc::now(),
            });
        }

        let report = CycleReport {
            pods: pods.len(),
            targets: outcomes.len(),
            failed,
            elapsed: start.elapsed(),
        };
        metrics::record_cycle(report.targets, report.failed, report.elapsed);

        info!(
            component = "sampler",
            event = "cycle_completed",
            scope = %self.scope,
            pods = report.pods,
            targets = report.targets,
            failed = report.failed,
            elapsed = ?report.elapsed,
            "sampling cycle completed"
        );

        Ok(report)
    }

    /// Probes every target concurrently and waits for all of them.
    async fn probe_all(&self, targets: Vec<PodProbeTarget>) -> Vec<ProbeOutcome> {
        let mut tasks = JoinSet::new();
        for (idx, target) in targets.iter().enumerate() {
            let prober = Arc::clone(&self.prober);
            let target = target.clone();
            tasks.spawn(async move { (idx, prober.probe(&target).await) });
        }

        let mut outcomes: Vec<Option<ProbeOutcome>> = vec![None; targets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => outcomes[idx] = Some(outcome),
                Err(e) => warn!(
                    component = "sampler",
                    event = "probe_task_failed",
                    error = %e,
                    "probe task did not complete"
                ),
            }
        }

        // A task that did not report (panicked) still accounts for its target.
        targets
            .iter()
            .zip(outcomes)
            .map(|(target, outcome)| {
                outcome.unwrap_or_else(|| ProbeOutcome::new(target, ProbeResult::Failed))
            })
            .collect()
    }
}
