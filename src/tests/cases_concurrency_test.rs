//! Fan-out and single-flight behaviour of sampling cycles.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::k8s::pod::Scope;
use crate::sampler::{Observation, Sampler};
use crate::tests::support::{pod, HttpProbeSpec, RecordingProber, StaticLister};

fn probed_pods(n: usize) -> Vec<crate::k8s::pod::Pod> {
    (0..n)
        .map(|i| {
            pod(
                "ns1",
                &format!("pod-{}", i),
                Some("web"),
                Some(HttpProbeSpec::http(8080, "/healthz")),
                Some("10.0.0.1"),
            )
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycle_latency_is_bounded_by_slowest_probe() {
    let delay = Duration::from_millis(300);
    let prober = RecordingProber::new(delay);
    let sampler = Sampler::new(
        Arc::new(StaticLister::new(probed_pods(10))),
        Arc::new(prober.clone()),
        Scope::AllNamespaces,
    );

    let started = Instant::now();
    let mut observations: Vec<Observation> = Vec::new();
    let report = sampler.collect(&mut observations).await.expect("cycle succeeds");
    let elapsed = started.elapsed();

    assert_eq!(report.targets, 10);
    assert_eq!(observations.len(), 10);
    assert!(elapsed >= delay);
    // Serial execution would need 3s.
    assert!(elapsed < Duration::from_millis(1500), "cycle took {:?}", elapsed);
    assert_eq!(prober.events().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cycles_never_overlap() {
    let prober = RecordingProber::new(Duration::from_millis(150));
    let sampler = Arc::new(Sampler::new(
        Arc::new(StaticLister::new(probed_pods(3))),
        Arc::new(prober.clone()),
        Scope::AllNamespaces,
    ));

    let first = {
        let sampler = sampler.clone();
        tokio::spawn(async move {
            let mut sink: Vec<Observation> = Vec::new();
            sampler.collect(&mut sink).await.map(|_| sink.len())
        })
    };
    let second = {
        let sampler = sampler.clone();
        tokio::spawn(async move {
            let mut sink: Vec<Observation> = Vec::new();
            sampler.collect(&mut sink).await.map(|_| sink.len())
        })
    };

    assert_eq!(first.await.unwrap().unwrap(), 3);
    assert_eq!(second.await.unwrap().unwrap(), 3);

    let mut events = prober.events();
    assert_eq!(events.len(), 6);
    events.sort_by_key(|(_, start, _)| *start);

    let (earlier, later) = events.split_at(3);
    let earlier_done = earlier.iter().map(|(_, _, end)| *end).max().unwrap();
    let later_start = later.iter().map(|(_, start, _)| *start).min().unwrap();
    assert!(
        later_start >= earlier_done,
        "second cycle started probing before the first one finished"
    );
}
