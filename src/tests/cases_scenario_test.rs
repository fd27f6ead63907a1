//! End-to-end sampling scenarios against real local probe endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

use crate::http::client::create_probe_client;
use crate::k8s::pod::model::IntOrString;
use crate::k8s::pod::{PodLister, Scope};
use crate::sampler::{HttpProber, Observation, Prober, Sampler, FAILED_PROBE_VALUE};
use crate::tests::support::{pod, unreachable_port, FlakyLister, HttpProbeSpec, ProbeEndpoint, StaticLister};

fn http_prober(timeout: Duration) -> Arc<dyn Prober> {
    Arc::new(HttpProber::new(
        create_probe_client().expect("probe client"),
        timeout,
    ))
}

fn find<'a>(observations: &'a [Observation], pod_name: &str) -> Option<&'a Observation> {
    observations.iter().find(|o| o.label("pod_name") == Some(pod_name))
}

#[tokio::test]
async fn test_reachable_unreachable_and_unprobed_pods() {
    let healthy = ProbeEndpoint::start("/healthz", Duration::from_millis(50), StatusCode::OK).await;
    let dead_port = unreachable_port().await;

    let pods = vec![
        pod("ns1", "p1", Some("web"), Some(HttpProbeSpec::http(healthy.port(), "/healthz")), Some("127.0.0.1")),
        pod("ns1", "p2", Some("web2"), Some(HttpProbeSpec::http(dead_port, "/healthz")), Some("127.0.0.1")),
        pod("ns1", "p3", Some("batch"), None, Some("127.0.0.1")),
    ];
    let lister = Arc::new(StaticLister::new(pods));
    let sampler = Sampler::new(
        lister.clone() as Arc<dyn PodLister>,
        http_prober(Duration::from_secs(3)),
        Scope::Namespace("ns1".to_string()),
    );

    let mut observations: Vec<Observation> = Vec::new();
    let report = sampler.collect(&mut observations).await.expect("cycle succeeds");

    assert_eq!(report.pods, 3);
    assert_eq!(report.targets, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(observations.len(), 2);
    assert_eq!(lister.calls(), 1);
    assert_eq!(lister.last_scope(), Some(Scope::Namespace("ns1".to_string())));

    let p1 = find(&observations, "p1").expect("p1 observed");
    assert_eq!(p1.label("namespace"), Some("ns1"));
    assert_eq!(p1.label("container_name"), Some("web"));
    assert!(p1.value >= 50.0, "p1 latency {} below the endpoint delay", p1.value);
    assert!(p1.value < 2_000.0, "p1 latency {} unexpectedly large", p1.value);
    assert_eq!(p1.descriptor.name, "container_health_check_duration_millisecond");

    let p2 = find(&observations, "p2").expect("p2 observed");
    assert_eq!(p2.label("container_name"), Some("web2"));
    assert_eq!(p2.value, FAILED_PROBE_VALUE);

    assert!(find(&observations, "p3").is_none());
    assert_eq!(healthy.hits(), 1);
}

#[tokio::test]
async fn test_non_2xx_status_is_still_a_latency() {
    let failing = ProbeEndpoint::start("/healthz", Duration::ZERO, StatusCode::SERVICE_UNAVAILABLE).await;
    let pods = vec![pod(
        "ns1",
        "sick",
        Some("api"),
        Some(HttpProbeSpec::http(failing.port(), "/healthz")),
        Some("127.0.0.1"),
    )];
    let sampler = Sampler::new(
        Arc::new(StaticLister::new(pods)),
        http_prober(Duration::from_secs(3)),
        Scope::AllNamespaces,
    );

    let mut observations: Vec<Observation> = Vec::new();
    let report = sampler.collect(&mut observations).await.expect("cycle succeeds");

    assert_eq!(report.failed, 0);
    assert_eq!(observations.len(), 1);
    assert!(observations[0].value >= 0.0);
}

#[tokio::test]
async fn test_slow_endpoint_times_out_as_failure() {
    let slow = ProbeEndpoint::start("/healthz", Duration::from_secs(5), StatusCode::OK).await;
    let pods = vec![pod(
        "ns1",
        "slow",
        Some("api"),
        Some(HttpProbeSpec::http(slow.port(), "/healthz")),
        Some("127.0.0.1"),
    )];
    let sampler = Sampler::new(
        Arc::new(StaticLister::new(pods)),
        http_prober(Duration::from_millis(200)),
        Scope::AllNamespaces,
    );

    let started = std::time::Instant::now();
    let mut observations: Vec<Observation> = Vec::new();
    sampler.collect(&mut observations).await.expect("cycle succeeds");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].value, FAILED_PROBE_VALUE);
}

#[tokio::test]
async fn test_enumeration_failure_emits_nothing_and_releases_lock() {
    let healthy = ProbeEndpoint::start("/healthz", Duration::ZERO, StatusCode::OK).await;
    let pods = vec![pod(
        "ns1",
        "p1",
        Some("web"),
        Some(HttpProbeSpec::http(healthy.port(), "/healthz")),
        Some("127.0.0.1"),
    )];
    let lister = Arc::new(FlakyLister::failing(pods));
    let sampler = Sampler::new(
        lister.clone() as Arc<dyn PodLister>,
        http_prober(Duration::from_secs(3)),
        Scope::AllNamespaces,
    );

    let mut observations: Vec<Observation> = Vec::new();
    let err = sampler.collect(&mut observations).await.unwrap_err();
    assert!(err.to_string().contains("403"), "unexpected error: {}", err);
    assert!(observations.is_empty());
    assert_eq!(healthy.hits(), 0);

    lister.set_failing(false);
    let report = tokio::time::timeout(Duration::from_secs(5), sampler.collect(&mut observations))
        .await
        .expect("lock was released by the failed cycle")
        .expect("healthy cycle succeeds");
    assert_eq!(report.targets, 1);
    assert_eq!(observations.len(), 1);
    assert!(observations[0].value >= 0.0);
}

#[tokio::test]
async fn test_unresolvable_named_port_fails_without_touching_the_network() {
    // Answers on the default http port when the host allows binding it,
    // so a request that lost its port would be observed here.
    let default_port = ProbeEndpoint::bind("127.0.0.1:80", "/healthz", Duration::ZERO, StatusCode::OK)
        .await
        .ok();

    let unnamed = HttpProbeSpec {
        scheme: "HTTP",
        port: IntOrString::String("metrics".to_string()),
        path: "/healthz",
    };
    let pods = vec![
        pod("ns1", "named", Some("web"), Some(unnamed), Some("127.0.0.1")),
        pod("ns1", "pending", Some("web"), Some(HttpProbeSpec::http(80, "/healthz")), None),
    ];
    let sampler = Sampler::new(
        Arc::new(StaticLister::new(pods)),
        http_prober(Duration::from_secs(3)),
        Scope::AllNamespaces,
    );

    let mut observations: Vec<Observation> = Vec::new();
    let report = sampler.collect(&mut observations).await.expect("cycle succeeds");

    assert_eq!(report.targets, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(find(&observations, "named").expect("named observed").value, FAILED_PROBE_VALUE);
    assert_eq!(find(&observations, "pending").expect("pending observed").value, FAILED_PROBE_VALUE);
    if let Some(endpoint) = default_port {
        assert_eq!(endpoint.hits(), 0);
    }
}
