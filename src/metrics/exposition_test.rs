use std::sync::Arc;

use chrono::{TimeZone, Utc};

use super::exposition::{escape_label_value, Exposition};
use crate::sampler::{descriptors, Observation, ObservationSink, FAILED_PROBE_VALUE};

fn observation(ns: &str, container: &str, pod: &str, value: f64) -> Observation {
    Observation {
        descriptor: Arc::clone(&descriptors()[0]),
        value,
        label_values: vec![ns.to_string(), container.to_string(), pod.to_string()],
        timestamp: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
    }
}

#[test]
fn test_render_registered_family_without_samples() {
    let exposition = Exposition::new(&descriptors());
    assert!(exposition.is_empty());
    assert_eq!(
        exposition.render(),
        "# HELP container_health_check_duration_millisecond The time(millisecond) taken to invoke the health check interface\n\
         # TYPE container_health_check_duration_millisecond gauge\n"
    );
}

#[test]
fn test_render_samples_with_timestamps() {
    let mut exposition = Exposition::new(&descriptors());
    exposition.push(observation("ns1", "web", "p1", 50.25));
    exposition.push(observation("ns1", "web2", "p2", FAILED_PROBE_VALUE));
    assert_eq!(exposition.len(), 2);

    let text = exposition.render();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[2],
        "container_health_check_duration_millisecond{namespace=\"ns1\",container_name=\"web\",pod_name=\"p1\"} 50.25 1700000000123"
    );
    assert_eq!(
        lines[3],
        "container_health_check_duration_millisecond{namespace=\"ns1\",container_name=\"web2\",pod_name=\"p2\"} -1 1700000000123"
    );
}

#[test]
fn test_label_values_are_escaped() {
    assert_eq!(escape_label_value(r#"a"b\c"#), r#"a\"b\\c"#);
    assert_eq!(escape_label_value("line\nbreak"), "line\\nbreak");
    assert_eq!(escape_label_value(""), "");

    let mut exposition = Exposition::new(&descriptors());
    exposition.push(observation("ns1", "", "p\"1", 1.0));
    let text = exposition.render();
    assert!(text.contains("container_name=\"\",pod_name=\"p\\\"1\""));
}
