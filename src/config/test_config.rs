use super::{Api, Config, ExporterBox, Logs, Metrics, Probe, K8S};
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    Config {
        exporter: ExporterBox {
            env: super::TEST.to_string(),
            logs: Some(Logs {
                level: Some("debug".to_string()),
            }),
            api: Some(Api {
                name: Some("healthcheck-exporter-test".to_string()),
                port: Some("9102".to_string()),
            }),
            k8s: Some(K8S {
                namespace: Some("ns1".to_string()),
                api_server: Some("http://127.0.0.1:8001".to_string()),
                token_file: None,
                ca_file: None,
                page_size: Some(100),
                timeout: Some(Duration::from_secs(2)),
            }),
            probe: Some(Probe {
                timeout: Some(Duration::from_millis(500)),
            }),
            metrics: Some(Metrics { process: false }),
        },
    }
}
