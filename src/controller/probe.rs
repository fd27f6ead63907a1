// Liveness endpoint of the exporter itself.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::http::Controller;
use crate::liveness;

pub const LIVENESS_PROBE_PATH: &str = "/k8s/probe";

const SUCCESS_RESPONSE: &str = r#"{"status":200,"message":"exporter is serving scrapes"}"#;
const FAILED_RESPONSE: &str = r#"{"status":503,"message":"exporter http server is down"}"#;

/// LivenessProbeController answers the kubelet probing this exporter's pod.
#[derive(Clone)]
pub struct LivenessProbeController {
    probe: Arc<liveness::Probe>,
}

impl LivenessProbeController {
    /// Creates a new liveness probe controller.
    pub fn new(probe: Arc<liveness::Probe>) -> Self {
        Self { probe }
    }

    async fn probe(&self) -> Response {
        if self.probe.is_alive_async().await {
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                SUCCESS_RESPONSE,
            )
                .into_response()
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::CONTENT_TYPE, "application/json")],
                FAILED_RESPONSE,
            )
                .into_response()
        }
    }
}

impl Controller for LivenessProbeController {
    fn add_route(&self, router: Router) -> Router {
        let probe_controller = self.clone();
        router.route(
            LIVENESS_PROBE_PATH,
            get(move || {
                let controller = probe_controller.clone();
                async move { controller.probe().await }
            }),
        )
    }
}
