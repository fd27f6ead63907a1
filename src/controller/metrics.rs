//! Metrics controller: every scrape runs one sampling cycle.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::http::Controller;
use crate::metrics::exposition::{Exposition, CONTENT_TYPE};
use crate::metrics_runtime;
use crate::sampler::Sampler;

pub const PROMETHEUS_METRICS_PATH: &str = "/metrics";

/// PrometheusMetricsController serves probe latencies and exporter metrics.
#[derive(Clone)]
pub struct PrometheusMetricsController {
    sampler: Arc<Sampler>,
}

impl PrometheusMetricsController {
    pub fn new(sampler: Arc<Sampler>) -> Self {
        Self { sampler }
    }

    /// Handles the scrape. An enumeration failure fails the whole scrape.
    async fn get_metrics(&self) -> Response {
        let mut exposition = Exposition::new(self.sampler.describe());

        if let Err(e) = self.sampler.collect(&mut exposition).await {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("sampling cycle failed: {}\n", e),
            )
                .into_response();
        }

        let mut body = exposition.render();
        if let Some(own) = metrics_runtime::scrape_prometheus_text() {
            body.push_str(&own);
        }

        (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
    }
}

impl Controller for PrometheusMetricsController {
    fn add_route(&self, router: Router) -> Router {
        let controller = self.clone();
        router.route(
            PROMETHEUS_METRICS_PATH,
            get(move || {
                let controller = controller.clone();
                async move { controller.get_metrics().await }
            }),
        )
    }
}
