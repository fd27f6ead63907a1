// HTTP server of the exporter application.

use anyhow::Result;
use axum::Router;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::http::{Controller, Middleware, Server as HttpServerTrait};
use crate::liveness;
use crate::sampler::Sampler;

/// HTTP server wrapping all controllers of the exporter.
pub struct ExporterServer {
    server: Arc<crate::http::HttpServer>,
    is_server_alive: Arc<AtomicBool>,
}

impl ExporterServer {
    /// Creates the server with its controllers and middlewares.
    pub fn new(
        ctx: CancellationToken,
        cfg: Config,
        sampler: Arc<Sampler>,
        probe: Arc<liveness::Probe>,
    ) -> Self {
        let server = crate::http::HttpServer::new(
            ctx,
            cfg,
            Self::controllers(sampler, probe),
            Self::middlewares(),
        );

        Self {
            server,
            is_server_alive: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns true if the server is marked as alive.
    pub fn is_alive(&self) -> bool {
        self.is_server_alive.load(Ordering::Relaxed)
    }

    pub fn router(&self) -> Router {
        self.server.router()
    }

    /// Starts the HTTP server (blocking call).
    pub async fn listen_and_serve(&self) -> Result<()> {
        self.is_server_alive.store(true, Ordering::Relaxed);
        let result = HttpServerTrait::listen_and_serve(self.server.as_ref()).await;
        self.is_server_alive.store(false, Ordering::Relaxed);
        result
    }

    /// Returns all HTTP controllers for the server.
    fn controllers(sampler: Arc<Sampler>, probe: Arc<liveness::Probe>) -> Vec<Box<dyn Controller>> {
        use crate::controller;

        vec![
            // Healthcheck probe endpoint of the exporter itself
            Box::new(controller::LivenessProbeController::new(probe)),
            // Scrape endpoint, runs one sampling cycle per request
            Box::new(controller::PrometheusMetricsController::new(sampler)),
        ]
    }

    /// Returns the request middlewares for the server, executed in reverse order.
    fn middlewares() -> Vec<Box<dyn Middleware>> {
        vec![Box::new(
            crate::middleware::recover_middleware::PanicRecoverMiddleware::new(),
        )]
    }
}
