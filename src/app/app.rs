// Exporter application implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigTrait};
use crate::http::client::{create_api_client, create_probe_client};
use crate::k8s::pod::{ApiServerPodLister, PodLister};
use crate::liveness;
use crate::sampler::{HttpProber, Prober, Sampler};

use super::server::ExporterServer;

/// Encapsulates the entire exporter application state.
#[derive(Clone)]
pub struct App {
    shutdown_token: CancellationToken,
    probe: Arc<liveness::Probe>,
    server: Arc<ExporterServer>,
}

impl App {
    /// Creates the application talking to the configured API server.
    pub fn new(
        shutdown_token: CancellationToken,
        cfg: Config,
        probe: Arc<liveness::Probe>,
    ) -> Result<Self> {
        let settings = cfg.api_server_settings()?;
        let ca_file = cfg.api_ca_file();
        let api_client =
            create_api_client(ca_file.as_deref()).context("failed to create api server client")?;

        info!(
            component = "app",
            event = "api_server_configured",
            api_server = %settings.api_server,
            ca_file = ?ca_file,
            page_size = settings.page_size,
            "kubernetes api server configured"
        );

        let lister = Arc::new(ApiServerPodLister::new(api_client, settings)) as Arc<dyn PodLister>;
        let prober = Arc::new(HttpProber::new(
            create_probe_client().context("failed to create probe client")?,
            cfg.probe_timeout(),
        )) as Arc<dyn Prober>;

        Ok(Self::with_parts(shutdown_token, cfg, probe, lister, prober))
    }

    /// Creates the application over explicit pod lister and prober.
    pub fn with_parts(
        shutdown_token: CancellationToken,
        cfg: Config,
        probe: Arc<liveness::Probe>,
        lister: Arc<dyn PodLister>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        let scope = cfg.scope();
        info!(
            component = "app",
            event = "scope_configured",
            scope = %scope,
            probe_timeout = ?cfg.probe_timeout(),
            "sampling scope configured"
        );

        let sampler = Arc::new(Sampler::new(lister, prober, scope));
        let server = Arc::new(ExporterServer::new(
            shutdown_token.clone(),
            cfg,
            sampler,
            probe.clone(),
        ));

        Self {
            shutdown_token,
            probe,
            server,
        }
    }

    pub fn server(&self) -> Arc<ExporterServer> {
        self.server.clone()
    }

    /// Serves the exporter until the shutdown token is cancelled.
    ///
    /// The returned handle resolves to the server's own result, so a failed
    /// bind reaches the caller after shutdown completes.
    pub async fn serve(
        &self,
        gsh: Arc<crate::shutdown::GracefulShutdown>,
    ) -> Result<JoinHandle<Result<()>>> {
        // Register liveness target before serving.
        self.probe
            .watch(vec![Arc::new(self.clone()) as Arc<dyn liveness::Service>]);

        let server = self.server.clone();
        let app_for_close = self.clone();

        let handle = tokio::task::spawn(async move {
            let result = server.listen_and_serve().await;
            if let Err(e) = &result {
                error!(
                    component = "app",
                    scope = "server",
                    event = "serve_failed",
                    error = %e,
                    "server failed to serve"
                );
            }

            app_for_close.close();

            // Signal graceful shutdown
            gsh.done();
            result
        });

        info!(
            component = "app",
            event = "started",
            "application lifecycle"
        );

        Ok(handle)
    }

    /// Checks whether the HTTP server is still alive.
    pub fn is_alive(&self) -> bool {
        if !self.server.is_alive() {
            warn!(
                component = "app",
                scope = "http_server",
                event = "gone_away",
                "http server has gone away"
            );
            return false;
        }
        true
    }

    /// Cancels everything still bound to the application token.
    pub fn close(&self) {
        self.shutdown_token.cancel();

        info!(
            component = "app",
            event = "stopped",
            "application lifecycle"
        );
    }
}

/// App implements liveness::Service for the exporter's own probe.
impl liveness::Service for App {
    fn is_alive(&self, _timeout: Duration) -> bool {
        App::is_alive(self)
    }
}
