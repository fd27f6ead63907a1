// Main entrypoint for the health-check latency exporter.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use healthcheck_exporter::app;
use healthcheck_exporter::config::{Config, ConfigTrait};
use healthcheck_exporter::liveness;
use healthcheck_exporter::metrics_runtime;
use healthcheck_exporter::shutdown::GracefulShutdown;

const CONFIG_PATH: &str = "cfg/healthcheck-exporter.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/healthcheck-exporter.cfg.local.yaml";

/// healthcheck-exporter - exports pod liveness probe latency as Prometheus gauges
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,

    /// Restrict sampling to one namespace (overrides k8s.namespace)
    #[arg(short, long, value_name = "NAMESPACE")]
    namespace: Option<String>,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<Config> {
    if let Some(custom_path) = path {
        return Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path));
    }

    match Config::load(PathBuf::from(CONFIG_PATH_LOCAL)) {
        Ok(cfg) => Ok(cfg),
        Err(_) => Config::load(PathBuf::from(CONFIG_PATH))
            .with_context(|| format!("failed to load config from {}", CONFIG_PATH)),
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_ref())
        .map(|s| s.as_str())
        .unwrap_or("info");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = load_cfg(args.cfg)?;
    if let Some(namespace) = args.namespace {
        cfg.set_namespace(namespace);
    }

    configure_logger(&cfg);

    // Install the recorder BEFORE the tokio runtime starts
    if let Err(e) = metrics_runtime::init_metrics(cfg.process_metrics()) {
        error!(
            component = "main",
            event = "metrics_init_failed",
            error = %e,
            "exporter self-metrics will not be available"
        );
    }

    tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?
        .block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let graceful_shutdown = GracefulShutdown::new(shutdown_token.clone(), Duration::from_secs(30));

    let probe = Arc::new(liveness::Probe::new(liveness::DEFAULT_TIMEOUT));

    let app = app::App::new(shutdown_token.clone(), cfg, probe)?;

    graceful_shutdown.add(1);
    let serving = app.serve(Arc::new(graceful_shutdown.clone())).await?;

    info!(
        component = "main",
        event = "ready",
        "exporter is serving scrapes"
    );

    if let Err(e) = graceful_shutdown.await_shutdown().await {
        error!(
            component = "main",
            scope = "service",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down service"
        );
        return Err(e);
    }

    serving
        .await
        .context("http server task panicked")?
        .context("http server stopped with an error")
}
