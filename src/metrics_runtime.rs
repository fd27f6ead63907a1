use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use metrics_process::Collector;
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
static PROC_COLLECTOR: OnceCell<Collector> = OnceCell::new();

/// Installs the global recorder for the exporter's own metrics.
/// Called once from main, before the tokio runtime is built.
pub fn init_metrics(process_metrics: bool) -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;
    PROM_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Prometheus handle already initialized"))?;

    crate::metrics::describe();

    if process_metrics {
        let collector = Collector::default();
        collector.describe();
        let _ = PROC_COLLECTOR.set(collector);
    }
    Ok(())
}

/// Renders the exporter's own metrics, `None` when no recorder is installed.
pub fn scrape_prometheus_text() -> Option<String> {
    let h = PROM_HANDLE.get()?;
    if let Some(c) = PROC_COLLECTOR.get() {
        c.collect();
    }
    Some(h.render())
}
