// Local HTTP endpoints standing in for pod liveness probes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Probe endpoint answering `path` after `delay` with `status`.
pub struct ProbeEndpoint {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl ProbeEndpoint {
    pub async fn start(path: &'static str, delay: Duration, status: StatusCode) -> Self {
        Self::bind("127.0.0.1:0", path, delay, status)
            .await
            .expect("bind probe endpoint")
    }

    /// Like `start` but on a fixed address; binding low ports may be refused.
    pub async fn bind(
        addr: &str,
        path: &'static str,
        delay: Duration,
        status: StatusCode,
    ) -> std::io::Result<Self> {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            path,
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    (status, "ok")
                }
            }),
        );

        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { addr, hits, handle })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for ProbeEndpoint {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A local port nothing listens on.
pub async fn unreachable_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let port = listener.local_addr().expect("ephemeral addr").port();
    drop(listener);
    port
}
