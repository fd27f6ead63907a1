//! Hyper HTTP client configuration.
//!
//! One pooled client is built per outbound concern and then shared by cloning
//! the handle:
//! - probe client: hits pod liveness endpoints, platform TLS roots
//! - api client: talks to the Kubernetes API server, optional CA bundle

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::dns::GaiResolver;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::warn;

/// Connection pool configuration constants.
pub const CONNS_PER_HOST: usize = 4;
pub const MAX_IDLE_CONN_DURATION: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub type HyperClient =
    Client<HttpsConnector<HttpConnector<GaiResolver>>, BoxBody<Bytes, hyper::Error>>;

fn http_connector() -> HttpConnector<GaiResolver> {
    let mut http_connector = HttpConnector::new_with_resolver(GaiResolver::new());
    http_connector.set_nodelay(true);
    http_connector.set_keepalive(Some(Duration::from_secs(30)));
    http_connector.set_connect_timeout(Some(CONNECT_TIMEOUT));
    // https:// endpoints are handed to the TLS layer
    http_connector.enforce_http(false);
    http_connector
}

fn build(tls: HttpsConnector<HttpConnector<GaiResolver>>) -> HyperClient {
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(MAX_IDLE_CONN_DURATION)
        .pool_max_idle_per_host(CONNS_PER_HOST)
        .build(tls)
}

/// Creates the client used for pod liveness endpoints.
///
/// Probe endpoints are addressed by pod IP and mostly speak plain HTTP,
/// HTTPS ones are verified against the platform roots.
pub fn create_probe_client() -> Result<HyperClient> {
    let tls = platform_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http_connector());
    Ok(build(tls))
}

/// Creates the client used for the Kubernetes API server.
///
/// When `ca_file` is set only the certificates from that PEM bundle are trusted.
pub fn create_api_client(ca_file: Option<&Path>) -> Result<HyperClient> {
    let builder = match ca_file {
        Some(path) => {
            let tls_config = tls_config_from_ca(path)?;
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(tls_config)
        }
        None => platform_roots(),
    };
    let tls = builder
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http_connector());
    Ok(build(tls))
}

/// Native roots, or the bundled webpki roots when the host has none installed.
fn platform_roots() -> hyper_rustls::HttpsConnectorBuilder<hyper_rustls::builderstates::WantsSchemes> {
    match hyper_rustls::HttpsConnectorBuilder::new().with_native_roots() {
        Ok(builder) => builder,
        Err(e) => {
            warn!(
                component = "http_client",
                event = "native_roots_unavailable",
                error = %e,
                "falling back to bundled webpki roots"
            );
            hyper_rustls::HttpsConnectorBuilder::new().with_webpki_roots()
        }
    }
}

fn tls_config_from_ca(path: &Path) -> Result<rustls::ClientConfig> {
    let pem = std::fs::read(path).with_context(|| format!("read CA bundle {:?}", path))?;

    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut pem.as_slice()) {
        let cert = cert.with_context(|| format!("parse CA bundle {:?}", path))?;
        roots
            .add(cert)
            .with_context(|| format!("add certificate from {:?}", path))?;
    }
    if roots.is_empty() {
        anyhow::bail!("CA bundle {:?} contains no certificates", path);
    }

    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}
