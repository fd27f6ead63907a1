//! Pod lister backed by the Kubernetes API server REST endpoints.

use std::path::PathBuf;
use std::time::Duration;

use http_body_util::BodyExt;
use hyper::{header, Method, Request, Uri};
use tokio::time::timeout;
use tracing::debug;

use super::lister::{ListError, PodLister, Scope};
use super::model::{Pod, PodList};
use crate::http::client::{empty_body, HyperClient};

pub const IN_CLUSTER_TOKEN_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
pub const IN_CLUSTER_CA_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
pub const DEFAULT_PAGE_SIZE: usize = 500;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_ERROR_BODY: usize = 512;

/// Connection settings of the API server lister.
#[derive(Debug, Clone)]
pub struct ApiServerSettings {
    /// Base URL, e.g. `https://10.96.0.1:443` or `http://127.0.0.1:8001`.
    pub api_server: String,
    pub token_file: Option<PathBuf>,
    /// A missing token file is an error only when it was configured explicitly.
    pub token_required: bool,
    pub page_size: usize,
    /// Bounds one whole listing, every page included.
    pub timeout: Duration,
}

impl ApiServerSettings {
    /// Address of the API server as seen from inside a pod.
    pub fn in_cluster_api_server() -> Option<String> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").ok()?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());
        let host = if host.contains(':') {
            format!("[{}]", host)
        } else {
            host
        };
        Some(format!("https://{}:{}", host, port))
    }
}

pub struct ApiServerPodLister {
    client: HyperClient,
    settings: ApiServerSettings,
}

impl ApiServerPodLister {
    pub fn new(client: HyperClient, settings: ApiServerSettings) -> Self {
        Self { client, settings }
    }

    /// Builds the URI of one list page.
    pub fn page_uri(&self, scope: &Scope, continue_token: Option<&str>) -> Result<Uri, ListError> {
        let base = self.settings.api_server.trim_end_matches('/');
        let path = match scope {
            Scope::AllNamespaces => "/api/v1/pods".to_string(),
            Scope::Namespace(ns) => format!("/api/v1/namespaces/{}/pods", urlencoding::encode(ns)),
        };

        let mut uri = format!("{}{}?limit={}", base, path, self.settings.page_size.max(1));
        if let Some(token) = continue_token {
            uri.push_str("&continue=");
            uri.push_str(&urlencoding::encode(token));
        }

        uri.parse::<Uri>()
            .map_err(|e| ListError::Request(format!("{}: {}", uri, e)))
    }

    async fn bearer_token(&self) -> Result<Option<String>, ListError> {
        let Some(path) = self.settings.token_file.as_ref() else {
            return Ok(None);
        };
        match tokio::fs::read_to_string(path).await {
            Ok(token) => Ok(Some(token.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !self.settings.token_required => {
                Ok(None)
            }
            Err(source) => Err(ListError::Token {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    async fn fetch_page(&self, uri: Uri, token: Option<&str>) -> Result<PodList, ListError> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = builder
            .body(empty_body())
            .map_err(|e| ListError::Request(e.to_string()))?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| ListError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ListError::Transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            let mut text = String::from_utf8_lossy(&body).into_owned();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(ListError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_slice::<PodList>(&body)?)
    }

    async fn list_pages(&self, scope: &Scope) -> Result<Vec<Pod>, ListError> {
        let token = self.bearer_token().await?;

        let mut pods = Vec::new();
        let mut continue_token: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let uri = self.page_uri(scope, continue_token.as_deref())?;
            let page = self.fetch_page(uri, token.as_deref()).await?;
            pages += 1;
            pods.extend(page.items);

            match page.metadata.continue_token {
                Some(next) if !next.is_empty() => continue_token = Some(next),
                _ => break,
            }
        }

        debug!(
            component = "pod_lister",
            event = "listed",
            scope = %scope,
            pods = pods.len(),
            pages = pages,
            "pods listed"
        );

        Ok(pods)
    }
}

#[async_trait::async_trait]
impl PodLister for ApiServerPodLister {
    /// Lists every page of the scope. `timeout` bounds the whole listing,
    /// not each page.
    async fn list(&self, scope: &Scope) -> Result<Vec<Pod>, ListError> {
        let deadline = self.settings.timeout;
        timeout(deadline, self.list_pages(scope))
            .await
            .map_err(|_| ListError::Timeout(deadline))?
    }
}
