// Pod enumeration interface.

use std::fmt;

use super::model::Pod;

/// Namespace restriction applied when enumerating pods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    AllNamespaces,
    Namespace(String),
}

impl Scope {
    /// Empty or missing namespace means cluster-wide.
    pub fn from_namespace(ns: Option<&str>) -> Self {
        match ns.map(str::trim) {
            Some(ns) if !ns.is_empty() => Scope::Namespace(ns.to_string()),
            _ => Scope::AllNamespaces,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::AllNamespaces => write!(f, "*"),
            Scope::Namespace(ns) => write!(f, "{}", ns),
        }
    }
}

/// Errors of a single list call. Any of them aborts the sampling cycle.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("invalid pod list request: {0}")]
    Request(String),
    #[error("failed to read service account token {path}: {source}")]
    Token {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("pod list transport error: {0}")]
    Transport(String),
    #[error("pod list timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("pod list rejected by api server: status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode pod list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// PodLister returns the current snapshot of pods in a scope.
#[async_trait::async_trait]
pub trait PodLister: Send + Sync {
    async fn list(&self, scope: &Scope) -> Result<Vec<Pod>, ListError>;
}
