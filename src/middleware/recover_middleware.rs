//! Panic recovery middleware.
//

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// PanicRecoverMiddleware turns a panicking handler into a 500 response.
#[derive(Default)]
pub struct PanicRecoverMiddleware;

impl PanicRecoverMiddleware {
    /// Creates a new panic recovery middleware.
    pub fn new() -> Self {
        Self
    }
}

// For use as axum middleware
pub async fn panic_recover_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            crate::metrics::add_panics(1);
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                component = "http",
                event = "handler_panicked",
                path = %path,
                reason = %reason,
                "recovered from handler panic"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error\n").into_response()
        }
    }
}

// Implementation of Middleware trait
impl crate::middleware::middleware::Middleware for PanicRecoverMiddleware {
    fn apply(&self, router: axum::Router) -> axum::Router {
        router.layer(axum::middleware::from_fn(panic_recover_middleware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::middleware::Middleware;
    use axum::{body::Body, http, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        async fn boom() -> &'static str {
            panic!("boom")
        }
        let router = PanicRecoverMiddleware::new().apply(Router::new().route("/boom", get(boom)));

        let resp = router
            .oneshot(http::Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = http_body_util::BodyExt::collect(resp.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&body[..], b"internal server error\n");
    }
}
