// Route registration seam of the exporter's HTTP surface.

use axum::Router;

/// Controller owns one or more exporter endpoints.
///
/// `HttpServer` folds every controller into a single router, in the order
/// they are listed by `ExporterServer`:
/// ```rust
/// # use axum::{Router, routing::get};
/// # async fn scrape() -> &'static str { "# HELP ...\n" }
/// let router: Router<()> = Router::new().route("/metrics", get(scrape));
/// # let _ = router;
/// ```
pub trait Controller: Send + Sync {
    /// Registers this controller's routes on `router`.
    fn add_route(&self, router: Router) -> Router;
}
