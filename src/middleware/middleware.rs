// Router-wide request layers.

use axum::Router;

/// Middleware wraps every exporter route at once.
pub trait Middleware: Send + Sync {
    fn apply(&self, router: Router) -> Router;
}
