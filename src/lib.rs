#[path = "k8s/probe/liveness/mod.rs"]
pub mod liveness;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod app;
pub mod config;
pub mod controller;
pub mod http;
pub mod k8s;
pub mod metrics;
pub mod metrics_runtime;
pub mod middleware;
pub mod sampler;
pub mod shutdown;
