// HTTP module: server and outbound clients.

pub mod client;
pub mod server;

pub use crate::middleware::middleware::Middleware;

// Re-export server types
pub use server::{HttpServer, Server};

// Common controller interface
pub use crate::controller::controller::Controller;
