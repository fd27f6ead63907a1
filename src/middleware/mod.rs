// HTTP middlewares.

pub mod middleware;
pub mod recover_middleware;
