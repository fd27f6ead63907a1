//! Pod enumeration against the Kubernetes API.

pub mod api_lister;
pub mod lister;
pub mod model;


pub use api_lister::{ApiServerPodLister, ApiServerSettings};
pub use lister::{ListError, PodLister, Scope};
pub use model::Pod;
