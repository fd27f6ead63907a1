// Kubernetes integration: pod enumeration.

pub mod pod;
