// Shared test support code for scenario tests.

pub mod endpoint;
pub mod pods;
pub mod prober;

pub use endpoint::{unreachable_port, ProbeEndpoint};
pub use pods::{pod, FlakyLister, HttpProbeSpec, StaticLister};
pub use prober::RecordingProber;
