//! Boundaries between the coordinator and the outside world: where results
//! come from and where they are shown.

pub mod compute_backend;
pub mod display_sink;

pub use compute_backend::ComputeBackend;
pub use display_sink::DisplaySink;
