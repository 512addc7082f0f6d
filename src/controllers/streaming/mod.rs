//! Streaming render coordinator.
//!
//! Turns parameter changes from a control surface into render sessions and
//! delivers their results, row by row or as whole frames, to a display sink.
//!
//! # Architecture
//!
//! - **Input**: `RenderParams` snapshots submitted to `StreamingCoordinator`
//! - **Output**: `DisplaySink` receiving `DeliveryEvent`s
//! - **Compute**: any `ComputeBackend`, local or remote, picked by the
//!   request's method selector

mod call_pool;
mod coordinator;
pub mod data;
pub mod errors;
pub mod events;
pub mod ports;
pub mod session;
mod throttle;

pub use coordinator::StreamingCoordinator;
pub use data::coordinator_config::CoordinatorConfig;
pub use data::render_params::RenderParams;
pub use errors::{DeliveryError, NetworkError, ProtocolError};
pub use events::DeliveryEvent;
pub use ports::{ComputeBackend, DisplaySink};
