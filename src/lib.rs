pub mod adapters;
pub mod controllers;
pub mod core;
pub mod input;
pub mod presenters;
pub mod server;

pub use adapters::http::client::HttpBackend;
pub use adapters::local::local_backend::LocalBackend;
pub use adapters::router::BackendRouter;
pub use controllers::streaming::{
    ComputeBackend, CoordinatorConfig, DeliveryError, DeliveryEvent, DisplaySink, RenderParams,
    StreamingCoordinator,
};
pub use crate::core::actions::dispatch::dispatch::{ResultStream, dispatch};
pub use crate::core::data::frame_buffer::FrameBuffer;
pub use crate::core::data::render_request::{RenderMode, RenderRequest, ValidationError};
pub use crate::core::data::viewport::Viewport;
pub use presenters::channel::channel_sink::ChannelSink;
pub use presenters::file::png::write_png;
pub use server::worker_server::WorkerServer;
