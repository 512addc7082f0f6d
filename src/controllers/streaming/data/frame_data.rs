use std::time::Duration;

use crate::controllers::streaming::errors::DeliveryError;
use crate::core::data::frame_buffer::FrameBuffer;
use crate::core::data::render_request::RenderMode;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStarted {
    pub generation: u64,
    pub width: u32,
    pub height: u32,
    pub mode: RenderMode,
}

/// Rows accepted into the current session's buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsDelivered {
    pub generation: u64,
    pub row_start: u32,
    pub row_count: u32,
    pub data: Vec<u8>,
    pub rows_received: u32,
    pub total_rows: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub generation: u64,
    pub frame: FrameBuffer,
    pub render_duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderError {
    pub generation: u64,
    pub error: DeliveryError,
    pub keep_previous_frame: bool,
}
