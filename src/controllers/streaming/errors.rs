use std::time::Duration;

use thiserror::Error;

use crate::core::actions::cancellation::Cancelled;
use crate::core::data::frame_buffer::FrameBufferError;
use crate::core::data::render_request::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("compute endpoint returned status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("compute call timed out after {0:?}")]
    Timeout(Duration),
    #[error("no compute backend is registered for `{0}`")]
    UnknownBackend(String),
}

impl NetworkError {
    /// Transient failures worth another attempt. A timeout is not one: it
    /// aborts the session the same way supersession does.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { code, .. } => *code >= 500,
            Self::Timeout(_) | Self::UnknownBackend(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("line response must be one row high, got {0}")]
    UnexpectedRowHeight(u32),
    #[error("response is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    UnexpectedDimensions {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("response carries {actual} bytes of pixel data, expected {expected}")]
    DataLength { expected: usize, actual: usize },
    #[error("unsupported response content type `{0}`")]
    UnsupportedContentType(String),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("response does not fit the frame: {0}")]
    Frame(#[from] FrameBufferError),
}

/// Every way a render session can end without a complete frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryError {
    #[error("invalid render request: {0}")]
    Validation(#[from] ValidationError),
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("operation cancelled")]
    Cancelled,
}

impl From<Cancelled> for DeliveryError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl DeliveryError {
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Network failures leave the last good frame on screen; validation and
    /// protocol failures replace it.
    #[must_use]
    pub fn keeps_previous_frame(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(error) if error.is_retryable())
    }
}
