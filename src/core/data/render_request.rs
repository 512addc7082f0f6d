use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::data::frame_buffer::frame_size_in_bytes;
use crate::core::data::pixel_colour::BYTES_PER_PIXEL;
use crate::core::data::viewport::Viewport;

/// Iteration bound used when a caller does not supply one.
pub const DEFAULT_ITERATION_BOUND: u32 = 100;

/// Largest frame a request may describe, in RGBA bytes (an 8192x8192 frame).
pub const MAX_FRAME_BYTES: usize = 256 * 1024 * 1024;

/// Delivery granularity of a render.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Pixel,
    Line,
    #[default]
    Image,
}

impl RenderMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pixel => "pixel",
            Self::Line => "line",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown render mode `{0}` (expected pixel, line or image)")]
pub struct UnknownRenderMode(pub String);

impl FromStr for RenderMode {
    type Err = UnknownRenderMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pixel" => Ok(Self::Pixel),
            "line" => Ok(Self::Line),
            "image" => Ok(Self::Image),
            other => Err(UnknownRenderMode(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("a {width}x{height} frame exceeds the {max_bytes}-byte frame limit")]
    FrameTooLarge {
        width: u32,
        height: u32,
        max_bytes: usize,
    },
    #[error("zoom must be a positive finite number, got {0}")]
    NonPositiveZoom(f64),
    #[error("iteration bound must be at least 1, got {0}")]
    InvalidIterationBound(i64),
    #[error("row index {row} is outside an image of height {height}")]
    RowIndexOutOfRange { row: i64, height: u32 },
    #[error("a row index is only meaningful in line mode, not {0} mode")]
    UnexpectedRowIndex(RenderMode),
    #[error("line mode over a single-response transport requires a row index")]
    MissingRowIndex,
}

/// One immutable render attempt: what to draw, at which size, delivered how.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderRequest {
    pub viewport: Viewport,
    pub width: u32,
    pub height: u32,
    pub iteration_bound: u32,
    pub mode: RenderMode,
    pub row_index: Option<u32>,
}

impl RenderRequest {
    #[must_use]
    pub fn image(viewport: Viewport, width: u32, height: u32, iteration_bound: u32) -> Self {
        Self {
            viewport,
            width,
            height,
            iteration_bound,
            mode: RenderMode::Image,
            row_index: None,
        }
    }

    #[must_use]
    pub fn with_mode(self, mode: RenderMode) -> Self {
        Self {
            mode,
            row_index: None,
            ..self
        }
    }

    /// The single-row line request for row `y` of this frame.
    #[must_use]
    pub fn for_row(self, y: u32) -> Self {
        Self {
            mode: RenderMode::Line,
            row_index: Some(y),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.width == 0 || self.height == 0 {
            return Err(ValidationError::InvalidDimensions {
                width: i64::from(self.width),
                height: i64::from(self.height),
            });
        }

        if !matches!(frame_size_in_bytes(self.width, self.height), Some(bytes) if bytes <= MAX_FRAME_BYTES) {
            return Err(ValidationError::FrameTooLarge {
                width: self.width,
                height: self.height,
                max_bytes: MAX_FRAME_BYTES,
            });
        }

        if !self.viewport.has_valid_zoom() {
            return Err(ValidationError::NonPositiveZoom(self.viewport.zoom));
        }

        if self.iteration_bound == 0 {
            return Err(ValidationError::InvalidIterationBound(0));
        }

        match (self.mode, self.row_index) {
            (RenderMode::Line, Some(row)) if row >= self.height => {
                Err(ValidationError::RowIndexOutOfRange {
                    row: i64::from(row),
                    height: self.height,
                })
            }
            (RenderMode::Line, _) | (_, None) => Ok(()),
            (mode, Some(_)) => Err(ValidationError::UnexpectedRowIndex(mode)),
        }
    }

    /// Number of rows one response to this request carries.
    #[must_use]
    pub fn rows_per_response(&self) -> u32 {
        match (self.mode, self.row_index) {
            (RenderMode::Line, Some(_)) => 1,
            _ => self.height,
        }
    }

    #[must_use]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RenderRequest {
        RenderRequest::image(Viewport::default(), 4, 3, 10)
    }

    #[test]
    fn test_valid_request_passes() {
        assert_eq!(valid_request().validate(), Ok(()));
        assert_eq!(valid_request().with_mode(RenderMode::Line).validate(), Ok(()));
        assert_eq!(valid_request().for_row(2).validate(), Ok(()));
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let request = RenderRequest {
            width: 0,
            ..valid_request()
        };

        assert_eq!(
            request.validate(),
            Err(ValidationError::InvalidDimensions {
                width: 0,
                height: 3
            })
        );
    }

    #[test]
    fn test_oversized_frames_are_rejected() {
        let largest = RenderRequest::image(Viewport::default(), 8192, 8192, 10);
        assert_eq!(largest.validate(), Ok(()));

        for (width, height) in [(8192, 8193), (u32::MAX, 1), (u32::MAX, u32::MAX)] {
            let request = RenderRequest::image(Viewport::default(), width, height, 10);

            assert_eq!(
                request.for_row(0).validate(),
                Err(ValidationError::FrameTooLarge {
                    width,
                    height,
                    max_bytes: MAX_FRAME_BYTES
                }),
                "{width}x{height}"
            );
        }
    }

    #[test]
    fn test_non_positive_zoom_is_rejected() {
        let request = RenderRequest {
            viewport: Viewport::new(0.0, 0.0, -0.5),
            ..valid_request()
        };

        assert_eq!(
            request.validate(),
            Err(ValidationError::NonPositiveZoom(-0.5))
        );
    }

    #[test]
    fn test_zero_iteration_bound_is_rejected() {
        let request = RenderRequest {
            iteration_bound: 0,
            ..valid_request()
        };

        assert_eq!(
            request.validate(),
            Err(ValidationError::InvalidIterationBound(0))
        );
    }

    #[test]
    fn test_row_index_must_be_inside_image() {
        assert_eq!(
            valid_request().for_row(3).validate(),
            Err(ValidationError::RowIndexOutOfRange { row: 3, height: 3 })
        );
    }

    #[test]
    fn test_row_index_outside_line_mode_is_rejected() {
        let request = RenderRequest {
            row_index: Some(0),
            ..valid_request()
        };

        assert_eq!(
            request.validate(),
            Err(ValidationError::UnexpectedRowIndex(RenderMode::Image))
        );
    }

    #[test]
    fn test_mode_parses_from_wire_names() {
        assert_eq!("line".parse::<RenderMode>(), Ok(RenderMode::Line));
        assert_eq!(RenderMode::Pixel.to_string(), "pixel");
        assert!("tile".parse::<RenderMode>().is_err());
    }

    #[test]
    fn test_rows_per_response() {
        assert_eq!(valid_request().rows_per_response(), 3);
        assert_eq!(valid_request().for_row(1).rows_per_response(), 1);
    }
}
