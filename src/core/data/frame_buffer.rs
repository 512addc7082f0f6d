use thiserror::Error;

use crate::core::data::pixel_colour::{BYTES_PER_PIXEL, PixelColour};

/// RGBA bytes needed for a `width` x `height` frame, `None` on overflow.
#[must_use]
pub fn frame_size_in_bytes(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameBufferError {
    #[error("a {width}x{height} frame does not fit in memory")]
    TooLarge { width: u32, height: u32 },
    #[error("frame of {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("rows {row_start}..{row_end} fall outside a frame of height {height}")]
    RowsOutOfBounds {
        row_start: u32,
        row_end: u32,
        height: u32,
    },
    #[error("row data of {actual} bytes is not a whole number of {row_bytes}-byte rows")]
    PartialRow { row_bytes: usize, actual: usize },
    #[error("pixel at x:{x}, y:{y} outside of a {width}x{height} frame")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Row-major RGBA frame. The default is an empty 0x0 frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// A fully transparent frame.
    pub fn new(width: u32, height: u32) -> Result<Self, FrameBufferError> {
        let size = frame_size_in_bytes(width, height)
            .ok_or(FrameBufferError::TooLarge { width, height })?;

        Ok(Self {
            width,
            height,
            data: vec![0; size],
        })
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameBufferError> {
        let expected = frame_size_in_bytes(width, height)
            .ok_or(FrameBufferError::TooLarge { width, height })?;

        if expected != data.len() {
            return Err(FrameBufferError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }

        let start = y as usize * self.row_bytes();
        Some(&self.data[start..start + self.row_bytes()])
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<PixelColour> {
        if x >= self.width {
            return None;
        }

        let start = x as usize * BYTES_PER_PIXEL;
        self.row(y)
            .and_then(|row| PixelColour::from_rgba(&row[start..start + BYTES_PER_PIXEL]))
    }

    /// Copies whole rows into place starting at row `row_start`.
    ///
    /// The destination offset depends only on `row_start`, so rows may be
    /// written in any order.
    pub fn write_rows(&mut self, row_start: u32, rows: &[u8]) -> Result<(), FrameBufferError> {
        let row_bytes = self.row_bytes();

        if rows.len() % row_bytes != 0 {
            return Err(FrameBufferError::PartialRow {
                row_bytes,
                actual: rows.len(),
            });
        }

        let row_count = (rows.len() / row_bytes) as u32;
        let row_end = row_start.saturating_add(row_count);

        if row_end > self.height {
            return Err(FrameBufferError::RowsOutOfBounds {
                row_start,
                row_end,
                height: self.height,
            });
        }

        let offset = row_start as usize * row_bytes;
        self.data[offset..offset + rows.len()].copy_from_slice(rows);

        Ok(())
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, colour: PixelColour) -> Result<(), FrameBufferError> {
        if x >= self.width || y >= self.height {
            return Err(FrameBufferError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        let index = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.data[index..index + BYTES_PER_PIXEL].copy_from_slice(&colour.to_rgba());

        Ok(())
    }
}
