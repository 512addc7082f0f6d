use std::path::Path;

use image::{ExtendedColorType, ImageResult};

use crate::core::data::frame_buffer::FrameBuffer;

/// Writes `frame` as an RGBA PNG at `filepath`.
pub fn write_png(frame: &FrameBuffer, filepath: impl AsRef<Path>) -> ImageResult<()> {
    image::save_buffer_with_format(
        filepath,
        frame.data(),
        frame.width(),
        frame.height(),
        ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
}
