use std::ops::Range;

use rayon::prelude::*;

use crate::core::actions::cancellation::{CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, Cancelled};
use crate::core::actions::render_rows::ports::colour_map::ColourMap;
use crate::core::data::pixel_colour::BYTES_PER_PIXEL;
use crate::core::fractals::escape_time::algorithm::EscapeTimeAlgorithm;
use crate::core::fractals::escape_time::colour_map::GreyscaleColourMap;

/// Renders rows `rows` of the frame described by `algorithm` as RGBA bytes.
///
/// Rows are computed in parallel on the rayon pool; each row owns a disjoint
/// slice of the output, so the result is identical to a sequential pass.
#[must_use]
pub fn render_rows(algorithm: &EscapeTimeAlgorithm, rows: Range<u32>) -> Vec<u8> {
    let colour_map = GreyscaleColourMap::new(algorithm.iteration_bound());

    render_rows_with(algorithm, &colour_map, rows)
}

/// [`render_rows`] with an explicit colour map.
#[must_use]
pub fn render_rows_with<M: ColourMap>(
    algorithm: &EscapeTimeAlgorithm,
    colour_map: &M,
    rows: Range<u32>,
) -> Vec<u8> {
    let (mut buffer, row_bytes) = row_buffer(algorithm, &rows);

    if !buffer.is_empty() {
        buffer
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(offset, row)| {
                let y = rows.start + offset as u32;

                for (x, pixel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                    render_pixel(algorithm, colour_map, x as u32, y, pixel);
                }
            });
    }

    buffer
}

#[must_use]
pub fn render_image(algorithm: &EscapeTimeAlgorithm) -> Vec<u8> {
    render_rows(algorithm, 0..algorithm.height())
}

#[must_use]
pub fn render_line(algorithm: &EscapeTimeAlgorithm, y: u32) -> Vec<u8> {
    render_rows(algorithm, y..y + 1)
}

/// Like [`render_rows`], but polls `cancel` at the start of every row and
/// every [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels within a row.
pub fn render_rows_cancelable<M, C>(
    algorithm: &EscapeTimeAlgorithm,
    colour_map: &M,
    rows: Range<u32>,
    cancel: &C,
) -> Result<Vec<u8>, Cancelled>
where
    M: ColourMap,
    C: CancelToken,
{
    let (mut buffer, row_bytes) = row_buffer(algorithm, &rows);

    if buffer.is_empty() {
        return Ok(buffer);
    }

    buffer
        .par_chunks_mut(row_bytes)
        .enumerate()
        .try_for_each(|(offset, row)| {
            let y = rows.start + offset as u32;

            for (x, pixel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                if x % CANCEL_CHECK_INTERVAL_PIXELS == 0 && cancel.is_cancelled() {
                    return Err(Cancelled);
                }

                render_pixel(algorithm, colour_map, x as u32, y, pixel);
            }

            Ok(())
        })?;

    Ok(buffer)
}

/// A zeroed buffer for `rows` and the byte length of one row. The algorithm
/// was validated, so the size fits the frame limit.
fn row_buffer(algorithm: &EscapeTimeAlgorithm, rows: &Range<u32>) -> (Vec<u8>, usize) {
    debug_assert!(rows.end <= algorithm.height(), "row range exceeds frame height");

    let row_bytes = algorithm.width() as usize * BYTES_PER_PIXEL;
    let row_count = rows.end.saturating_sub(rows.start) as usize;

    (vec![0u8; row_bytes * row_count], row_bytes)
}

fn render_pixel<M: ColourMap>(
    algorithm: &EscapeTimeAlgorithm,
    colour_map: &M,
    x: u32,
    y: u32,
    pixel: &mut [u8],
) {
    let iterations = algorithm.compute(x, y);
    pixel.copy_from_slice(&colour_map.map(iterations).to_rgba());
}
