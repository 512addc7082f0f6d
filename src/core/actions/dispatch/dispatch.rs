use std::ops::Range;

use crate::core::actions::cancellation::{CancelToken, Cancelled};
use crate::core::actions::render_rows::render_rows::{render_rows_cancelable, render_rows_with};
use crate::core::data::render_request::{RenderMode, RenderRequest, ValidationError};
use crate::core::data::rendered_rows::RenderedRows;
use crate::core::fractals::escape_time::algorithm::EscapeTimeAlgorithm;
use crate::core::fractals::escape_time::colour_map::GreyscaleColourMap;

#[derive(Debug, Clone)]
enum Plan {
    /// One event covering the whole frame.
    Whole(Option<Range<u32>>),
    /// One event per row, in increasing order.
    PerRow(Range<u32>),
}

/// Lazily computed results of a dispatched request.
///
/// Each event is rendered when it is pulled, so dropping the stream part-way
/// abandons the remaining rows without computing them.
#[derive(Debug, Clone)]
pub struct ResultStream {
    algorithm: EscapeTimeAlgorithm,
    colour_map: GreyscaleColourMap,
    plan: Plan,
}

/// Validates `request` and plans its result events.
///
/// - image / pixel mode: one event with the whole frame
/// - line mode without a row index: `height` events, one per row
/// - line mode with a row index: one event with that row
///
/// Nothing is computed if validation fails.
pub fn dispatch(request: &RenderRequest) -> Result<ResultStream, ValidationError> {
    let algorithm = EscapeTimeAlgorithm::for_request(request)?;

    let plan = match (request.mode, request.row_index) {
        (RenderMode::Image | RenderMode::Pixel, _) => Plan::Whole(Some(0..request.height)),
        (RenderMode::Line, None) => Plan::PerRow(0..request.height),
        (RenderMode::Line, Some(row)) => Plan::PerRow(row..row + 1),
    };

    Ok(ResultStream {
        algorithm,
        colour_map: GreyscaleColourMap::new(request.iteration_bound),
        plan,
    })
}

impl ResultStream {
    /// Pulls the next event, abandoning it if `cancel` fires mid-render.
    pub fn next_cancelable<C: CancelToken>(
        &mut self,
        cancel: &C,
    ) -> Option<Result<RenderedRows, Cancelled>> {
        let rows = self.next_range()?;

        if cancel.is_cancelled() {
            return Some(Err(Cancelled));
        }

        let (row_start, height) = (rows.start, rows.end - rows.start);
        Some(
            render_rows_cancelable(&self.algorithm, &self.colour_map, rows, cancel)
                .map(|data| self.rendered(row_start, height, data)),
        )
    }

    fn next_range(&mut self) -> Option<Range<u32>> {
        match &mut self.plan {
            Plan::Whole(range) => range.take(),
            Plan::PerRow(range) => range.next().map(|y| y..y + 1),
        }
    }

    fn rendered(&self, row_start: u32, height: u32, data: Vec<u8>) -> RenderedRows {
        RenderedRows {
            row_start,
            width: self.algorithm.width(),
            height,
            data,
        }
    }

    /// Drains the stream into a single contiguous block of rows.
    pub fn collect_rows<C: CancelToken>(mut self, cancel: &C) -> Result<RenderedRows, Cancelled> {
        let mut collected: Option<RenderedRows> = None;

        while let Some(event) = self.next_cancelable(cancel) {
            let rows = event?;
            match collected.as_mut() {
                Some(block) => block.extend(rows),
                None => collected = Some(rows),
            }
        }

        // validation guarantees at least one row, so at least one event
        Ok(collected.unwrap_or(RenderedRows {
            row_start: 0,
            width: self.algorithm.width(),
            height: 0,
            data: Vec::new(),
        }))
    }
}

impl Iterator for ResultStream {
    type Item = RenderedRows;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.next_range()?;
        let (row_start, height) = (rows.start, rows.end - rows.start);
        let data = render_rows_with(&self.algorithm, &self.colour_map, rows);

        Some(self.rendered(row_start, height, data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.plan {
            Plan::Whole(range) => usize::from(range.is_some()),
            Plan::PerRow(range) => range.len(),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ResultStream {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::cancellation::NeverCancel;
    use crate::core::actions::render_rows::render_rows::{render_image, render_line};
    use crate::core::data::frame_buffer::FrameBuffer;
    use crate::core::data::pixel_colour::PixelColour;
    use crate::core::data::viewport::Viewport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(mode: RenderMode) -> RenderRequest {
        RenderRequest::image(Viewport::new(-0.6, 0.2, 1.3), 9, 6, 32).with_mode(mode)
    }

    fn algorithm_for(request: &RenderRequest) -> EscapeTimeAlgorithm {
        EscapeTimeAlgorithm::for_request(request).unwrap()
    }

    #[test]
    fn test_image_mode_emits_one_whole_frame() {
        let request = request(RenderMode::Image);

        let events: Vec<RenderedRows> = dispatch(&request).unwrap().collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].row_start, 0);
        assert_eq!(events[0].height, 6);
        assert_eq!(events[0].data, render_image(&algorithm_for(&request)));
    }

    #[test]
    fn test_pixel_mode_behaves_like_image_mode() {
        let pixel: Vec<RenderedRows> = dispatch(&request(RenderMode::Pixel)).unwrap().collect();
        let image: Vec<RenderedRows> = dispatch(&request(RenderMode::Image)).unwrap().collect();

        assert_eq!(pixel, image);
    }

    #[test]
    fn test_line_mode_emits_rows_in_order() {
        let request = request(RenderMode::Line);
        let algorithm = algorithm_for(&request);

        let stream = dispatch(&request).unwrap();
        assert_eq!(stream.len(), 6);

        for (y, event) in stream.enumerate() {
            assert_eq!(event.row_start, y as u32);
            assert_eq!(event.height, 1);
            assert_eq!(event.data, render_line(&algorithm, y as u32));
        }
    }

    #[test]
    fn test_line_mode_with_row_index_emits_that_row() {
        let request = request(RenderMode::Line).for_row(4);

        let events: Vec<RenderedRows> = dispatch(&request).unwrap().collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].row_start, 4);
        assert_eq!(events[0].data, render_line(&algorithm_for(&request), 4));
    }

    #[test]
    fn test_streamed_rows_assemble_to_the_whole_image() {
        let image = dispatch(&request(RenderMode::Image)).unwrap().next().unwrap();
        let mut frame = FrameBuffer::new(9, 6).unwrap();

        for event in dispatch(&request(RenderMode::Line)).unwrap() {
            frame.write_rows(event.row_start, &event.data).unwrap();
        }

        assert_eq!(frame.data(), image.data.as_slice());
    }

    #[test]
    fn test_collect_rows_merges_line_events() {
        let whole = dispatch(&request(RenderMode::Image))
            .unwrap()
            .collect_rows(&NeverCancel)
            .unwrap();
        let merged = dispatch(&request(RenderMode::Line))
            .unwrap()
            .collect_rows(&NeverCancel)
            .unwrap();

        assert_eq!(merged, whole);
    }

    #[test]
    fn test_repeated_dispatch_is_identical() {
        let first: Vec<RenderedRows> = dispatch(&request(RenderMode::Line)).unwrap().collect();
        let second: Vec<RenderedRows> = dispatch(&request(RenderMode::Line)).unwrap().collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_request_fails_before_any_work() {
        let invalid = RenderRequest {
            height: 0,
            ..request(RenderMode::Line)
        };

        assert!(matches!(
            dispatch(&invalid),
            Err(ValidationError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            dispatch(&RenderRequest {
                viewport: Viewport::new(0.0, 0.0, 0.0),
                ..request(RenderMode::Image)
            }),
            Err(ValidationError::NonPositiveZoom(_))
        ));
        assert!(matches!(
            dispatch(&RenderRequest {
                iteration_bound: 0,
                ..request(RenderMode::Image)
            }),
            Err(ValidationError::InvalidIterationBound(0))
        ));
    }

    #[test]
    fn test_oversized_frame_is_rejected_before_allocating() {
        let huge_line = RenderRequest::image(Viewport::default(), u32::MAX, u32::MAX, 10).for_row(0);

        assert!(matches!(
            dispatch(&huge_line),
            Err(ValidationError::FrameTooLarge { width: u32::MAX, .. })
        ));
    }

    #[test]
    fn test_cancellation_stops_the_stream() {
        let polls = AtomicUsize::new(0);
        // allow the first row's checks, then cancel
        let cancel_token = || polls.fetch_add(1, Ordering::Relaxed) >= 2;
        let mut stream = dispatch(&request(RenderMode::Line)).unwrap();

        assert!(matches!(stream.next_cancelable(&cancel_token), Some(Ok(_))));
        assert!(matches!(
            stream.next_cancelable(&cancel_token),
            Some(Err(Cancelled))
        ));
    }

    #[test]
    fn test_real_axis_pixels_inside_the_set_are_black() {
        // row 1 of a 2x2 frame at unit zoom maps to (-1, 0) and (0, 0)
        let request = RenderRequest::image(Viewport::default(), 2, 2, 50).for_row(1);

        let event = dispatch(&request).unwrap().next().unwrap();

        assert_eq!(
            event.data,
            [PixelColour::BLACK.to_rgba(), PixelColour::BLACK.to_rgba()].concat()
        );
    }
}
