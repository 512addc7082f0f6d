use crate::controllers::streaming::errors::{DeliveryError, ProtocolError};
use crate::core::actions::cancellation::CancelSignal;
use crate::core::data::render_request::{RenderMode, RenderRequest};
use crate::core::data::rendered_rows::RenderedRows;

/// Something that can answer one single-response render request.
///
/// The coordinator only sends image/pixel requests and single-row line
/// requests. Implementations should give up early once `cancel` fires, but the
/// coordinator never relies on it: late results are discarded on arrival.
pub trait ComputeBackend: Send + Sync {
    fn compute(
        &self,
        method: &str,
        request: &RenderRequest,
        cancel: &CancelSignal,
    ) -> Result<RenderedRows, DeliveryError>;
}

/// Checks that a response has the shape `request` asked for.
pub fn check_response_shape(
    request: &RenderRequest,
    rows: &RenderedRows,
) -> Result<(), ProtocolError> {
    if request.mode == RenderMode::Line && request.row_index.is_some() && rows.height != 1 {
        return Err(ProtocolError::UnexpectedRowHeight(rows.height));
    }

    let expected_height = request.rows_per_response();
    if rows.width != request.width || rows.height != expected_height {
        return Err(ProtocolError::UnexpectedDimensions {
            expected_width: request.width,
            expected_height,
            actual_width: rows.width,
            actual_height: rows.height,
        });
    }

    if !rows.has_consistent_len() {
        return Err(ProtocolError::DataLength {
            expected: rows.expected_len().unwrap_or(usize::MAX),
            actual: rows.data.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::viewport::Viewport;

    fn line_request() -> RenderRequest {
        RenderRequest::image(Viewport::default(), 3, 4, 10).for_row(2)
    }

    fn rows(width: u32, height: u32, len: usize) -> RenderedRows {
        RenderedRows {
            row_start: 2,
            width,
            height,
            data: vec![0; len],
        }
    }

    #[test]
    fn test_well_formed_row_passes() {
        assert_eq!(check_response_shape(&line_request(), &rows(3, 1, 12)), Ok(()));
    }

    #[test]
    fn test_line_response_must_be_one_row() {
        assert_eq!(
            check_response_shape(&line_request(), &rows(3, 2, 24)),
            Err(ProtocolError::UnexpectedRowHeight(2))
        );
    }

    #[test]
    fn test_image_response_must_match_frame() {
        let request = RenderRequest::image(Viewport::default(), 3, 4, 10);

        assert_eq!(check_response_shape(&request, &rows(3, 4, 48)), Ok(()));
        assert!(matches!(
            check_response_shape(&request, &rows(4, 4, 64)),
            Err(ProtocolError::UnexpectedDimensions { .. })
        ));
    }

    #[test]
    fn test_truncated_data_is_rejected() {
        assert_eq!(
            check_response_shape(&line_request(), &rows(3, 1, 11)),
            Err(ProtocolError::DataLength {
                expected: 12,
                actual: 11
            })
        );
    }
}
