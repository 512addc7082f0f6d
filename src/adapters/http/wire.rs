use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::controllers::streaming::errors::ProtocolError;
use crate::controllers::streaming::ports::compute_backend::check_response_shape;
use crate::core::data::render_request::{
    DEFAULT_ITERATION_BOUND, RenderMode, RenderRequest, ValidationError,
};
use crate::core::data::rendered_rows::RenderedRows;
use crate::core::data::viewport::Viewport;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Parameters of one compute call, shared by the query string and the JSON
/// body of the compute endpoint.
///
/// Integers are kept signed and wide so that out-of-range values reach
/// validation instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub mode: RenderMode,
    pub width: i64,
    pub height: i64,
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_idx: Option<i64>,
    /// Older spelling of `line_idx`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
}

impl ComputeQuery {
    #[must_use]
    pub fn from_request(method: Option<&str>, request: &RenderRequest) -> Self {
        Self {
            method: method.map(str::to_owned),
            mode: request.mode,
            width: i64::from(request.width),
            height: i64::from(request.height),
            center_x: request.viewport.center_x,
            center_y: request.viewport.center_y,
            zoom: request.viewport.zoom,
            iterations: Some(i64::from(request.iteration_bound)),
            line_idx: request.row_index.map(i64::from),
            line: None,
        }
    }

    /// Converts to a validated request. A row index outside line mode is
    /// ignored; line mode without one is rejected.
    pub fn into_request(self) -> Result<RenderRequest, ValidationError> {
        let invalid_dimensions = || ValidationError::InvalidDimensions {
            width: self.width,
            height: self.height,
        };
        let width = u32::try_from(self.width).map_err(|_| invalid_dimensions())?;
        let height = u32::try_from(self.height).map_err(|_| invalid_dimensions())?;

        let iteration_bound = match self.iterations {
            None => DEFAULT_ITERATION_BOUND,
            Some(bound) => u32::try_from(bound)
                .map_err(|_| ValidationError::InvalidIterationBound(bound))?,
        };

        let request = RenderRequest::image(
            Viewport::new(self.center_x, self.center_y, self.zoom),
            width,
            height,
            iteration_bound,
        )
        .with_mode(self.mode);

        let request = match (self.mode, self.line_idx.or(self.line)) {
            (RenderMode::Line, None) => return Err(ValidationError::MissingRowIndex),
            (RenderMode::Line, Some(row)) => {
                let row = u32::try_from(row)
                    .map_err(|_| ValidationError::RowIndexOutOfRange { row, height })?;
                request.for_row(row)
            }
            _ => request,
        };

        request.validate()?;
        Ok(request)
    }
}

/// JSON response body: flat RGBA bytes, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl From<RenderedRows> for WireFrame {
    fn from(rows: RenderedRows) -> Self {
        Self {
            width: rows.width,
            height: rows.height,
            data: rows.data,
        }
    }
}

/// Decodes a compute response body and checks it answers `request`.
pub fn decode_response(
    content_type: &str,
    body: &[u8],
    request: &RenderRequest,
) -> Result<RenderedRows, ProtocolError> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let frame = match media_type.as_str() {
        JSON_CONTENT_TYPE => serde_json::from_slice::<WireFrame>(body)
            .map_err(|err| ProtocolError::MalformedBody(err.to_string()))?,
        PNG_CONTENT_TYPE => {
            let image = image::load_from_memory_with_format(body, ImageFormat::Png)
                .map_err(|err| ProtocolError::MalformedBody(err.to_string()))?
                .into_rgba8();
            WireFrame {
                width: image.width(),
                height: image.height(),
                data: image.into_raw(),
            }
        }
        _ => return Err(ProtocolError::UnsupportedContentType(content_type.to_owned())),
    };

    let row_start = match (request.mode, request.row_index) {
        (RenderMode::Line, Some(y)) => y,
        _ => 0,
    };
    let rows = RenderedRows {
        row_start,
        width: frame.width,
        height: frame.height,
        data: frame.data,
    };

    check_response_shape(request, &rows)?;
    Ok(rows)
}

pub fn encode_png(rows: &RenderedRows) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        &rows.data,
        rows.width,
        rows.height,
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}
