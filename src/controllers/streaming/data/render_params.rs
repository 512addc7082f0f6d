use crate::core::data::render_request::{
    DEFAULT_ITERATION_BOUND, RenderMode, RenderRequest, ValidationError,
};
use crate::core::data::viewport::Viewport;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_METHOD: &str = "local";

/// Snapshot of everything the control surface can change.
///
/// `PartialEq` drives change detection: an unchanged value does not start a
/// new session.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub viewport: Viewport,
    pub width: u32,
    pub height: u32,
    pub iteration_bound: u32,
    pub mode: RenderMode,
    /// Backend selector, opaque to the coordinator.
    pub method: String,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            iteration_bound: DEFAULT_ITERATION_BOUND,
            mode: RenderMode::default(),
            method: DEFAULT_METHOD.to_owned(),
        }
    }
}

impl RenderParams {
    /// The whole-frame request these parameters describe.
    pub fn to_request(&self) -> Result<RenderRequest, ValidationError> {
        let request = RenderRequest::image(
            self.viewport,
            self.width,
            self.height,
            self.iteration_bound,
        )
        .with_mode(self.mode);

        request.validate()?;
        Ok(request)
    }
}
