use crate::core::data::complex::Complex;
use crate::core::data::render_request::{RenderRequest, ValidationError};
use crate::core::data::viewport::Viewport;
use crate::core::util::map_pixel::map_pixel;

pub const ESCAPE_RADIUS_SQUARED: f64 = 4.0;

/// Counts how many steps of `z ← z² + c`, seeded with `z = c`, stay inside
/// the escape radius.
///
/// Returns the index of the step at which `|z|` first exceeded 2, or `bound`
/// if it never did. The result is always within `0..=bound`.
#[inline]
#[must_use]
pub fn iterate(re: f64, im: f64, bound: u32) -> u32 {
    let c = Complex::new(re, im);
    let mut z = c;

    for iteration in 0..bound {
        z = z * z + c;
        if z.magnitude_squared() > ESCAPE_RADIUS_SQUARED {
            return iteration;
        }
    }

    bound
}

/// Escape-time evaluation for every pixel of one frame geometry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EscapeTimeAlgorithm {
    viewport: Viewport,
    width: u32,
    height: u32,
    iteration_bound: u32,
}

impl EscapeTimeAlgorithm {
    pub fn new(
        viewport: Viewport,
        width: u32,
        height: u32,
        iteration_bound: u32,
    ) -> Result<Self, ValidationError> {
        RenderRequest::image(viewport, width, height, iteration_bound).validate()?;

        Ok(Self {
            viewport,
            width,
            height,
            iteration_bound,
        })
    }

    pub fn for_request(request: &RenderRequest) -> Result<Self, ValidationError> {
        request.validate()?;

        Self::new(
            request.viewport,
            request.width,
            request.height,
            request.iteration_bound,
        )
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
    pub fn iteration_bound(&self) -> u32 {
        self.iteration_bound
    }

    #[inline]
    #[must_use]
    pub fn compute(&self, px: u32, py: u32) -> u32 {
        let c = map_pixel(px, py, self.width, self.height, &self.viewport);
        iterate(c.real, c.imag, self.iteration_bound)
    }
}
