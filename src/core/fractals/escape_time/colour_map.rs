use crate::core::actions::render_rows::ports::colour_map::ColourMap;
use crate::core::data::pixel_colour::PixelColour;

/// Points that escape immediately are white, points that never escape are
/// black, and everything in between is a linear grey ramp.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GreyscaleColourMap {
    iteration_bound: u32,
}

impl GreyscaleColourMap {
    #[must_use]
    pub fn new(iteration_bound: u32) -> Self {
        Self { iteration_bound }
    }

    #[must_use]
    pub fn intensity(&self, iterations: u32) -> u8 {
        let bound = u64::from(self.iteration_bound.max(1));
        let iterations = u64::from(iterations).min(bound);

        (255 - 255 * iterations / bound) as u8
    }
}

impl ColourMap for GreyscaleColourMap {
    #[inline]
    fn map(&self, iterations: u32) -> PixelColour {
        PixelColour::grey(self.intensity(iterations))
    }
}
