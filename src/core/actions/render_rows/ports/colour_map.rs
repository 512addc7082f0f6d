use crate::core::data::pixel_colour::PixelColour;

pub trait ColourMap: Sync {
    fn map(&self, iterations: u32) -> PixelColour;
}
