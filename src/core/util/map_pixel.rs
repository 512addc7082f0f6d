use crate::core::data::complex::Complex;
use crate::core::data::viewport::Viewport;

/// Maps pixel `(px, py)` of a `width`×`height` frame onto the complex plane.
///
/// `width` and `height` must be non-zero and `viewport.zoom` positive; both are
/// checked when a request is validated, not here.
#[inline]
#[must_use]
pub fn map_pixel(px: u32, py: u32, width: u32, height: u32, viewport: &Viewport) -> Complex {
    let real = (f64::from(px) / f64::from(width) - 0.5) * 2.0 / viewport.zoom + viewport.center_x;
    let imag = (f64::from(py) / f64::from(height) - 0.5) * 2.0 / viewport.zoom + viewport.center_y;

    Complex { real, imag }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_pixel_maps_to_lower_corner() {
        let result = map_pixel(0, 0, 100, 100, &Viewport::default());

        assert_eq!(result, Complex::new(-1.0, -1.0));
    }

    #[test]
    fn test_middle_pixel_maps_to_centre() {
        let viewport = Viewport::new(-0.75, 0.1, 1.0);

        let result = map_pixel(50, 50, 100, 100, &viewport);

        assert_eq!(result, viewport.center());
    }

    #[test]
    fn test_zoom_shrinks_the_span() {
        let viewport = Viewport::new(0.0, 0.0, 4.0);

        let result = map_pixel(0, 0, 10, 10, &viewport);

        assert_eq!(result, Complex::new(-0.25, -0.25));
    }

    #[test]
    fn test_axes_scale_independently() {
        // wide frame: x uses width, y uses height
        let result = map_pixel(1, 1, 2, 4, &Viewport::default());

        assert_eq!(result, Complex::new(0.0, -0.5));
    }

    #[test]
    fn test_single_pixel_frame_maps_to_lower_corner() {
        let viewport = Viewport::new(1.0, 2.0, 2.0);

        let result = map_pixel(0, 0, 1, 1, &viewport);

        assert_eq!(result, Complex::new(0.5, 1.5));
    }
}
