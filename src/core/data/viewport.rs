use serde::{Deserialize, Serialize};

use crate::core::data::complex::Complex;

/// Centre and zoom of the region of the complex plane shown in a frame.
///
/// At zoom `1.0` the frame spans `[-1, 1)` around the centre on both axes;
/// each doubling of zoom halves the span.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    #[must_use]
    pub const fn new(center_x: f64, center_y: f64, zoom: f64) -> Self {
        Self {
            center_x,
            center_y,
            zoom,
        }
    }

    #[must_use]
    pub fn center(&self) -> Complex {
        Complex::new(self.center_x, self.center_y)
    }

    /// Width (and height) of the visible region in complex-plane units.
    #[must_use]
    pub fn span(&self) -> f64 {
        2.0 / self.zoom
    }

    #[must_use]
    pub fn has_valid_zoom(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0
    }

    /// Moves the centre as if the image had been dragged by `(dx, dy)` pixels.
    #[must_use]
    pub fn panned_by(&self, dx: f64, dy: f64, width: u32, height: u32) -> Self {
        Self {
            center_x: self.center_x - (dx / f64::from(width)) * self.span(),
            center_y: self.center_y - (dy / f64::from(height)) * self.span(),
            zoom: self.zoom,
        }
    }

    /// Applies an additive zoom step such as one wheel notch.
    ///
    /// The result is not clamped; a non-positive zoom is rejected when the
    /// request is dispatched.
    #[must_use]
    pub fn zoomed_by(&self, delta: f64) -> Self {
        Self {
            zoom: self.zoom + delta,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unit_zoom_at_origin() {
        let viewport = Viewport::default();

        assert_eq!(viewport.center(), Complex::new(0.0, 0.0));
        assert_eq!(viewport.span(), 2.0);
    }

    #[test]
    fn test_drag_right_moves_centre_left() {
        let viewport = Viewport::new(0.0, 0.0, 2.0);

        let panned = viewport.panned_by(100.0, -50.0, 400, 200);

        // span is 1.0 at zoom 2
        assert_eq!(panned.center_x, -0.25);
        assert_eq!(panned.center_y, 0.25);
        assert_eq!(panned.zoom, 2.0);
    }

    #[test]
    fn test_zoom_step_is_additive() {
        let viewport = Viewport::new(0.5, -0.5, 1.0);

        let zoomed = viewport.zoomed_by(0.5).zoomed_by(-0.25);

        assert_eq!(zoomed.zoom, 1.25);
        assert_eq!(zoomed.center(), viewport.center());
    }

    #[test]
    fn test_zoom_validity() {
        assert!(Viewport::new(0.0, 0.0, 0.1).has_valid_zoom());
        assert!(!Viewport::new(0.0, 0.0, 0.0).has_valid_zoom());
        assert!(!Viewport::new(0.0, 0.0, -1.0).has_valid_zoom());
        assert!(!Viewport::new(0.0, 0.0, f64::NAN).has_valid_zoom());
        assert!(!Viewport::new(0.0, 0.0, f64::INFINITY).has_valid_zoom());
    }
}
