pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PixelColour {
    pub const BLACK: Self = Self::grey(0);
    pub const WHITE: Self = Self::grey(255);

    /// Opaque grey with equal channels.
    #[must_use]
    pub const fn grey(intensity: u8) -> Self {
        Self {
            r: intensity,
            g: intensity,
            b: intensity,
            a: 255,
        }
    }

    #[must_use]
    pub const fn to_rgba(self) -> [u8; BYTES_PER_PIXEL] {
        [self.r, self.g, self.b, self.a]
    }

    #[must_use]
    pub fn from_rgba(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [r, g, b, a] => Some(Self {
                r: *r,
                g: *g,
                b: *b,
                a: *a,
            }),
            _ => None,
        }
    }
}
