use crate::core::data::frame_buffer::frame_size_in_bytes;

/// A contiguous block of rendered rows, as produced by one compute call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRows {
    pub row_start: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderedRows {
    #[must_use]
    pub fn row_end(&self) -> u32 {
        self.row_start.saturating_add(self.height)
    }

    /// `None` when the claimed dimensions overflow.
    #[must_use]
    pub fn expected_len(&self) -> Option<usize> {
        frame_size_in_bytes(self.width, self.height)
    }

    #[must_use]
    pub fn has_consistent_len(&self) -> bool {
        self.expected_len() == Some(self.data.len())
    }

    /// Appends `next`, which must start where `self` ends.
    pub(crate) fn extend(&mut self, next: RenderedRows) {
        debug_assert_eq!(self.row_end(), next.row_start);
        debug_assert_eq!(self.width, next.width);

        self.height += next.height;
        self.data.extend(next.data);
    }
}
