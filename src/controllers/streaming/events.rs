use crate::controllers::streaming::data::frame_data::{
    FrameData, RenderError, RowsDelivered, SessionStarted,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryEvent {
    Started(SessionStarted),
    Rows(RowsDelivered),
    Frame(FrameData),
    Error(RenderError),
}

impl DeliveryEvent {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::Started(started) => started.generation,
            Self::Rows(rows) => rows.generation,
            Self::Frame(frame) => frame.generation,
            Self::Error(error) => error.generation,
        }
    }
}
