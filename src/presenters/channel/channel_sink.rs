use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::controllers::streaming::events::DeliveryEvent;
use crate::controllers::streaming::ports::DisplaySink;

/// Forwards delivery events to whoever holds the receiving end, e.g. a UI
/// loop that drains them between frames.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<DeliveryEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn new() -> (Self, Receiver<DeliveryEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl DisplaySink for ChannelSink {
    fn present(&self, event: DeliveryEvent) {
        // nobody is listening any more; the event has no audience
        let _ = self.sender.send(event);
    }
}
