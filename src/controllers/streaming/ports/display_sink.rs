use crate::controllers::streaming::events::DeliveryEvent;

pub trait DisplaySink: Send + Sync {
    fn present(&self, event: DeliveryEvent);
}
