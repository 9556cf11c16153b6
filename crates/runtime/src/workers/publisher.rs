//! Bridges core sync messages onto the event bus.

use thermal_core::{SyncMessage, SyncPublisher};
use tracing::warn;

use crate::events::{Event, EventBus, SyncEvent};

/// Encodes each message with bincode and publishes it on its sync topic.
pub(crate) struct BusPublisher<'a> {
    pub bus: &'a EventBus,
    pub tick: u64,
}

impl SyncPublisher for BusPublisher<'_> {
    fn publish(&self, message: SyncMessage) {
        match SyncEvent::encode(&message, self.tick) {
            Ok(event) => self.bus.publish(Event::Sync(event)),
            Err(error) => warn!(
                target: "runtime::worker",
                entity = %message.entity,
                error = %error,
                "Failed to encode sync payload"
            ),
        }
    }
}
