//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{HazardEvent, LifecycleEvent, SyncEvent, SyncKind};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Scalar temperature sync payloads
    Temperature,
    /// Modifier chain sync payloads
    Modifiers,
    /// Hypothermia / hyperthermia reports
    Hazard,
    /// Tracking, sleep, respawn and rejected modifier adds
    Lifecycle,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Temperature,
        Topic::Modifiers,
        Topic::Hazard,
        Topic::Lifecycle,
    ];

    const fn index(self) -> usize {
        match self {
            Topic::Temperature => 0,
            Topic::Modifiers => 1,
            Topic::Hazard => 2,
            Topic::Lifecycle => 3,
        }
    }
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Sync(SyncEvent),
    Hazard(HazardEvent),
    Lifecycle(LifecycleEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Sync(sync) => match sync.kind {
                SyncKind::Temperatures => Topic::Temperature,
                SyncKind::Modifiers => Topic::Modifiers,
            },
            Event::Hazard(_) => Topic::Hazard,
            Event::Lifecycle(_) => Topic::Lifecycle,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels for every topic exist from construction,
/// so publishing and subscribing never block.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<[broadcast::Sender<Event>; 4]>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Topic::ALL.map(|_| broadcast::channel(capacity).0)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels[topic.index()].send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::bus", "No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels[topic.index()].subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels[topic.index()].receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermal_core::EntityId;

    #[tokio::test]
    async fn events_only_reach_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);
        let mut hazards = bus.subscribe(Topic::Hazard);

        bus.publish(Event::Lifecycle(LifecycleEvent::Untracked {
            entity: EntityId(9),
        }));

        let event = lifecycle.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Lifecycle);
        assert!(hazards.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(Topic::Temperature), 0);
        bus.publish(Event::Lifecycle(LifecycleEvent::Respawned {
            entity: EntityId(1),
        }));
    }
}
