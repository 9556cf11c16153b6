//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Sync payloads travel bincode-encoded so observers can
//! forward them without re-serializing.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{HazardEvent, LifecycleEvent, SyncEvent, SyncKind};
