//! Event types for different topics.

use serde::{Deserialize, Serialize};

use thermal_core::{
    Channel, EntityId, Hazard, SleepVerdict, SyncMessage, SyncPayload, SyncTarget, TrackedKind,
};

/// Which half of the sync protocol an encoded payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncKind {
    Temperatures,
    Modifiers,
}

/// A [`SyncMessage`] with its payload encoded for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    pub entity: EntityId,
    pub target: SyncTarget,
    pub kind: SyncKind,
    /// Simulation tick the payload was collected on.
    pub tick: u64,
    /// bincode-encoded [`SyncPayload`].
    pub payload: Vec<u8>,
}

impl SyncEvent {
    pub fn encode(message: &SyncMessage, tick: u64) -> bincode::Result<Self> {
        let kind = match message.payload {
            SyncPayload::Temperatures { .. } => SyncKind::Temperatures,
            SyncPayload::Modifiers { .. } => SyncKind::Modifiers,
        };
        Ok(Self {
            entity: message.entity,
            target: message.target,
            kind,
            tick,
            payload: bincode::serialize(&message.payload)?,
        })
    }

    pub fn decode(&self) -> bincode::Result<SyncPayload> {
        bincode::deserialize(&self.payload)
    }
}

/// Body temperature crossed the damage threshold this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardEvent {
    pub entity: EntityId,
    pub hazard: Hazard,
    pub body: f64,
    pub tick: u64,
}

/// Tracking and gameplay milestones of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Tracked {
        entity: EntityId,
        kind: TrackedKind,
    },
    Untracked {
        entity: EntityId,
    },
    /// Default modifiers were seeded and the world scalar settled.
    Initialized {
        entity: EntityId,
        modifiers: usize,
        world: f64,
    },
    Respawned {
        entity: EntityId,
    },
    Cloned {
        from: EntityId,
        to: EntityId,
        was_death: bool,
    },
    SleepChecked {
        entity: EntityId,
        verdict: SleepVerdict,
    },
    SleepFinished {
        entity: EntityId,
        core: f64,
    },
    /// A modifier add was refused by a hook or the modifier registry.
    ModifierRejected {
        entity: EntityId,
        channel: Channel,
        id: String,
        reason: String,
    },
}

impl LifecycleEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Tracked { entity, .. }
            | Self::Untracked { entity }
            | Self::Initialized { entity, .. }
            | Self::Respawned { entity }
            | Self::SleepChecked { entity, .. }
            | Self::SleepFinished { entity, .. }
            | Self::ModifierRejected { entity, .. } => *entity,
            Self::Cloned { to, .. } => *to,
        }
    }
}
