//! Tracked entity state, keyed by entity id.
//!
//! The registry is the only owner of [`TemperatureState`] in the runtime. The
//! simulation worker mutates it under the lock once per tick and per command;
//! handles take the same lock for read-only snapshots, so inserts, evictions
//! and reads are serialized.
use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use thermal_core::{
    Channel, ChangeNotifier, EntityConditions, EntityId, MountKind, Position, TempResistance,
    TemperatureSnapshot, TemperatureState, TrackedKind,
};

pub type SharedRegistry = Arc<Mutex<StateRegistry>>;

/// Everything the runtime keeps per tracked entity.
#[derive(Clone, Debug)]
pub struct TrackedEntity {
    pub kind: TrackedKind,
    pub position: Position,
    /// Ticks since the entity started being tracked.
    pub age: u64,
    pub conditions: EntityConditions,
    pub mount: Option<MountKind>,
    pub resistance: TempResistance,
    pub state: TemperatureState,
    pub(crate) notifier: ChangeNotifier,
}

impl TrackedEntity {
    pub fn new(kind: TrackedKind, position: Position) -> Self {
        Self {
            kind,
            position,
            age: 0,
            conditions: EntityConditions::default(),
            mount: None,
            resistance: TempResistance::default(),
            state: TemperatureState::new(),
            notifier: ChangeNotifier::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StateRegistry {
    entities: BTreeMap<EntityId, TrackedEntity>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    /// Starts tracking `entity`. Returns false if it was already tracked.
    pub fn track(&mut self, entity: EntityId, kind: TrackedKind, position: Position) -> bool {
        if self.entities.contains_key(&entity) {
            return false;
        }
        self.entities
            .insert(entity, TrackedEntity::new(kind, position));
        true
    }

    pub fn untrack(&mut self, entity: EntityId) -> Option<TrackedEntity> {
        self.entities.remove(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&TrackedEntity> {
        self.entities.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut TrackedEntity> {
        self.entities.get_mut(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &TrackedEntity)> {
        self.entities.iter().map(|(id, tracked)| (*id, tracked))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut TrackedEntity)> {
        self.entities.iter_mut().map(|(id, tracked)| (*id, tracked))
    }

    /// Snapshot of an entity's state. Untracked entities read as a fresh
    /// default state.
    pub fn snapshot(&self, entity: EntityId) -> TemperatureSnapshot {
        match self.entities.get(&entity) {
            Some(tracked) => tracked.state.snapshot(),
            None => TemperatureState::new().snapshot(),
        }
    }

    /// One channel of an entity's state; untracked entities read 0.0.
    pub fn value(&self, entity: EntityId, channel: Channel) -> f64 {
        self.entities
            .get(&entity)
            .map_or(0.0, |tracked| tracked.state.get(channel))
    }
}
