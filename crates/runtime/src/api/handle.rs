//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! tracking entities, reporting what happens to them, editing modifier chains
//! and streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use thermal_core::{
    Addition, Channel, EntityConditions, EntityId, InsertOutcome, InsulationChange, Modifier,
    ModifierId, ModifierMatch, MountKind, Position, SleepVerdict, TaskId, TempResistance,
    TemperatureSnapshot, TrackedKind,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::oracle::OracleManager;
use crate::registry::SharedRegistry;
use crate::workers::{Command, Deferred};

/// Host observations about a tracked entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityUpdate {
    Position(Position),
    Conditions(EntityConditions),
    Mount(Option<MountKind>),
    Resistance(TempResistance),
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    registry: SharedRegistry,
    oracles: OracleManager,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        registry: SharedRegistry,
        oracles: OracleManager,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            registry,
            oracles,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Starts tracking an entity. Default modifiers are seeded on the next tick.
    ///
    /// Returns false if the entity was already tracked.
    pub async fn track(
        &self,
        entity: EntityId,
        kind: TrackedKind,
        position: Position,
    ) -> Result<bool> {
        self.request(|reply| Command::Track {
            entity,
            kind,
            position,
            reply,
        })
        .await
    }

    pub async fn untrack(&self, entity: EntityId) -> Result<bool> {
        self.request(|reply| Command::Untrack { entity, reply }).await
    }

    pub async fn update(&self, entity: EntityId, update: EntityUpdate) -> Result<()> {
        self.request(|reply| Command::Update {
            entity,
            update,
            reply,
        })
        .await?
    }

    pub async fn move_to(&self, entity: EntityId, position: Position) -> Result<()> {
        self.update(entity, EntityUpdate::Position(position)).await
    }

    pub async fn set_conditions(
        &self,
        entity: EntityId,
        conditions: EntityConditions,
    ) -> Result<()> {
        self.update(entity, EntityUpdate::Conditions(conditions))
            .await
    }

    pub async fn set_resistance(&self, entity: EntityId, resistance: TempResistance) -> Result<()> {
        self.update(entity, EntityUpdate::Resistance(resistance))
            .await
    }

    pub async fn set_mount(&self, entity: EntityId, mount: Option<MountKind>) -> Result<()> {
        self.update(entity, EntityUpdate::Mount(mount)).await
    }

    /// Adds a modifier created by the registry under `id`.
    ///
    /// Unknown ids are logged and come back as `Rejected(Unregistered)`.
    pub async fn add_modifier(
        &self,
        entity: EntityId,
        channel: Channel,
        id: ModifierId,
        addition: Addition,
    ) -> Result<InsertOutcome> {
        self.request(|reply| Command::AddRegistered {
            entity,
            channel,
            id,
            allow_duplicates: false,
            addition,
            reply,
        })
        .await?
    }

    /// Adds a caller-built modifier, bypassing the registry.
    pub async fn insert_modifier(
        &self,
        entity: EntityId,
        channel: Channel,
        modifier: Modifier,
        allow_duplicates: bool,
        addition: Addition,
    ) -> Result<InsertOutcome> {
        self.request(|reply| Command::AddModifier {
            entity,
            channel,
            modifier,
            allow_duplicates,
            addition,
            reply,
        })
        .await?
    }

    /// Removes up to `max` matching modifiers. Hooks may veto individual ones.
    pub async fn remove_modifiers(
        &self,
        entity: EntityId,
        channel: Channel,
        target: ModifierMatch,
        max: usize,
    ) -> Result<usize> {
        self.request(|reply| Command::RemoveModifiers {
            entity,
            channel,
            target,
            max,
            reply,
        })
        .await?
    }

    /// Applies food and soul sprout effects of eating `item`.
    pub async fn consume(&self, entity: EntityId, item: impl Into<String>) -> Result<bool> {
        let item = item.into();
        self.request(|reply| Command::Consume {
            entity,
            item,
            reply,
        })
        .await?
    }

    pub async fn insulation_effect(
        &self,
        entity: EntityId,
        change: InsulationChange,
    ) -> Result<bool> {
        self.request(|reply| Command::Insulation {
            entity,
            change,
            reply,
        })
        .await?
    }

    pub async fn check_sleep(&self, entity: EntityId) -> Result<SleepVerdict> {
        self.request(|reply| Command::CheckSleep { entity, reply })
            .await?
    }

    /// Quarters core temperature and pushes the new values without interpolation.
    pub async fn finish_sleep(&self, entity: EntityId) -> Result<f64> {
        self.request(|reply| Command::FinishSleep { entity, reply })
            .await?
    }

    pub async fn respawn(&self, entity: EntityId) -> Result<()> {
        self.request(|reply| Command::Respawn { entity, reply })
            .await?
    }

    /// Carries state from `from` into `to`; a death clone resets instead.
    pub async fn clone_state(&self, from: EntityId, to: EntityId, was_death: bool) -> Result<()> {
        self.request(|reply| Command::CloneState {
            from,
            to,
            was_death,
            reply,
        })
        .await?
    }

    /// Runs `task` after `delay` ticks.
    pub async fn schedule(&self, delay: u64, task: Deferred) -> Result<TaskId> {
        self.request(|reply| Command::Schedule { delay, task, reply })
            .await
    }

    /// Returns true if the task was still pending.
    pub async fn cancel(&self, id: TaskId) -> Result<bool> {
        self.request(|reply| Command::Cancel { id, reply }).await
    }

    /// Advances the simulation by one tick and returns the new tick number.
    pub async fn tick(&self) -> Result<u64> {
        self.request(|reply| Command::Tick { reply }).await
    }

    /// Snapshot of an entity's state; untracked entities read as fresh state.
    pub async fn snapshot(&self, entity: EntityId) -> TemperatureSnapshot {
        self.registry.lock().await.snapshot(entity)
    }

    pub async fn temperature(&self, entity: EntityId, channel: Channel) -> f64 {
        self.registry.lock().await.value(entity, channel)
    }

    pub async fn is_tracked(&self, entity: EntityId) -> bool {
        self.registry.lock().await.contains(entity)
    }

    /// World temperature at a position, independent of any tracked entity.
    pub fn temperature_at(&self, position: Position) -> f64 {
        self.oracles.temperature_at(position)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Temperature` - Scalar sync payloads
    /// - `Topic::Modifiers` - Modifier chain sync payloads
    /// - `Topic::Hazard` - Hypothermia / hyperthermia
    /// - `Topic::Lifecycle` - Tracking, sleep, respawn and rejected adds
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut hazards = handle.subscribe(Topic::Hazard);
    /// while let Ok(event) = hazards.recv().await {
    ///     // Apply damage
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }
}
