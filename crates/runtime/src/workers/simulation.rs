//! Simulation worker that owns the tick loop.
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), mutates
//! tracked state in the [`StateRegistry`], runs deferred tasks, and publishes
//! sync payloads, hazards and lifecycle events to the EventBus.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use thermal_core::rules::{self, InsulationChange, SleepVerdict};
use thermal_core::{
    Addition, Channel, EntityId, InsertOutcome, Modifier, ModifierChain, ModifierId,
    ModifierMatch, Position, Rejection, TaskId, TaskQueue, TrackedKind,
};

use super::publisher::BusPublisher;
use crate::api::{EntityUpdate, Result, RuntimeError};
use crate::events::{Event, EventBus, HazardEvent, LifecycleEvent};
use crate::hooks::{HookContext, HookRegistry};
use crate::oracle::OracleManager;
use crate::registry::{SharedRegistry, StateRegistry, TrackedEntity};

/// Work queued to run on a later tick.
#[derive(Debug, Clone)]
pub enum Deferred {
    /// Seed default modifiers and settle the world scalar.
    InitModifiers(EntityId),
    /// Add a registered modifier at the end of a chain.
    AddModifier {
        entity: EntityId,
        channel: Channel,
        id: ModifierId,
    },
    /// Remove every modifier with this id, subject to hook vetoes.
    RemoveModifier {
        entity: EntityId,
        channel: Channel,
        id: ModifierId,
    },
}

/// Commands that can be sent to the simulation worker
pub enum Command {
    Track {
        entity: EntityId,
        kind: TrackedKind,
        position: Position,
        reply: oneshot::Sender<bool>,
    },
    Untrack {
        entity: EntityId,
        reply: oneshot::Sender<bool>,
    },
    Update {
        entity: EntityId,
        update: EntityUpdate,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Add a modifier built by the modifier registry.
    AddRegistered {
        entity: EntityId,
        channel: Channel,
        id: ModifierId,
        allow_duplicates: bool,
        addition: Addition,
        reply: oneshot::Sender<Result<InsertOutcome>>,
    },
    /// Add a caller-built modifier.
    AddModifier {
        entity: EntityId,
        channel: Channel,
        modifier: Modifier,
        allow_duplicates: bool,
        addition: Addition,
        reply: oneshot::Sender<Result<InsertOutcome>>,
    },
    RemoveModifiers {
        entity: EntityId,
        channel: Channel,
        target: ModifierMatch,
        max: usize,
        reply: oneshot::Sender<Result<usize>>,
    },
    Consume {
        entity: EntityId,
        item: String,
        reply: oneshot::Sender<Result<bool>>,
    },
    Insulation {
        entity: EntityId,
        change: InsulationChange,
        reply: oneshot::Sender<Result<bool>>,
    },
    CheckSleep {
        entity: EntityId,
        reply: oneshot::Sender<Result<SleepVerdict>>,
    },
    FinishSleep {
        entity: EntityId,
        reply: oneshot::Sender<Result<f64>>,
    },
    Respawn {
        entity: EntityId,
        reply: oneshot::Sender<Result<()>>,
    },
    CloneState {
        from: EntityId,
        to: EntityId,
        was_death: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    Schedule {
        delay: u64,
        task: Deferred,
        reply: oneshot::Sender<TaskId>,
    },
    Cancel {
        id: TaskId,
        reply: oneshot::Sender<bool>,
    },
    /// Advance the simulation by one tick; replies with the new tick number.
    Tick { reply: oneshot::Sender<u64> },
}

/// Background task that processes simulation commands.
pub struct SimulationWorker {
    registry: SharedRegistry,
    oracles: OracleManager,
    hooks: HookRegistry,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    tasks: TaskQueue<Deferred>,
    tick: u64,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        registry: SharedRegistry,
        oracles: OracleManager,
        hooks: HookRegistry,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        tracing::info!(
            target: "runtime::worker",
            hooks = hooks.len(),
            registered_modifiers = oracles.modifiers().len(),
            "SimulationWorker initialized"
        );

        Self {
            registry,
            oracles,
            hooks,
            command_rx,
            event_bus,
            tasks: TaskQueue::new(),
            tick: 0,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd).await;
                }
                else => break,
            }
        }
        debug!(target: "runtime::worker", tick = self.tick, "SimulationWorker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        let registry = Arc::clone(&self.registry);
        let mut registry = registry.lock().await;

        match cmd {
            Command::Track {
                entity,
                kind,
                position,
                reply,
            } => {
                let tracked = self.track(&mut registry, entity, kind, position);
                respond(reply, tracked, "Track");
            }
            Command::Untrack { entity, reply } => {
                let removed = registry.untrack(entity).is_some();
                if removed {
                    self.publish(LifecycleEvent::Untracked { entity });
                }
                respond(reply, removed, "Untrack");
            }
            Command::Update {
                entity,
                update,
                reply,
            } => {
                let result = tracked(&mut registry, entity).map(|t| apply_update(t, update));
                respond(reply, result, "Update");
            }
            Command::AddRegistered {
                entity,
                channel,
                id,
                allow_duplicates,
                addition,
                reply,
            } => {
                let result = tracked(&mut registry, entity).map(|t| {
                    self.add_registered(entity, t, channel, &id, allow_duplicates, &addition)
                });
                respond(reply, result, "AddRegistered");
            }
            Command::AddModifier {
                entity,
                channel,
                modifier,
                allow_duplicates,
                addition,
                reply,
            } => {
                let result = tracked(&mut registry, entity).map(|t| {
                    self.add_with_hooks(entity, t, channel, modifier, allow_duplicates, &addition)
                });
                respond(reply, result, "AddModifier");
            }
            Command::RemoveModifiers {
                entity,
                channel,
                target,
                max,
                reply,
            } => {
                let result = tracked(&mut registry, entity)
                    .map(|t| self.remove_with_hooks(entity, t, channel, &target, max));
                respond(reply, result, "RemoveModifiers");
            }
            Command::Consume {
                entity,
                item,
                reply,
            } => {
                let config = self.oracles.config();
                let result = tracked(&mut registry, entity)
                    .map(|t| rules::on_consumed(&mut t.state, &item, config));
                respond(reply, result, "Consume");
            }
            Command::Insulation {
                entity,
                change,
                reply,
            } => {
                let result = tracked(&mut registry, entity)
                    .map(|t| rules::on_insulation_effect(&mut t.state, change));
                respond(reply, result, "Insulation");
            }
            Command::CheckSleep { entity, reply } => {
                let config = self.oracles.config();
                let result = tracked(&mut registry, entity)
                    .map(|t| rules::check_sleep(&t.state, config, t.resistance));
                if let Ok(verdict) = result {
                    self.publish(LifecycleEvent::SleepChecked { entity, verdict });
                }
                respond(reply, result, "CheckSleep");
            }
            Command::FinishSleep { entity, reply } => {
                let result = self.finish_sleep(&mut registry, entity);
                respond(reply, result, "FinishSleep");
            }
            Command::Respawn { entity, reply } => {
                let result = self.respawn(&mut registry, entity);
                respond(reply, result, "Respawn");
            }
            Command::CloneState {
                from,
                to,
                was_death,
                reply,
            } => {
                let result = self.clone_state(&mut registry, from, to, was_death);
                respond(reply, result, "CloneState");
            }
            Command::Schedule { delay, task, reply } => {
                let id = self.tasks.schedule(self.tick, delay, task);
                respond(reply, id, "Schedule");
            }
            Command::Cancel { id, reply } => {
                let cancelled = self.tasks.cancel(id).is_some();
                respond(reply, cancelled, "Cancel");
            }
            Command::Tick { reply } => {
                let tick = self.run_tick(&mut registry);
                respond(reply, tick, "Tick");
            }
        }
    }

    fn track(
        &mut self,
        registry: &mut StateRegistry,
        entity: EntityId,
        kind: TrackedKind,
        position: Position,
    ) -> bool {
        if !registry.track(entity, kind, position) {
            debug!(target: "runtime::worker", entity = %entity, "Entity already tracked");
            return false;
        }
        self.tasks.schedule(self.tick, 1, Deferred::InitModifiers(entity));
        self.publish(LifecycleEvent::Tracked { entity, kind });
        true
    }

    /// Advances every tracked entity by one tick.
    ///
    /// Deferred tasks due this tick run first, so modifiers seeded for a newly
    /// tracked entity take part in its first tick.
    fn run_tick(&mut self, registry: &mut StateRegistry) -> u64 {
        self.tick += 1;

        for task in self.tasks.poll(self.tick) {
            self.run_deferred(registry, task);
        }

        for (entity, tracked) in registry.iter_mut() {
            self.tick_entity(entity, tracked);
        }

        trace!(
            target: "runtime::worker",
            tick = self.tick,
            entities = registry.len(),
            pending_tasks = self.tasks.len(),
            "Tick complete"
        );
        self.tick
    }

    fn tick_entity(&self, entity: EntityId, tracked: &mut TrackedEntity) {
        let config = self.oracles.config();
        tracked.age += 1;
        let age = tracked.age;

        if let Some(frozen) = rules::thaw(&tracked.conditions, age) {
            tracked.conditions.ticks_frozen = frozen;
        }
        rules::apply_conditions(&mut tracked.state, &tracked.conditions, age);
        rules::apply_mount(&mut tracked.state, tracked.mount.as_ref(), config, age);

        let ctx = self.oracles.context(entity, tracked.position, age);
        let stacks = self.oracles.attributes().stacks(entity);
        let report = tracked.state.tick(&ctx, &stacks);

        if !report.evicted.is_empty() {
            trace!(
                target: "runtime::worker",
                entity = %entity,
                channels = ?report.evicted,
                "Expired modifiers evicted"
            );
        }
        if let Some(hazard) = report.hazard {
            self.event_bus.publish(Event::Hazard(HazardEvent {
                entity,
                hazard,
                body: report.body,
                tick: self.tick,
            }));
        }

        let publisher = BusPublisher {
            bus: &self.event_bus,
            tick: self.tick,
        };
        tracked.notifier.flush(
            entity,
            tracked.kind,
            &mut tracked.state,
            age,
            config,
            &publisher,
        );
    }

    fn run_deferred(&self, registry: &mut StateRegistry, task: Deferred) {
        let entity = match &task {
            Deferred::InitModifiers(entity)
            | Deferred::AddModifier { entity, .. }
            | Deferred::RemoveModifier { entity, .. } => *entity,
        };
        let Some(tracked) = registry.get_mut(entity) else {
            debug!(
                target: "runtime::worker",
                entity = %entity,
                task = ?task,
                "Dropping deferred task for untracked entity"
            );
            return;
        };

        match task {
            Deferred::InitModifiers(entity) => self.init_modifiers(entity, tracked),
            Deferred::AddModifier {
                entity,
                channel,
                id,
            } => {
                self.add_registered(entity, tracked, channel, &id, false, &Addition::at_end());
            }
            Deferred::RemoveModifier {
                entity,
                channel,
                id,
            } => {
                let target = ModifierMatch::Id(id);
                self.remove_with_hooks(entity, tracked, channel, &target, usize::MAX);
            }
        }
    }

    fn init_modifiers(&self, entity: EntityId, tracked: &mut TrackedEntity) {
        let modifiers = rules::init_default_modifiers(
            &mut tracked.state,
            tracked.kind,
            self.oracles.modifiers(),
            self.oracles.config(),
        );
        let ctx = self.oracles.context(entity, tracked.position, tracked.age);
        let world = match rules::settle_world(&mut tracked.state, &ctx) {
            Ok(world) => world,
            Err(error) => {
                warn!(
                    target: "runtime::worker",
                    entity = %entity,
                    error = %error,
                    "Failed to settle world temperature"
                );
                return;
            }
        };
        debug!(
            target: "runtime::worker",
            entity = %entity,
            modifiers,
            world,
            "Default modifiers initialized"
        );
        self.publish(LifecycleEvent::Initialized {
            entity,
            modifiers,
            world,
        });
    }

    fn add_registered(
        &self,
        entity: EntityId,
        tracked: &mut TrackedEntity,
        channel: Channel,
        id: &ModifierId,
        allow_duplicates: bool,
        addition: &Addition,
    ) -> InsertOutcome {
        match self.oracles.modifiers().create(id) {
            Some(modifier) => {
                self.add_with_hooks(entity, tracked, channel, modifier, allow_duplicates, addition)
            }
            None => {
                warn!(
                    target: "runtime::worker",
                    entity = %entity,
                    channel = %channel,
                    modifier = %id,
                    "Unregistered modifier id, skipping"
                );
                self.rejected(entity, channel, id, Rejection::Unregistered)
            }
        }
    }

    fn add_with_hooks(
        &self,
        entity: EntityId,
        tracked: &mut TrackedEntity,
        channel: Channel,
        modifier: Modifier,
        allow_duplicates: bool,
        addition: &Addition,
    ) -> InsertOutcome {
        let ctx = self.hook_context(entity, tracked, channel);
        let id = modifier.id().clone();
        match self.hooks.before_add(&ctx, modifier) {
            Some(modifier) => {
                let outcome = tracked
                    .state
                    .add_modifier(channel, modifier, allow_duplicates, addition);
                if let InsertOutcome::Rejected(Rejection::NoChain) = outcome {
                    return self.rejected(entity, channel, &id, Rejection::NoChain);
                }
                outcome
            }
            None => self.rejected(entity, channel, &id, Rejection::Vetoed),
        }
    }

    fn remove_with_hooks(
        &self,
        entity: EntityId,
        tracked: &mut TrackedEntity,
        channel: Channel,
        target: &ModifierMatch,
        max: usize,
    ) -> usize {
        let ctx = self.hook_context(entity, tracked, channel);
        let hooks = &self.hooks;
        tracked.state.remove_modifiers_vetoed(
            channel,
            max,
            |m| target.matches(m),
            |m| hooks.allow_remove(&ctx, m),
        )
    }

    fn finish_sleep(&self, registry: &mut StateRegistry, entity: EntityId) -> Result<f64> {
        let tracked = tracked(registry, entity)?;
        let core = rules::on_sleep_finished(&mut tracked.state)?;
        tracked.notifier.force_temperatures();
        self.publish(LifecycleEvent::SleepFinished { entity, core });
        Ok(core)
    }

    fn respawn(&mut self, registry: &mut StateRegistry, entity: EntityId) -> Result<()> {
        let tracked = tracked(registry, entity)?;
        rules::respawn(&mut tracked.state);
        tracked.conditions = Default::default();
        tracked.mount = None;
        tracked.notifier.invalidate();
        self.tasks.schedule(self.tick, 1, Deferred::InitModifiers(entity));
        self.publish(LifecycleEvent::Respawned { entity });
        Ok(())
    }

    fn clone_state(
        &mut self,
        registry: &mut StateRegistry,
        from: EntityId,
        to: EntityId,
        was_death: bool,
    ) -> Result<()> {
        let original = tracked(registry, from)?.state.clone();
        let target = tracked(registry, to)?;
        rules::on_clone(&mut target.state, &original, was_death);
        target.notifier.invalidate();
        if was_death {
            self.tasks.schedule(self.tick, 1, Deferred::InitModifiers(to));
        }
        self.publish(LifecycleEvent::Cloned {
            from,
            to,
            was_death,
        });
        Ok(())
    }

    fn hook_context(
        &self,
        entity: EntityId,
        tracked: &TrackedEntity,
        channel: Channel,
    ) -> HookContext {
        HookContext {
            entity,
            kind: tracked.kind,
            channel,
            tick: self.tick,
            chain_len: tracked.state.chain(channel).map_or(0, ModifierChain::len),
        }
    }

    fn rejected(
        &self,
        entity: EntityId,
        channel: Channel,
        id: &ModifierId,
        reason: Rejection,
    ) -> InsertOutcome {
        self.publish(LifecycleEvent::ModifierRejected {
            entity,
            channel,
            id: id.to_string(),
            reason: reason.to_string(),
        });
        InsertOutcome::Rejected(reason)
    }

    fn publish(&self, event: LifecycleEvent) {
        self.event_bus.publish(Event::Lifecycle(event));
    }
}

fn tracked(registry: &mut StateRegistry, entity: EntityId) -> Result<&mut TrackedEntity> {
    registry
        .get_mut(entity)
        .ok_or(RuntimeError::UnknownEntity(entity))
}

fn apply_update(tracked: &mut TrackedEntity, update: EntityUpdate) {
    match update {
        EntityUpdate::Position(position) => tracked.position = position,
        EntityUpdate::Conditions(conditions) => tracked.conditions = conditions,
        EntityUpdate::Mount(mount) => tracked.mount = mount,
        EntityUpdate::Resistance(resistance) => tracked.resistance = resistance,
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "runtime::worker", command, "Reply channel closed (caller dropped)");
    }
}
