//! Scripted session: a player and a creature living through a fixed day.
//!
//! The script reports host observations at fixed ticks the way a game server
//! would (falling into water, riding a minecart, eating, sleeping) and
//! collects a JSON report of the final state.
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use runtime::hooks::ProtectModifiersHook;
use runtime::{Event, LifecycleEvent, OracleManager, Runtime, RuntimeHandle, Topic};
use thermal_content::ContentFactory;
use thermal_core::{
    EntityConditions, EntityId, InsulationChange, ModifierId, MountKind, Position, SleepVerdict,
    TemperatureSnapshot, TrackedKind,
};

use crate::config::CliConfig;

pub const PLAYER: EntityId = EntityId(1);
pub const CREATURE: EntityId = EntityId(2);

const PLAYER_SPAWN: Position = Position::new(40.0, 80.0, 40.0);
const CREATURE_SPAWN: Position = Position::new(-40.0, 80.0, -40.0);

/// A host observation reported at a fixed tick.
#[derive(Clone, Debug)]
enum Beat {
    Water(bool),
    Mount(Option<MountKind>),
    Eat(&'static str),
    Insulate(InsulationChange),
    MoveTo(EntityId, Position),
    Sleep,
    Respawn(EntityId),
}

fn script() -> Vec<(u64, Beat)> {
    vec![
        (10, Beat::Water(true)),
        (25, Beat::Water(false)),
        (30, Beat::Mount(Some(MountKind::InsulatedMinecart))),
        (50, Beat::Mount(None)),
        (55, Beat::Eat("chilled_berries")),
        (60, Beat::MoveTo(PLAYER, Position::new(105.0, 65.0, 105.0))),
        (
            70,
            Beat::Insulate(InsulationChange::Added {
                amplifier: 1,
                duration: 200,
            }),
        ),
        (85, Beat::Sleep),
        (100, Beat::Respawn(CREATURE)),
    ]
}

/// Final state of one entity.
#[derive(Debug, Serialize)]
pub struct EntityReport {
    pub entity: EntityId,
    pub kind: TrackedKind,
    pub body: f64,
    pub snapshot: TemperatureSnapshot,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub tick: u64,
    pub data_dir: String,
    pub events: BTreeMap<String, u64>,
    pub entities: Vec<EntityReport>,
}

/// Runs the scripted session and returns the final report.
pub async fn run(config: &CliConfig) -> Result<Report> {
    let factory = match &config.data_dir {
        Some(dir) => ContentFactory::new(dir),
        None => ContentFactory::bundled(),
    };
    let oracles = OracleManager::from_content(&factory).context("loading content")?;

    let runtime = Runtime::builder()
        .config(config.runtime.clone())
        .oracles(oracles)
        .hook(ProtectModifiersHook::new([ModifierId::builtin("biome")]))
        .build()
        .await?;
    let handle = runtime.handle();

    let loggers: Vec<_> = Topic::ALL
        .iter()
        .map(|topic| spawn_logger(*topic, handle.subscribe(*topic)))
        .collect();

    handle
        .track(PLAYER, TrackedKind::Player, PLAYER_SPAWN)
        .await?;
    handle
        .track(CREATURE, TrackedKind::Creature, CREATURE_SPAWN)
        .await?;

    let mut beats = script().into_iter().peekable();
    let mut interval = config.paced().then(|| {
        let mut interval = tokio::time::interval(config.runtime.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval
    });
    let mut tick = 0;
    while tick < config.ticks {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        while let Some((_, beat)) = beats.next_if(|(at, _)| *at <= tick) {
            play(&handle, beat).await?;
        }
        tick = runtime.step().await?;
    }

    let mut entities = Vec::new();
    for (entity, kind) in [(PLAYER, TrackedKind::Player), (CREATURE, TrackedKind::Creature)] {
        let snapshot = handle.snapshot(entity).await;
        entities.push(EntityReport {
            entity,
            kind,
            body: snapshot.body(),
            snapshot,
        });
    }

    drop(handle);
    runtime.shutdown().await?;

    let mut events = BTreeMap::new();
    for (topic, logger) in Topic::ALL.iter().zip(loggers) {
        events.insert(format!("{topic:?}").to_lowercase(), logger.await?);
    }

    Ok(Report {
        tick,
        data_dir: factory.data_dir().display().to_string(),
        events,
        entities,
    })
}

async fn play(handle: &RuntimeHandle, beat: Beat) -> Result<()> {
    info!(target: "cli::scenario", ?beat, "Playing beat");
    match beat {
        Beat::Water(in_water) => {
            let conditions = EntityConditions {
                in_water,
                ..EntityConditions::default()
            };
            handle.set_conditions(PLAYER, conditions).await?;
        }
        Beat::Mount(mount) => handle.set_mount(PLAYER, mount).await?,
        Beat::Eat(item) => {
            handle.consume(PLAYER, item).await?;
        }
        Beat::Insulate(change) => {
            handle.insulation_effect(PLAYER, change).await?;
        }
        Beat::MoveTo(entity, position) => handle.move_to(entity, position).await?,
        Beat::Sleep => match handle.check_sleep(PLAYER).await? {
            SleepVerdict::Allowed => {
                let core = handle.finish_sleep(PLAYER).await?;
                info!(target: "cli::scenario", core, "Player slept through the night");
            }
            SleepVerdict::Prevented(problem) => {
                info!(target: "cli::scenario", ?problem, "Player could not sleep");
            }
        },
        Beat::Respawn(entity) => handle.respawn(entity).await?,
    }
    Ok(())
}

/// Logs every event of one topic until the bus closes; returns how many it saw.
fn spawn_logger(topic: Topic, mut rx: broadcast::Receiver<Event>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut seen = 0;
        loop {
            match rx.recv().await {
                Ok(event) => {
                    seen += 1;
                    log_event(&event);
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(target: "cli::events", ?topic, missed, "Event logger lagged");
                    seen += missed;
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    })
}

fn log_event(event: &Event) {
    match event {
        Event::Hazard(hazard) => {
            info!(
                target: "cli::events",
                entity = hazard.entity.0,
                hazard = %hazard.hazard,
                body = hazard.body,
                tick = hazard.tick,
                "Temperature hazard"
            );
        }
        Event::Lifecycle(LifecycleEvent::ModifierRejected {
            entity,
            channel,
            id,
            reason,
        }) => {
            warn!(
                target: "cli::events",
                entity = entity.0,
                %channel,
                id = id.as_str(),
                reason = reason.as_str(),
                "Modifier rejected"
            );
        }
        Event::Lifecycle(lifecycle) => {
            info!(target: "cli::events", ?lifecycle, "Lifecycle");
        }
        Event::Sync(sync) => match sync.decode() {
            Ok(message) => {
                debug!(
                    target: "cli::events",
                    entity = sync.entity.0,
                    kind = ?sync.kind,
                    ?message,
                    "Sync"
                );
            }
            Err(error) => {
                warn!(
                    target: "cli::events",
                    entity = sync.entity.0,
                    %error,
                    "Undecodable sync payload"
                );
            }
        },
    }
}
