use crate::chain::{Addition, ModifierMatch};
use crate::channel::Channel;
use crate::config::TemperatureConfig;
use crate::modifier::{Modifier, ModifierId, ModifierKind};
use crate::state::TemperatureState;

/// Ticks between condition checks.
pub const CONDITION_INTERVAL: u64 = 5;
/// Rain only wets an entity on this tick boundary.
pub const RAIN_INTERVAL: u64 = 40;
/// Frozen ticks per unit of freezing chill.
pub const FREEZE_TICKS_PER_CHILL: f64 = 13.5;
/// Insulation of an insulated minecart, both directions.
pub const MINECART_INSULATION: f64 = 20.0;
/// Item id that grants the soul sprout chill.
pub const SOUL_SPROUT_ITEM: &str = "soul_sprout";

const WATER_STRENGTH: f64 = 0.01;
const WATER_REFRESH: u32 = 5;
const STATUS_EXPIRY: u32 = 5;
const SOUL_SPROUT_EXPIRY: u32 = 900;
const THAW_BASE_INTERVAL: f64 = 37.0;

/// What the host observed about an entity this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EntityConditions {
    pub in_water: bool,
    pub raining: bool,
    pub ticks_frozen: u32,
    pub on_fire: bool,
    pub ice_resistant: bool,
    /// Total worn insulation, both directions summed.
    pub insulation: f64,
}

/// What an entity is riding.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MountKind {
    InsulatedMinecart,
    /// Any other entity, by type id.
    Entity(String),
}

/// Change to the insulation status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InsulationChange {
    Added { amplifier: u8, duration: u32 },
    Removed,
}

/// Water, freezing and fire modifiers. Runs every [`CONDITION_INTERVAL`] ticks.
///
/// Returns true when any chain changed.
pub fn apply_conditions(
    state: &mut TemperatureState,
    conditions: &EntityConditions,
    age: u64,
) -> bool {
    if age % CONDITION_INTERVAL != 0 {
        return false;
    }
    let mut changed = false;

    if conditions.in_water || (conditions.raining && age % RAIN_INTERVAL == 0) {
        let water = Modifier::new(ModifierKind::Water {
            strength: WATER_STRENGTH,
        })
        .refresh_rate(WATER_REFRESH);
        changed |= state
            .add_modifier(Channel::World, water, false, &Addition::at_end())
            .is_changed();
    }

    if conditions.ticks_frozen > 0 {
        let chill = f64::from(conditions.ticks_frozen) / FREEZE_TICKS_PER_CHILL;
        let freezing = Modifier::new(ModifierKind::Freezing { chill }).expires(STATUS_EXPIRY);
        changed |= replace_or_add(state, Channel::Base, freezing);
    }

    if conditions.on_fire {
        let fire = Modifier::new(ModifierKind::Fire).expires(STATUS_EXPIRY);
        changed |= replace_or_add(state, Channel::Base, fire);
    }

    changed
}

/// Frozen-tick count after natural thawing, or `None` when it stays put.
///
/// Uninsulated entities without ice resistance thaw one tick every
/// `max(1, 37 - insulation)` ticks.
pub fn thaw(conditions: &EntityConditions, age: u64) -> Option<u32> {
    if conditions.ticks_frozen == 0 || conditions.ice_resistant || conditions.insulation > 0.0 {
        return None;
    }
    let interval = (THAW_BASE_INTERVAL - conditions.insulation).max(1.0) as u64;
    (age % interval == 0).then(|| conditions.ticks_frozen - 1)
}

/// Mount insulation on the RATE chain. Runs every [`CONDITION_INTERVAL`] ticks.
pub fn apply_mount(
    state: &mut TemperatureState,
    mount: Option<&MountKind>,
    config: &TemperatureConfig,
    age: u64,
) -> bool {
    if age % CONDITION_INTERVAL != 0 {
        return false;
    }
    let modifier = match mount {
        Some(MountKind::InsulatedMinecart) => Modifier::new(ModifierKind::Mount {
            warming: MINECART_INSULATION,
            cooling: MINECART_INSULATION,
        })
        .expires(1),
        Some(MountKind::Entity(entity)) => match config.mount_insulation(entity) {
            Some(insulation) => Modifier::new(ModifierKind::Mount {
                warming: insulation.warming,
                cooling: insulation.cooling,
            })
            .expires(STATUS_EXPIRY),
            None => return false,
        },
        None => return false,
    };
    state
        .add_modifier(Channel::Rate, modifier, false, &Addition::at_end())
        .is_changed()
}

/// Effects of eating or drinking `item`.
pub fn on_consumed(state: &mut TemperatureState, item: &str, config: &TemperatureConfig) -> bool {
    let mut changed = false;
    if let Some(temperature) = config.food_temperature(item)
        && temperature != 0.0
    {
        let food = Modifier::new(ModifierKind::Food { temperature }).expires(0);
        changed |= state
            .add_modifier(Channel::Core, food, true, &Addition::at_end())
            .is_changed();
    }
    if item == SOUL_SPROUT_ITEM {
        let sprout = Modifier::new(ModifierKind::SoulSprout).expires(SOUL_SPROUT_EXPIRY);
        changed |= replace_or_add(state, Channel::Base, sprout);
    }
    changed
}

/// Hearth modifier tracking the insulation status effect.
pub fn on_insulation_effect(state: &mut TemperatureState, change: InsulationChange) -> bool {
    match change {
        InsulationChange::Added {
            amplifier,
            duration,
        } => {
            let hearth = Modifier::new(ModifierKind::Hearth {
                strength: amplifier.saturating_add(1),
            })
            .expires(duration);
            replace_or_add(state, Channel::World, hearth)
        }
        InsulationChange::Removed => {
            let hearth = ModifierMatch::Kind("hearth");
            state.remove_modifiers(Channel::World, usize::MAX, |m| hearth.matches(m)) > 0
        }
    }
}

fn replace_or_add(state: &mut TemperatureState, channel: Channel, modifier: Modifier) -> bool {
    let id: ModifierId = modifier.id().clone();
    state
        .add_modifier(channel, modifier, false, &Addition::replace_or_add(id))
        .is_changed()
}
