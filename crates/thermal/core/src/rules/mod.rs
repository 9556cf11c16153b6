//! Gameplay rules that add, replace and remove modifiers in response to
//! what happens to an entity.
//!
//! Every rule is a plain function over [`TemperatureState`]; the host (or the
//! runtime worker) decides when to call it and reports outcomes through the
//! return values.
mod conditions;
mod sleep;

pub use conditions::{
    CONDITION_INTERVAL, EntityConditions, FREEZE_TICKS_PER_CHILL, InsulationChange,
    MINECART_INSULATION, MountKind, RAIN_INTERVAL, SOUL_SPROUT_ITEM, apply_conditions,
    apply_mount, on_consumed, on_insulation_effect, thaw,
};
pub use sleep::{
    SleepProblem, SleepVerdict, TempResistance, check_sleep, on_clone, on_sleep_finished,
    respawn,
};

use crate::chain::{Addition, apply_modifiers};
use crate::channel::Channel;
use crate::config::TemperatureConfig;
use crate::error::TemperatureError;
use crate::modifier::{EntityContext, Modifier, ModifierId, ModifierKind};
use crate::registry::{DEFAULT_BLOCK_RANGE, ModifierRegistry};
use crate::state::TemperatureState;
use crate::sync::TrackedKind;

/// Refresh rate of compat modifiers (seasons, weather).
pub const COMPAT_REFRESH: u32 = 60;

/// Seeds the default WORLD chain for a newly tracked entity.
///
/// Returns the number of modifiers added.
pub fn init_default_modifiers(
    state: &mut TemperatureState,
    kind: TrackedKind,
    registry: &ModifierRegistry,
    config: &TemperatureConfig,
) -> usize {
    let compat = &config.compat;
    let mut added = 0;
    match kind {
        TrackedKind::Player => {
            let steps = [
                (
                    Modifier::new(ModifierKind::Biome { samples: 25 }).refresh_rate(10),
                    Addition::at_start(),
                ),
                (
                    Modifier::new(ModifierKind::Underground).refresh_rate(10),
                    Addition::after_kind("biome"),
                ),
                (
                    Modifier::new(ModifierKind::Block {
                        range: DEFAULT_BLOCK_RANGE,
                    })
                    .refresh_rate(4),
                    Addition::after_kind("underground"),
                ),
            ];
            for (modifier, addition) in steps {
                if state
                    .add_modifier(Channel::World, modifier, false, &addition)
                    .is_changed()
                {
                    added += 1;
                }
            }
        }
        TrackedKind::Creature => {
            added += state.add_modifiers(
                Channel::World,
                [
                    Modifier::new(ModifierKind::Biome { samples: 9 }).refresh_rate(40),
                    Modifier::new(ModifierKind::Underground).refresh_rate(40),
                    Modifier::new(ModifierKind::Block { range: 4 }).refresh_rate(20),
                ],
                false,
            );
        }
    }

    let compat_ids = [
        (compat.seasons, ModifierId::builtin("season")),
        (compat.weather, ModifierId::builtin("weather")),
    ];
    for (enabled, id) in compat_ids {
        let Some(modifier) = enabled.then(|| registry.create(&id)).flatten() else {
            continue;
        };
        let outcome = state.add_registered(
            registry,
            Channel::World,
            modifier.refresh_rate(COMPAT_REFRESH),
            false,
            &Addition::before_kind("underground"),
        );
        if outcome.is_changed() {
            added += 1;
        }
    }
    added
}

/// Sets WORLD to a fold of the current WORLD chain without touching the
/// chain's own caches.
pub fn settle_world(
    state: &mut TemperatureState,
    ctx: &EntityContext<'_>,
) -> Result<f64, TemperatureError> {
    let mut modifiers = state.modifiers(Channel::World);
    let world = apply_modifiers(0.0, ctx, Channel::World, &mut modifiers);
    state.set(Channel::World, world)?;
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompatSettings;
    use crate::modifier::{EntityId, Position, SampleKind, Sampler};

    struct Warm;

    impl Sampler for Warm {
        fn sample(&self, _: EntityId, _: Position, kind: SampleKind) -> f64 {
            match kind {
                SampleKind::Biome { .. } => 1.0,
                SampleKind::Block { .. } => 0.25,
                _ => f64::NAN,
            }
        }
    }

    fn world_tags(state: &TemperatureState) -> Vec<&'static str> {
        state
            .chain(Channel::World)
            .map(|chain| chain.iter().map(Modifier::tag).collect())
            .unwrap_or_default()
    }

    #[test]
    fn player_defaults_are_ordered_with_compat_before_underground() {
        let registry = ModifierRegistry::with_builtins();
        let config = TemperatureConfig {
            compat: CompatSettings {
                seasons: true,
                weather: true,
            },
            ..TemperatureConfig::default()
        };
        let mut state = TemperatureState::new();
        let added = init_default_modifiers(&mut state, TrackedKind::Player, &registry, &config);

        assert_eq!(added, 5);
        assert_eq!(
            world_tags(&state),
            ["biome", "season", "weather", "underground", "block"]
        );
        let refresh: Vec<u32> = state
            .modifiers(Channel::World)
            .iter()
            .map(Modifier::refresh)
            .collect();
        assert_eq!(refresh, [10, 60, 60, 10, 4]);
    }

    #[test]
    fn creature_defaults_skip_missing_compat_entries() {
        let mut registry = ModifierRegistry::with_builtins();
        registry.unregister(&ModifierId::builtin("weather"));
        let config = TemperatureConfig {
            compat: CompatSettings {
                seasons: false,
                weather: true,
            },
            ..TemperatureConfig::default()
        };
        let mut state = TemperatureState::new();
        let added = init_default_modifiers(&mut state, TrackedKind::Creature, &registry, &config);

        assert_eq!(added, 3);
        assert_eq!(world_tags(&state), ["biome", "underground", "block"]);
        assert_eq!(
            state
                .modifiers(Channel::World)
                .iter()
                .map(Modifier::refresh)
                .collect::<Vec<_>>(),
            [40, 40, 20]
        );
    }

    #[test]
    fn settle_world_leaves_chain_fresh() {
        let registry = ModifierRegistry::with_builtins();
        let config = TemperatureConfig::default();
        let mut state = TemperatureState::new();
        init_default_modifiers(&mut state, TrackedKind::Creature, &registry, &config);

        let ctx = EntityContext::new(EntityId(2), Position::default(), 0, &Warm, &config);
        let world = settle_world(&mut state, &ctx).unwrap();
        assert_eq!(world, 1.25);
        assert_eq!(state.get(Channel::World), 1.25);
        assert!(state.modifiers(Channel::World).iter().all(Modifier::is_fresh));
        assert!(
            state
                .modifiers(Channel::World)
                .iter()
                .all(|m| m.last_result().is_nan())
        );
    }
}
