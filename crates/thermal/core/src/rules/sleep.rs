use crate::channel::Channel;
use crate::config::TemperatureConfig;
use crate::error::TemperatureError;
use crate::state::TemperatureState;

/// Body temperature magnitude beyond which sleep is refused.
pub const CRITICAL_BODY: f64 = 100.0;
/// Resistance level that lets an entity sleep through any temperature.
pub const SLEEP_RESISTANCE: u8 = 4;

/// Temperature damage resistance levels, per direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempResistance {
    pub cold: u8,
    pub heat: u8,
}

impl TempResistance {
    pub const fn against(&self, cold: bool) -> u8 {
        if cold { self.cold } else { self.heat }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SleepProblem {
    BodyTooHot,
    BodyTooCold,
    WorldTooHot,
    WorldTooCold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SleepVerdict {
    Allowed,
    Prevented(SleepProblem),
}

/// Decides whether an entity may sleep at its current temperatures.
///
/// Critical body temperature is checked first, then the world against the
/// habitable range shifted by the freezing and burning points.
pub fn check_sleep(
    state: &TemperatureState,
    config: &TemperatureConfig,
    resistance: TempResistance,
) -> SleepVerdict {
    if !config.check_sleep_conditions {
        return SleepVerdict::Allowed;
    }

    let body = state.get(Channel::Body);
    if !(-CRITICAL_BODY..=CRITICAL_BODY).contains(&body) {
        let cold = body < 0.0;
        if resistance.against(cold) >= SLEEP_RESISTANCE {
            return SleepVerdict::Allowed;
        }
        let problem = if cold {
            SleepProblem::BodyTooCold
        } else {
            SleepProblem::BodyTooHot
        };
        return SleepVerdict::Prevented(problem);
    }

    let world = state.get(Channel::World);
    let (min, max) = config.thresholds(
        state.get(Channel::FreezingPoint),
        state.get(Channel::BurningPoint),
    );
    if !(min..=max).contains(&world) {
        let cold = world < min;
        if resistance.against(cold) >= SLEEP_RESISTANCE {
            return SleepVerdict::Allowed;
        }
        let problem = if cold {
            SleepProblem::WorldTooCold
        } else {
            SleepProblem::WorldTooHot
        };
        return SleepVerdict::Prevented(problem);
    }

    SleepVerdict::Allowed
}

/// A full night's sleep quarters core temperature.
pub fn on_sleep_finished(state: &mut TemperatureState) -> Result<f64, TemperatureError> {
    let core = state.get(Channel::Core) / 4.0;
    state.set(Channel::Core, core)?;
    Ok(core)
}

/// Death wipes temperature state.
pub fn respawn(state: &mut TemperatureState) {
    state.reset();
}

/// Entity cloned into a new body. Only non-death clones keep their state.
pub fn on_clone(state: &mut TemperatureState, original: &TemperatureState, was_death: bool) {
    if was_death {
        state.reset();
    } else {
        state.copy_from(original);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Addition;
    use crate::modifier::{Modifier, ModifierKind};

    fn state_with(core: f64, world: f64) -> TemperatureState {
        let mut state = TemperatureState::new();
        state.set(Channel::Core, core).unwrap();
        state.set(Channel::World, world).unwrap();
        state
    }

    #[test]
    fn critical_body_blocks_unless_resistant() {
        let config = TemperatureConfig::default();
        let state = state_with(-120.0, 1.0);
        assert_eq!(
            check_sleep(&state, &config, TempResistance::default()),
            SleepVerdict::Prevented(SleepProblem::BodyTooCold)
        );
        let resistant = TempResistance { cold: 4, heat: 0 };
        assert_eq!(check_sleep(&state, &config, resistant), SleepVerdict::Allowed);
    }

    #[test]
    fn world_range_includes_point_offsets() {
        let config = TemperatureConfig::default();
        let mut state = state_with(0.0, config.max_temp + 0.5);
        assert_eq!(
            check_sleep(&state, &config, TempResistance::default()),
            SleepVerdict::Prevented(SleepProblem::WorldTooHot)
        );

        state.set(Channel::BurningPoint, 1.0).unwrap();
        assert_eq!(
            check_sleep(&state, &config, TempResistance::default()),
            SleepVerdict::Allowed
        );

        let disabled = TemperatureConfig {
            check_sleep_conditions: false,
            ..TemperatureConfig::default()
        };
        let cold = state_with(0.0, -5.0);
        assert_eq!(
            check_sleep(&cold, &disabled, TempResistance::default()),
            SleepVerdict::Allowed
        );
    }

    #[test]
    fn sleep_quarters_core() {
        let mut state = state_with(40.0, 0.0);
        assert_eq!(on_sleep_finished(&mut state).unwrap(), 10.0);
        assert_eq!(state.get(Channel::Core), 10.0);
    }

    #[test]
    fn clones_keep_state_only_when_alive() {
        let mut original = state_with(12.0, 1.0);
        original.add_modifier(
            Channel::Base,
            Modifier::new(ModifierKind::SoulSprout),
            false,
            &Addition::at_end(),
        );

        let mut traveller = TemperatureState::new();
        on_clone(&mut traveller, &original, false);
        assert_eq!(traveller.get(Channel::Core), 12.0);
        assert_eq!(traveller.modifiers(Channel::Base).len(), 1);

        let mut reborn = state_with(3.0, 3.0);
        on_clone(&mut reborn, &original, true);
        assert_eq!(reborn.get(Channel::Core), 0.0);

        respawn(&mut original);
        assert!(original.modifiers(Channel::Base).is_empty());
    }
}
