//! Per-entity temperature state: stored scalars, modifier chains and the
//! tick that integrates them.
//!
//! # Tick order
//!
//! 1. Fold WORLD, BASE, BURNING_POINT and FREEZING_POINT from zero; fold CORE
//!    from the current core value.
//! 2. Composite attribute modifiers over
//!    [`ATTRIBUTE_CHANNELS`](crate::attribute::ATTRIBUTE_CHANNELS).
//! 3. Move core toward the world when the world leaves the habitable range,
//!    scaled by the RATE chain.
//! 4. Let core drift back toward zero when it disagrees with the world.
//! 5. Clamp core, write the scalars back, report hazards.
//! 6. Age every chain and evict expired modifiers.
mod snapshot;

use arrayvec::ArrayVec;

pub use snapshot::{ChainSnapshot, ModifierSnapshot, TemperatureSnapshot};

use crate::attribute::{AttributeStack, compose};
use crate::chain::{Addition, InsertOutcome, ModifierChain, ModifierMatch, Rejection};
use crate::channel::{Channel, ChannelSet};
use crate::error::TemperatureError;
use crate::modifier::{EntityContext, Modifier, ModifierId, ModifierKind, Trend};
use crate::registry::ModifierRegistry;

/// Damage condition caused by extreme body temperature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Hazard {
    Hypothermia,
    Hyperthermia,
}

/// Outcome of one [`TemperatureState::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub world: f64,
    pub body: f64,
    /// Which way the world pushed core temperature.
    pub trend: Trend,
    pub hazard: Option<Hazard>,
    /// Chains that lost modifiers to expiry this tick.
    pub evicted: ChannelSet,
}

/// Temperature scalars and modifier chains of one tracked entity.
#[derive(Clone, Debug, Default)]
pub struct TemperatureState {
    values: [f64; 5],
    chains: [ModifierChain; 6],
    changed: ChannelSet,
}

impl TemperatureState {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== scalars =====

    /// Reads a channel. BODY is `CORE + BASE`; RATE has no value and reads 0.
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Body => self.get(Channel::Core) + self.get(Channel::Base),
            other => other
                .stored_index()
                .map_or(0.0, |index| self.values[index]),
        }
    }

    /// Writes a stored channel. BODY and RATE are rejected without writing.
    pub fn set(&mut self, channel: Channel, value: f64) -> Result<(), TemperatureError> {
        let index = Self::stored_index(channel)?;
        self.values[index] = value;
        Ok(())
    }

    pub fn add(&mut self, channel: Channel, delta: f64) -> Result<(), TemperatureError> {
        let index = Self::stored_index(channel)?;
        self.values[index] += delta;
        Ok(())
    }

    fn stored_index(channel: Channel) -> Result<usize, TemperatureError> {
        if channel.is_derived() {
            return Err(TemperatureError::ReadOnlyChannel(channel));
        }
        channel
            .stored_index()
            .ok_or(TemperatureError::NotStored(channel))
    }

    /// Stored scalars in [`Channel::STORED`] order.
    pub fn values(&self) -> [f64; 5] {
        self.values
    }

    // ===== chains =====

    pub fn chain(&self, channel: Channel) -> Option<&ModifierChain> {
        channel.chain_index().map(|index| &self.chains[index])
    }

    fn chain_mut(&mut self, channel: Channel) -> Option<&mut ModifierChain> {
        channel.chain_index().map(|index| &mut self.chains[index])
    }

    /// Owned copy of a channel's modifiers; empty for BODY.
    pub fn modifiers(&self, channel: Channel) -> Vec<Modifier> {
        self.chain(channel)
            .map(ModifierChain::snapshot)
            .unwrap_or_default()
    }

    pub fn has_modifier(&self, channel: Channel, target: &ModifierMatch) -> bool {
        self.find_modifier(channel, target).is_some()
    }

    pub fn find_modifier(&self, channel: Channel, target: &ModifierMatch) -> Option<&Modifier> {
        self.chain(channel).and_then(|chain| chain.find(target))
    }

    pub fn add_modifier(
        &mut self,
        channel: Channel,
        modifier: Modifier,
        allow_duplicates: bool,
        addition: &Addition,
    ) -> InsertOutcome {
        let Some(chain) = self.chain_mut(channel) else {
            return InsertOutcome::Rejected(Rejection::NoChain);
        };
        let outcome = chain.insert(modifier, allow_duplicates, addition);
        if outcome.is_changed() {
            self.changed |= channel.flag();
        }
        outcome
    }

    /// Like [`TemperatureState::add_modifier`], but only for ids known to `registry`.
    pub fn add_registered(
        &mut self,
        registry: &ModifierRegistry,
        channel: Channel,
        modifier: Modifier,
        allow_duplicates: bool,
        addition: &Addition,
    ) -> InsertOutcome {
        if !registry.contains(modifier.id()) {
            return InsertOutcome::Rejected(Rejection::Unregistered);
        }
        self.add_modifier(channel, modifier, allow_duplicates, addition)
    }

    /// Bulk-appends modifiers. Returns how many were added.
    pub fn add_modifiers(
        &mut self,
        channel: Channel,
        modifiers: impl IntoIterator<Item = Modifier>,
        allow_duplicates: bool,
    ) -> usize {
        let Some(chain) = self.chain_mut(channel) else {
            return 0;
        };
        let added = chain.extend(modifiers, allow_duplicates);
        if added > 0 {
            self.changed |= channel.flag();
        }
        added
    }

    pub fn remove_modifiers(
        &mut self,
        channel: Channel,
        max: usize,
        predicate: impl FnMut(&Modifier) -> bool,
    ) -> usize {
        self.remove_modifiers_vetoed(channel, max, predicate, |_| true)
    }

    /// Removes up to `max` matches; `allow` may keep individual candidates.
    pub fn remove_modifiers_vetoed(
        &mut self,
        channel: Channel,
        max: usize,
        predicate: impl FnMut(&Modifier) -> bool,
        allow: impl FnMut(&Modifier) -> bool,
    ) -> usize {
        let Some(chain) = self.chain_mut(channel) else {
            return 0;
        };
        let removed = chain.remove_where_vetoed(max, predicate, allow);
        if removed > 0 {
            self.changed |= channel.flag();
        }
        removed
    }

    /// Mutates modifier payloads in place and marks the chain changed.
    pub fn update_modifiers(
        &mut self,
        channel: Channel,
        f: impl FnMut(&ModifierId, &mut ModifierKind),
    ) {
        if let Some(chain) = self.chain_mut(channel) {
            chain.for_each_mut(f);
            self.changed |= channel.flag();
        }
    }

    // ===== change tracking =====

    /// Chains changed since the last call, clearing the record.
    pub fn take_modifier_changes(&mut self) -> ChannelSet {
        std::mem::take(&mut self.changed)
    }

    pub fn pending_modifier_changes(&self) -> ChannelSet {
        self.changed
    }

    pub fn mark_changed(&mut self, channels: ChannelSet) {
        self.changed |= channels;
    }

    // ===== lifecycle =====

    /// Replaces every scalar and chain with a copy of `other`.
    pub fn copy_from(&mut self, other: &TemperatureState) {
        self.values = other.values;
        self.chains = other.chains.clone();
        self.changed = ChannelSet::all();
    }

    /// Restores a fresh state.
    pub fn reset(&mut self) {
        self.values = [0.0; 5];
        self.chains.iter_mut().for_each(ModifierChain::clear);
        self.changed = ChannelSet::all();
    }

    pub fn snapshot(&self) -> TemperatureSnapshot {
        let chains: ArrayVec<ChainSnapshot, 6> = Channel::MODIFIABLE
            .iter()
            .zip(&self.chains)
            .map(|(channel, chain)| ChainSnapshot {
                channel: *channel,
                modifiers: chain.iter().map(ModifierSnapshot::from).collect(),
            })
            .collect();
        TemperatureSnapshot {
            world: self.get(Channel::World),
            freezing_point: self.get(Channel::FreezingPoint),
            burning_point: self.get(Channel::BurningPoint),
            core: self.get(Channel::Core),
            base: self.get(Channel::Base),
            chains,
        }
    }

    // ===== simulation =====

    /// Advances the state by one tick.
    ///
    /// `attributes` are the stacks for
    /// [`ATTRIBUTE_CHANNELS`](crate::attribute::ATTRIBUTE_CHANNELS), in order.
    pub fn tick(
        &mut self,
        ctx: &EntityContext<'_>,
        attributes: &[AttributeStack; 5],
    ) -> TickReport {
        let config = ctx.config;

        let world = self.fold(Channel::World, 0.0, ctx);
        let base = self.fold(Channel::Base, 0.0, ctx);
        let burning = self.fold(Channel::BurningPoint, 0.0, ctx);
        let freezing = self.fold(Channel::FreezingPoint, 0.0, ctx);
        let current_core = self.get(Channel::Core);
        let core = self.fold(Channel::Core, current_core, ctx);

        let [world, mut core, base, burning, freezing] =
            compose([world, core, base, burning, freezing], attributes);

        let (min, max) = config.thresholds(freezing, burning);
        let magnitude = if world > max {
            1.0
        } else if world < min {
            -1.0
        } else {
            0.0
        };
        let trend = Trend::from_sign(magnitude);

        if magnitude != 0.0 {
            let rate = config.rate_multiplier;
            let overshoot = (world - world.clamp(min, max)).abs() * rate;
            let change = overshoot.max((rate / 50.0).abs());
            let rate_ctx = ctx.with_trend(trend);
            let change = self.fold(Channel::Rate, change, &rate_ctx);
            core += change * magnitude;
        }

        let core_sign = sign(core);
        if core_sign != 0.0 && core_sign != magnitude {
            let rate = config.rate_multiplier;
            let threshold = if core_sign > 0.0 { max } else { min };
            let drift = max_abs((world - threshold) / 3.0 * rate, rate / 10.0 * -core_sign);
            core += min_abs(drift, -core);
        }

        let limit = config.core_limit.abs();
        core = core.clamp(-limit, limit);

        self.values = [world, freezing, burning, core, base];

        let body = self.get(Channel::Body);
        let hazard = if body >= config.damage_threshold {
            Some(Hazard::Hyperthermia)
        } else if body <= -config.damage_threshold {
            Some(Hazard::Hypothermia)
        } else {
            None
        };

        let mut evicted = ChannelSet::empty();
        for (channel, chain) in Channel::MODIFIABLE.iter().zip(self.chains.iter_mut()) {
            if chain.advance() > 0 {
                evicted |= channel.flag();
            }
        }
        self.changed |= evicted;

        TickReport {
            world,
            body,
            trend,
            hazard,
            evicted,
        }
    }

    fn fold(&mut self, channel: Channel, initial: f64, ctx: &EntityContext<'_>) -> f64 {
        match self.chain_mut(channel) {
            Some(chain) => chain.apply(initial, ctx, channel),
            None => initial,
        }
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// The argument with the larger magnitude.
fn max_abs(a: f64, b: f64) -> f64 {
    if a.abs() >= b.abs() { a } else { b }
}

/// The argument with the smaller magnitude.
fn min_abs(a: f64, b: f64) -> f64 {
    if a.abs() <= b.abs() { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemperatureConfig;
    use crate::modifier::{EntityId, Position, SampleKind, Sampler};

    struct Silent;

    impl Sampler for Silent {
        fn sample(&self, _: EntityId, _: Position, _: SampleKind) -> f64 {
            f64::NAN
        }
    }

    fn no_attributes() -> [AttributeStack; 5] {
        Default::default()
    }

    fn ctx(config: &TemperatureConfig) -> EntityContext<'_> {
        EntityContext::new(EntityId(1), Position::default(), 0, &Silent, config)
    }

    fn with_world(offset: f64) -> TemperatureState {
        let mut state = TemperatureState::new();
        state.add_modifier(
            Channel::World,
            Modifier::new(ModifierKind::Offset(offset)),
            false,
            &Addition::at_end(),
        );
        state
    }

    #[test]
    fn body_is_derived_and_read_only() {
        let mut state = TemperatureState::new();
        state.set(Channel::Core, 3.0).unwrap();
        state.set(Channel::Base, 2.0).unwrap();
        assert_eq!(state.get(Channel::Body), 5.0);

        assert_eq!(
            state.set(Channel::Body, 9.0),
            Err(TemperatureError::ReadOnlyChannel(Channel::Body))
        );
        assert_eq!(
            state.add(Channel::Rate, 1.0),
            Err(TemperatureError::NotStored(Channel::Rate))
        );
        assert_eq!(state.get(Channel::Body), 5.0);
        assert_eq!(state.get(Channel::Rate), 0.0);
    }

    #[test]
    fn hot_world_raises_core() {
        let config = TemperatureConfig::default();
        let mut state = with_world(3.0);
        let report = state.tick(&ctx(&config), &no_attributes());

        let expected = 3.0 - config.max_temp;
        assert_eq!(report.trend, Trend::Warming);
        assert!((state.get(Channel::Core) - expected).abs() < 1e-12);
        assert_eq!(state.get(Channel::World), 3.0);
        assert_eq!(report.hazard, None);
    }

    #[test]
    fn rate_chain_scales_core_change() {
        let config = TemperatureConfig::default();
        let mut state = with_world(3.0);
        state.add_modifier(
            Channel::Rate,
            Modifier::new(ModifierKind::Scale(0.5)),
            false,
            &Addition::at_end(),
        );
        state.tick(&ctx(&config), &no_attributes());

        let expected = (3.0 - config.max_temp) * 0.5;
        assert!((state.get(Channel::Core) - expected).abs() < 1e-12);
    }

    #[test]
    fn core_drifts_home_without_overshoot() {
        let config = TemperatureConfig::default();
        let mut state = with_world(1.0);
        state.set(Channel::Core, 0.05).unwrap();
        let report = state.tick(&ctx(&config), &no_attributes());
        assert_eq!(report.trend, Trend::Stable);
        assert_eq!(state.get(Channel::Core), 0.0);
    }

    #[test]
    fn cold_world_pulls_warm_core_down_twice() {
        let config = TemperatureConfig::default();
        let mut state = TemperatureState::new();
        state.set(Channel::Core, 10.0).unwrap();
        state.tick(&ctx(&config), &no_attributes());

        let pulled = 10.0 - config.min_temp.max(0.02);
        let drift = max_abs(-config.max_temp / 3.0, -0.1);
        assert!((state.get(Channel::Core) - (pulled + drift)).abs() < 1e-12);
    }

    #[test]
    fn core_is_clamped_and_hazards_reported() {
        let config = TemperatureConfig::default();
        let mut state = with_world(1.0);
        state.set(Channel::Core, 500.0).unwrap();
        let report = state.tick(&ctx(&config), &no_attributes());
        assert_eq!(state.get(Channel::Core), config.core_limit);
        assert_eq!(report.hazard, Some(Hazard::Hyperthermia));

        state.set(Channel::Core, -120.0).unwrap();
        let report = state.tick(&ctx(&config), &no_attributes());
        assert_eq!(report.hazard, Some(Hazard::Hypothermia));
    }

    #[test]
    fn thresholds_follow_point_channels() {
        let config = TemperatureConfig::default();
        let mut state = with_world(3.0);
        state.add_modifier(
            Channel::BurningPoint,
            Modifier::new(ModifierKind::Offset(5.0)),
            false,
            &Addition::at_end(),
        );
        let report = state.tick(&ctx(&config), &no_attributes());
        assert_eq!(report.trend, Trend::Stable);
        assert_eq!(state.get(Channel::BurningPoint), 5.0);
    }

    #[test]
    fn attributes_composite_after_chains() {
        let config = TemperatureConfig::default();
        let mut state = with_world(1.0);
        let mut attributes = no_attributes();
        attributes[2] = AttributeStack::new().add(5.0).multiply_base(1.0).multiply_total(0.5);
        state.tick(&ctx(&config), &attributes);
        assert_eq!(state.get(Channel::Base), 5.0);
    }

    #[test]
    fn expiry_marks_chain_changed() {
        let config = TemperatureConfig::default();
        let mut state = TemperatureState::new();
        state.add_modifier(
            Channel::Base,
            Modifier::new(ModifierKind::Fire).expires(0),
            false,
            &Addition::at_end(),
        );
        assert_eq!(state.take_modifier_changes(), ChannelSet::BASE);

        let report = state.tick(&ctx(&config), &no_attributes());
        assert_eq!(state.get(Channel::Base), 10.0);
        assert_eq!(report.evicted, ChannelSet::BASE);
        assert_eq!(state.take_modifier_changes(), ChannelSet::BASE);
        assert!(state.modifiers(Channel::Base).is_empty());
        assert!(state.take_modifier_changes().is_empty());
    }

    #[test]
    fn rejected_inserts_do_not_mark_changes() {
        let mut state = with_world(1.0);
        state.take_modifier_changes();
        let outcome = state.add_modifier(
            Channel::World,
            Modifier::new(ModifierKind::Offset(2.0)),
            false,
            &Addition::at_end(),
        );
        assert_eq!(outcome, InsertOutcome::Rejected(Rejection::Duplicate));
        assert!(state.take_modifier_changes().is_empty());

        let outcome = state.add_modifier(
            Channel::Body,
            Modifier::new(ModifierKind::Fire),
            false,
            &Addition::at_end(),
        );
        assert_eq!(outcome, InsertOutcome::Rejected(Rejection::NoChain));
    }

    #[test]
    fn unregistered_ids_are_rejected() {
        let registry = ModifierRegistry::with_builtins();
        let mut state = TemperatureState::new();
        let outcome = state.add_registered(
            &registry,
            Channel::World,
            Modifier::with_id("mod:unknown", ModifierKind::Offset(1.0)),
            false,
            &Addition::at_end(),
        );
        assert_eq!(outcome, InsertOutcome::Rejected(Rejection::Unregistered));

        let outcome = state.add_registered(
            &registry,
            Channel::World,
            Modifier::new(ModifierKind::Fire),
            false,
            &Addition::at_end(),
        );
        assert!(outcome.is_changed());
    }

    #[test]
    fn copy_and_reset() {
        let mut source = with_world(2.0);
        source.set(Channel::Core, 7.0).unwrap();
        let mut target = TemperatureState::new();
        target.copy_from(&source);

        assert_eq!(target.get(Channel::Core), 7.0);
        assert_eq!(target.modifiers(Channel::World).len(), 1);
        assert_eq!(target.take_modifier_changes(), ChannelSet::all());

        source.reset();
        assert_eq!(source.get(Channel::Core), 0.0);
        assert!(source.modifiers(Channel::World).is_empty());
        assert_eq!(target.modifiers(Channel::World).len(), 1);
    }

    #[test]
    fn snapshot_digest_ignores_ageing() {
        let config = TemperatureConfig::default();
        let mut state = with_world(1.0);
        let before = state.snapshot();
        state.tick(&ctx(&config), &no_attributes());
        let after = state.snapshot();
        assert_eq!(before.modifier_digest(), after.modifier_digest());
        assert_eq!(after.chain(Channel::World).unwrap().modifiers[0].ticks_existed, 1);

        state.add_modifier(
            Channel::Base,
            Modifier::new(ModifierKind::SoulSprout),
            false,
            &Addition::at_end(),
        );
        assert_ne!(
            hex::encode(after.modifier_digest()),
            hex::encode(state.snapshot().modifier_digest())
        );
    }
}
