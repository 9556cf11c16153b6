//! Stateful, throttled, expiring transforms applied to a channel's value.
//!
//! # Tick / cache state machine
//!
//! A modifier is FRESH until it has been aged once. On every evaluation it
//! either recomputes (FRESH, or `ticks_existed` on a refresh boundary) or
//! returns the result cached at the last recompute, ignoring the new input.
//! Ageing happens separately in [`Modifier::advance`], driven by the chain,
//! so expiry never depends on the refresh throttle.
mod context;
mod kind;

use std::sync::Arc;

pub use context::{EntityContext, EntityId, Position, SampleKind, Sampler, Trend};
pub use kind::{
    FIRE_HEAT, HEARTH_STEP, ModifierKind, ModifierLogic, SOUL_SPROUT_CHILL,
    UNDERGROUND_BLEND_DEPTH,
};

use crate::channel::Channel;

/// Stable identity of a modifier, e.g. `"thermal:biome"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierId(String);

impl ModifierId {
    /// Namespace for ids of built-in kinds.
    pub const NAMESPACE: &'static str = "thermal";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of a built-in kind with the given tag.
    pub fn builtin(tag: &str) -> Self {
        Self(format!("{}:{}", Self::NAMESPACE, tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ModifierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModifierId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModifierId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tick-counted lifetime of a modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expiry {
    /// Lives until explicitly removed.
    #[default]
    Never,
    /// Removed once `ticks_existed` exceeds this many ticks.
    After(u32),
}

impl Expiry {
    /// Sentinel used by external formats for [`Expiry::Never`].
    pub const UNLIMITED: i64 = -1;

    /// Builds an expiry from the `-1 = unlimited` convention.
    pub fn from_ticks(ticks: i64) -> Self {
        match u32::try_from(ticks) {
            Ok(ticks) => Self::After(ticks),
            Err(_) => Self::Never,
        }
    }

    /// Inverse of [`Expiry::from_ticks`].
    pub fn as_ticks(&self) -> i64 {
        match self {
            Self::Never => Self::UNLIMITED,
            Self::After(ticks) => i64::from(*ticks),
        }
    }
}

/// A single entry of a modifier chain.
#[derive(Clone, Debug)]
pub struct Modifier {
    id: ModifierId,
    kind: ModifierKind,
    refresh_rate: u32,
    expiry: Expiry,
    ticks_existed: u32,
    last_result: f64,
}

impl Modifier {
    /// Creates a modifier of a built-in kind with its default id.
    pub fn new(kind: ModifierKind) -> Self {
        let id = ModifierId::builtin(kind.tag());
        Self::with_id(id, kind)
    }

    /// Creates a modifier with an explicit id.
    pub fn with_id(id: impl Into<ModifierId>, kind: ModifierKind) -> Self {
        Self {
            id: id.into(),
            kind,
            refresh_rate: 1,
            expiry: Expiry::Never,
            ticks_existed: 0,
            last_result: f64::NAN,
        }
    }

    /// Creates a modifier backed by caller-supplied logic.
    pub fn custom(id: impl Into<ModifierId>, logic: impl ModifierLogic + 'static) -> Self {
        Self::with_id(id, ModifierKind::Custom(Arc::new(logic)))
    }

    /// Recompute only every `ticks` ticks (builder pattern). Zero is treated as one.
    #[must_use]
    pub fn refresh_rate(mut self, ticks: u32) -> Self {
        self.refresh_rate = ticks.max(1);
        self
    }

    /// Expire after `ticks` ticks (builder pattern).
    #[must_use]
    pub fn expires(mut self, ticks: u32) -> Self {
        self.expiry = Expiry::After(ticks);
        self
    }

    /// Replace the expiry (builder pattern).
    #[must_use]
    pub fn expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn id(&self) -> &ModifierId {
        &self.id
    }

    pub fn kind(&self) -> &ModifierKind {
        &self.kind
    }

    /// Mutable payload access. Chain membership is not reachable from here.
    pub fn kind_mut(&mut self) -> &mut ModifierKind {
        &mut self.kind
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn refresh(&self) -> u32 {
        self.refresh_rate
    }

    pub fn lifetime(&self) -> Expiry {
        self.expiry
    }

    pub fn ticks_existed(&self) -> u32 {
        self.ticks_existed
    }

    /// Result cached at the last recompute; `NaN` before the first one.
    pub fn last_result(&self) -> f64 {
        self.last_result
    }

    /// True until the modifier has been aged once.
    pub fn is_fresh(&self) -> bool {
        self.ticks_existed == 0
    }

    /// True when the next evaluation will recompute instead of reading the cache.
    pub fn is_due(&self) -> bool {
        self.is_fresh() || self.ticks_existed % self.refresh_rate == 0
    }

    /// Runs the tick / cache state machine for one evaluation.
    ///
    /// Returns `NaN` when the modifier has nothing to contribute.
    pub fn evaluate(&mut self, value: f64, ctx: &EntityContext<'_>, channel: Channel) -> f64 {
        if self.is_due() {
            self.last_result = self.kind.compute(value, ctx, channel);
        }
        self.last_result
    }

    /// Ages the modifier by one tick and reports whether it has expired.
    pub fn advance(&mut self) -> bool {
        self.ticks_existed = self.ticks_existed.saturating_add(1);
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Expiry::Never => false,
            Expiry::After(limit) => self.ticks_existed > limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemperatureConfig;

    struct Silent;

    impl Sampler for Silent {
        fn sample(&self, _: EntityId, _: Position, _: SampleKind) -> f64 {
            f64::NAN
        }
    }

    /// Returns the entity age as the new value.
    #[derive(Debug)]
    struct AgeProbe;

    impl ModifierLogic for AgeProbe {
        fn tag(&self) -> &'static str {
            "age_probe"
        }

        fn compute(&self, _value: f64, ctx: &EntityContext<'_>, _channel: Channel) -> f64 {
            ctx.age as f64
        }
    }

    #[test]
    fn throttled_recompute_follows_refresh_boundaries() {
        let config = TemperatureConfig::default();
        let mut modifier = Modifier::custom("test:age", AgeProbe).refresh_rate(10);

        let mut seen = Vec::new();
        for tick in 0..25u64 {
            let ctx = EntityContext::new(EntityId(1), Position::default(), tick, &Silent, &config);
            seen.push(modifier.evaluate(-1.0, &ctx, Channel::World));
            modifier.advance();
        }

        assert!(seen[0..10].iter().all(|v| *v == 0.0));
        assert!(seen[10..20].iter().all(|v| *v == 10.0));
        assert!(seen[20..25].iter().all(|v| *v == 20.0));
    }

    #[test]
    fn cached_result_ignores_new_input() {
        let config = TemperatureConfig::default();
        let ctx = EntityContext::new(EntityId(1), Position::default(), 0, &Silent, &config);
        let mut modifier = Modifier::new(ModifierKind::Offset(1.0)).refresh_rate(5);

        assert_eq!(modifier.evaluate(1.0, &ctx, Channel::Core), 2.0);
        modifier.advance();
        assert_eq!(modifier.evaluate(100.0, &ctx, Channel::Core), 2.0);
    }

    #[test]
    fn expiry_triggers_after_limit() {
        let mut modifier = Modifier::new(ModifierKind::Fire).expires(5);
        for _ in 0..5 {
            assert!(!modifier.advance());
        }
        assert!(modifier.advance());
        assert_eq!(modifier.ticks_existed(), 6);

        let mut forever = Modifier::new(ModifierKind::Fire);
        for _ in 0..1000 {
            assert!(!forever.advance());
        }
    }

    #[test]
    fn expiry_sentinel_round_trips() {
        assert_eq!(Expiry::from_ticks(-1), Expiry::Never);
        assert_eq!(Expiry::from_ticks(900), Expiry::After(900));
        assert_eq!(Expiry::Never.as_ticks(), -1);
        assert_eq!(Expiry::After(5).as_ticks(), 5);
    }

    #[test]
    fn builtin_ids_are_namespaced() {
        let modifier = Modifier::new(ModifierKind::Biome { samples: 25 });
        assert_eq!(modifier.id().as_str(), "thermal:biome");
        assert_eq!(modifier.tag(), "biome");
        assert_eq!(Modifier::new(ModifierKind::Fire).refresh_rate(0).refresh(), 1);
    }
}
