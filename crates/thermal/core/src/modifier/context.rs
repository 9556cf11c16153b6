//! Sampling context handed to modifiers while a chain is folded.

use crate::config::TemperatureConfig;

/// Identity of a tracked entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u64);

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World position in block coordinates. `y` grows upward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// What a [`Sampler`] is asked to measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleKind {
    /// Biome temperature averaged over `samples` points around the position.
    Biome { samples: u32 },
    /// Blocks between the position and the open sky; zero or less means exposed.
    Depth,
    /// Heat contributed by blocks within `range` of the position.
    Block { range: u32 },
    /// Temperature offset from the current weather.
    Weather,
    /// Temperature offset from the current season.
    Season,
}

/// Read-only source of raw environmental samples.
///
/// Implementations must be synchronous and bounded. Returning `NaN` means the
/// source has no data for the request; the modifier then leaves the running
/// value untouched.
pub trait Sampler: Send + Sync {
    fn sample(&self, entity: EntityId, position: Position, kind: SampleKind) -> f64;
}

/// Direction the world is pushing core temperature this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trend {
    Cooling,
    #[default]
    Stable,
    Warming,
}

impl Trend {
    /// Trend from the sign of a magnitude (-1, 0, 1).
    pub fn from_sign(sign: f64) -> Self {
        if sign > 0.0 {
            Self::Warming
        } else if sign < 0.0 {
            Self::Cooling
        } else {
            Self::Stable
        }
    }
}

/// Everything a modifier may read while computing.
///
/// The context only borrows collaborators; a modifier has no path back to the
/// chain that owns it.
#[derive(Clone, Copy)]
pub struct EntityContext<'a> {
    pub entity: EntityId,
    pub position: Position,
    /// Ticks the entity has existed.
    pub age: u64,
    pub sampler: &'a dyn Sampler,
    pub config: &'a TemperatureConfig,
    pub trend: Trend,
}

impl<'a> EntityContext<'a> {
    pub fn new(
        entity: EntityId,
        position: Position,
        age: u64,
        sampler: &'a dyn Sampler,
        config: &'a TemperatureConfig,
    ) -> Self {
        Self {
            entity,
            position,
            age,
            sampler,
            config,
            trend: Trend::Stable,
        }
    }

    /// Copy of this context carrying the given trend.
    #[must_use]
    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    /// Samples the configured source at the entity's position.
    pub fn sample(&self, kind: SampleKind) -> f64 {
        self.sampler.sample(self.entity, self.position, kind)
    }
}

impl core::fmt::Debug for EntityContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntityContext")
            .field("entity", &self.entity)
            .field("position", &self.position)
            .field("age", &self.age)
            .field("trend", &self.trend)
            .finish_non_exhaustive()
    }
}
