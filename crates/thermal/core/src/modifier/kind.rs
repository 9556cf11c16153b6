//! Built-in modifier kinds and their compute rules.
//!
//! Kinds are a tagged variant with payload. Matching by kind uses
//! [`ModifierKind::tag`], never type inspection.

use std::sync::Arc;

use super::context::{EntityContext, SampleKind, Trend};
use crate::channel::Channel;

/// Depth (in blocks) at which underground blending reaches full strength.
pub const UNDERGROUND_BLEND_DEPTH: f64 = 40.0;
/// Base-temperature heat added while burning.
pub const FIRE_HEAT: f64 = 10.0;
/// Base-temperature chill from a soul sprout.
pub const SOUL_SPROUT_CHILL: f64 = 15.0;
/// Fraction of the distance to the habitable midpoint covered per hearth level.
pub const HEARTH_STEP: f64 = 0.2;

/// Caller-supplied compute logic for [`ModifierKind::Custom`].
pub trait ModifierLogic: Send + Sync + core::fmt::Debug {
    /// Tag used for kind matching. Defaults to `"custom"`.
    fn tag(&self) -> &'static str {
        "custom"
    }

    /// Produces the new running value, or `NaN` for "no change".
    fn compute(&self, value: f64, ctx: &EntityContext<'_>, channel: Channel) -> f64;
}

/// The transform a modifier applies.
#[derive(Clone, Debug)]
pub enum ModifierKind {
    /// Adds the biome temperature sampled around the entity.
    Biome { samples: u32 },
    /// Blends toward the cave temperature the deeper the entity is.
    Underground,
    /// Adds heat from nearby blocks.
    Block { range: u32 },
    /// Adds the seasonal offset.
    Season,
    /// Adds the weather offset.
    Weather,
    /// Chills the entity while wet.
    Water { strength: f64 },
    /// Lowers base temperature while freezing.
    Freezing { chill: f64 },
    /// Raises base temperature while on fire.
    Fire,
    /// Pulls world temperature toward the habitable midpoint.
    Hearth { strength: u8 },
    /// One-shot core temperature change from food.
    Food { temperature: f64 },
    /// Lowers base temperature.
    SoulSprout,
    /// Slows temperature change while riding an insulated mount.
    Mount { warming: f64, cooling: f64 },
    /// Adds a constant.
    Offset(f64),
    /// Multiplies by a constant.
    Scale(f64),
    Custom(Arc<dyn ModifierLogic>),
}

impl ModifierKind {
    /// Stable tag for this kind, used for matching and registry ids.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Biome { .. } => "biome",
            Self::Underground => "underground",
            Self::Block { .. } => "block",
            Self::Season => "season",
            Self::Weather => "weather",
            Self::Water { .. } => "water",
            Self::Freezing { .. } => "freezing",
            Self::Fire => "fire",
            Self::Hearth { .. } => "hearth",
            Self::Food { .. } => "food",
            Self::SoulSprout => "soul_sprout",
            Self::Mount { .. } => "mount",
            Self::Offset(_) => "offset",
            Self::Scale(_) => "scale",
            Self::Custom(logic) => logic.tag(),
        }
    }

    /// Runs this kind's transform on `value`.
    pub fn compute(&self, value: f64, ctx: &EntityContext<'_>, channel: Channel) -> f64 {
        match self {
            Self::Biome { samples } => value + ctx.sample(SampleKind::Biome { samples: *samples }),
            Self::Block { range } => value + ctx.sample(SampleKind::Block { range: *range }),
            Self::Season => value + ctx.sample(SampleKind::Season),
            Self::Weather => value + ctx.sample(SampleKind::Weather),
            Self::Underground => {
                let depth = ctx.sample(SampleKind::Depth);
                if depth.is_nan() || depth <= 0.0 {
                    return f64::NAN;
                }
                let weight = (depth / UNDERGROUND_BLEND_DEPTH).min(1.0);
                value + (ctx.config.cave_temperature - value) * weight
            }
            Self::Water { strength } => value - strength,
            Self::Freezing { chill } => value - chill,
            Self::Fire => value + FIRE_HEAT,
            Self::Hearth { strength } => {
                let midpoint = (ctx.config.min_temp + ctx.config.max_temp) / 2.0;
                let weight = (f64::from(*strength) * HEARTH_STEP).min(1.0);
                value + (midpoint - value) * weight
            }
            Self::Food { temperature } => value + temperature,
            Self::SoulSprout => value - SOUL_SPROUT_CHILL,
            Self::Mount { warming, cooling } => {
                let insulation = match ctx.trend {
                    Trend::Cooling => *warming,
                    Trend::Warming => *cooling,
                    Trend::Stable => warming.max(*cooling),
                };
                value / (1.0 + insulation.max(0.0) / 10.0)
            }
            Self::Offset(delta) => value + delta,
            Self::Scale(factor) => value * factor,
            Self::Custom(logic) => logic.compute(value, ctx, channel),
        }
    }

    /// Payload numbers, in declaration order, for snapshots.
    pub fn payload(&self) -> Vec<f64> {
        match self {
            Self::Biome { samples } => vec![f64::from(*samples)],
            Self::Block { range } => vec![f64::from(*range)],
            Self::Water { strength } => vec![*strength],
            Self::Freezing { chill } => vec![*chill],
            Self::Hearth { strength } => vec![f64::from(*strength)],
            Self::Food { temperature } => vec![*temperature],
            Self::Mount { warming, cooling } => vec![*warming, *cooling],
            Self::Offset(value) | Self::Scale(value) => vec![*value],
            Self::Underground
            | Self::Season
            | Self::Weather
            | Self::Fire
            | Self::SoulSprout
            | Self::Custom(_) => Vec::new(),
        }
    }
}
