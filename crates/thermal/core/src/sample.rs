//! Data-driven [`Sampler`] backed by defaults and axis-aligned regions.
//!
//! Regions are checked last to first, so later entries override earlier ones.
//! A field left as `None` falls through to the next region and finally to the
//! table defaults; a value missing everywhere samples as `NaN`.

use crate::modifier::{EntityId, Position, SampleKind, Sampler};

/// Raw values for each [`SampleKind`]. `surface` is the sky height used to
/// derive depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SampleValues {
    pub biome: Option<f64>,
    pub surface: Option<f64>,
    pub block: Option<f64>,
    pub weather: Option<f64>,
    pub season: Option<f64>,
}

impl SampleValues {
    fn field(&self, kind: SampleKind) -> Option<f64> {
        match kind {
            SampleKind::Biome { .. } => self.biome,
            SampleKind::Depth => self.surface,
            SampleKind::Block { .. } => self.block,
            SampleKind::Weather => self.weather,
            SampleKind::Season => self.season,
        }
    }
}

/// Inclusive box overriding some sample values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleRegion {
    pub name: String,
    pub min: Position,
    pub max: Position,
    pub values: SampleValues,
}

impl SampleRegion {
    pub fn contains(&self, position: Position) -> bool {
        (self.min.x..=self.max.x).contains(&position.x)
            && (self.min.y..=self.max.y).contains(&position.y)
            && (self.min.z..=self.max.z).contains(&position.z)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SampleTable {
    pub defaults: SampleValues,
    pub regions: Vec<SampleRegion>,
}

impl SampleTable {
    pub fn new(defaults: SampleValues) -> Self {
        Self {
            defaults,
            regions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: SampleRegion) -> Self {
        self.regions.push(region);
        self
    }

    fn lookup(&self, position: Position, kind: SampleKind) -> Option<f64> {
        self.regions
            .iter()
            .rev()
            .filter(|region| region.contains(position))
            .find_map(|region| region.values.field(kind))
            .or_else(|| self.defaults.field(kind))
    }
}

impl Sampler for SampleTable {
    fn sample(&self, _entity: EntityId, position: Position, kind: SampleKind) -> f64 {
        match (kind, self.lookup(position, kind)) {
            (SampleKind::Depth, Some(surface)) => surface - position.y,
            (_, Some(value)) => value,
            (_, None) => f64::NAN,
        }
    }
}
