//! Temperature thresholds and per-item / per-entity tables.
use std::collections::BTreeMap;

/// Optional integrations with world systems that may not exist in every host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompatSettings {
    /// Adds the `thermal:season` modifier to default chains.
    pub seasons: bool,
    /// Adds the `thermal:weather` modifier to default chains.
    pub weather: bool,
}

/// Insulation granted while riding a given entity type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountInsulation {
    pub entity: String,
    pub warming: f64,
    pub cooling: f64,
}

/// Tunable temperature parameters. All temperatures are in Mc units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TemperatureConfig {
    /// Lower bound of the habitable world temperature.
    pub min_temp: f64,
    /// Upper bound of the habitable world temperature.
    pub max_temp: f64,
    /// Scales how fast core temperature moves.
    pub rate_multiplier: f64,
    /// Core temperature is clamped to `±core_limit`.
    pub core_limit: f64,
    /// Body temperature magnitude at which hazards apply.
    pub damage_threshold: f64,
    /// World temperature deep underground.
    pub cave_temperature: f64,
    /// Refuse sleep when the sleeper is too hot or too cold.
    pub check_sleep_conditions: bool,
    /// Core temperature change when an item is eaten, keyed by item id.
    pub food_temperatures: BTreeMap<String, f64>,
    pub insulated_mounts: Vec<MountInsulation>,
    pub compat: CompatSettings,
    /// Ticks between forced modifier resyncs for players.
    pub modifier_resync_interval: u64,
}

impl TemperatureConfig {
    // ===== runtime-tunable defaults =====
    /// 50 °F.
    pub const DEFAULT_MIN_TEMP: f64 = (50.0 - 32.0) / 42.0;
    /// 100 °F.
    pub const DEFAULT_MAX_TEMP: f64 = (100.0 - 32.0) / 42.0;
    /// 65 °F.
    pub const DEFAULT_CAVE_TEMPERATURE: f64 = (65.0 - 32.0) / 42.0;
    pub const DEFAULT_RATE_MULTIPLIER: f64 = 1.0;
    pub const DEFAULT_CORE_LIMIT: f64 = 150.0;
    pub const DEFAULT_DAMAGE_THRESHOLD: f64 = 100.0;
    pub const DEFAULT_MODIFIER_RESYNC_INTERVAL: u64 = 60;

    pub fn new() -> Self {
        Self {
            min_temp: Self::DEFAULT_MIN_TEMP,
            max_temp: Self::DEFAULT_MAX_TEMP,
            rate_multiplier: Self::DEFAULT_RATE_MULTIPLIER,
            core_limit: Self::DEFAULT_CORE_LIMIT,
            damage_threshold: Self::DEFAULT_DAMAGE_THRESHOLD,
            cave_temperature: Self::DEFAULT_CAVE_TEMPERATURE,
            check_sleep_conditions: true,
            food_temperatures: BTreeMap::new(),
            insulated_mounts: Vec::new(),
            compat: CompatSettings::default(),
            modifier_resync_interval: Self::DEFAULT_MODIFIER_RESYNC_INTERVAL,
        }
    }

    /// Core temperature change granted by eating `item`.
    pub fn food_temperature(&self, item: &str) -> Option<f64> {
        self.food_temperatures.get(item).copied()
    }

    /// Insulation for riding `entity`, if configured.
    pub fn mount_insulation(&self, entity: &str) -> Option<&MountInsulation> {
        self.insulated_mounts
            .iter()
            .find(|mount| mount.entity == entity)
    }

    /// Habitable range after the entity's threshold offsets.
    pub fn thresholds(&self, freezing_point: f64, burning_point: f64) -> (f64, f64) {
        (self.min_temp + freezing_point, self.max_temp + burning_point)
    }
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bracket_the_habitable_range() {
        let config = TemperatureConfig::default();
        assert!(config.min_temp < config.cave_temperature);
        assert!(config.cave_temperature < config.max_temp);
        assert_eq!(config.thresholds(0.5, -0.5), (config.min_temp + 0.5, config.max_temp - 0.5));
    }

    #[test]
    fn table_lookups() {
        let mut config = TemperatureConfig::default();
        config.food_temperatures.insert("stew".into(), 0.4);
        config.insulated_mounts.push(MountInsulation {
            entity: "strider".into(),
            warming: 0.0,
            cooling: 40.0,
        });
        assert_eq!(config.food_temperature("stew"), Some(0.4));
        assert_eq!(config.food_temperature("bread"), None);
        assert_eq!(config.mount_insulation("strider").map(|m| m.cooling), Some(40.0));
        assert!(config.mount_insulation("horse").is_none());
    }
}
