//! Temperature unit conversion.
//!
//! Simulation math runs in [`Units::Mc`], the internal unit. Celsius and
//! Fahrenheit only appear at the edges (config files, display).

use crate::error::TemperatureError;

/// Scale used when reading or displaying a temperature.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Units {
    /// Fahrenheit.
    F,
    /// Celsius.
    C,
    /// Internal simulation unit.
    #[default]
    Mc,
}

impl Units {
    /// One internal unit expressed in degrees Celsius.
    pub const MC_PER_CELSIUS: f64 = 23.333333333;
    /// One internal unit expressed in degrees Fahrenheit.
    pub const MC_PER_FAHRENHEIT: f64 = 42.0;

    /// Symbol suitable for display next to a value.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::F => "°F",
            Self::C => "°C",
            Self::Mc => "MC",
        }
    }

    /// Parses a unit id, mapping failures onto [`TemperatureError`].
    pub fn parse(id: &str) -> Result<Self, TemperatureError> {
        id.parse()
            .map_err(|_| TemperatureError::UnknownUnits(id.to_string()))
    }
}

/// Converts `value` from one unit to another.
///
/// `absolute` only matters between Fahrenheit and the internal unit: an
/// absolute temperature carries the 32° offset, a relative delta does not.
/// Non-finite inputs propagate unchanged through the formulas.
pub fn convert_units(value: f64, from: Units, to: Units, absolute: bool) -> f64 {
    let offset = if absolute { 32.0 } else { 0.0 };
    match (from, to) {
        (Units::C, Units::C) | (Units::F, Units::F) | (Units::Mc, Units::Mc) => value,
        (Units::C, Units::F) => value * 1.8 + 32.0,
        (Units::C, Units::Mc) => value / Units::MC_PER_CELSIUS,
        (Units::F, Units::C) => (value - 32.0) / 1.8,
        (Units::F, Units::Mc) => (value - offset) / Units::MC_PER_FAHRENHEIT,
        (Units::Mc, Units::C) => value * Units::MC_PER_CELSIUS,
        (Units::Mc, Units::F) => value * Units::MC_PER_FAHRENHEIT + offset,
    }
}
