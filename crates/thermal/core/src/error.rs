//! Error types for thermal-core.
//!
//! Nothing in the pipeline is fatal. Errors are returned for writes the state
//! refuses (derived or modifier-only channels) and for ids that do not parse;
//! the caller decides whether to log and carry on.

use crate::channel::Channel;

/// Rejections surfaced by temperature state and id parsing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TemperatureError {
    /// The channel is computed from other channels and cannot be written.
    #[error("channel {0} is derived and cannot be written")]
    ReadOnlyChannel(Channel),

    /// The channel only exists as a modifier chain and has no stored value.
    #[error("channel {0} has no stored value")]
    NotStored(Channel),

    #[error("unknown temperature channel \"{0}\"")]
    UnknownChannel(String),

    #[error("unknown temperature units \"{0}\"")]
    UnknownUnits(String),
}

impl TemperatureError {
    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ReadOnlyChannel(_) => "read_only_channel",
            Self::NotStored(_) => "not_stored",
            Self::UnknownChannel(_) => "unknown_channel",
            Self::UnknownUnits(_) => "unknown_units",
        }
    }
}
