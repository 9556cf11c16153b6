//! Temperature channels and channel sets.

use bitflags::bitflags;

use crate::error::TemperatureError;

/// One named temperature quantity tracked for an entity.
///
/// - [`Channel::World`]: ambient temperature around the entity, produced by modifiers.
/// - [`Channel::FreezingPoint`]: offset applied to the lower habitable threshold.
/// - [`Channel::BurningPoint`]: offset applied to the upper habitable threshold.
/// - [`Channel::Core`]: the integrated body temperature.
/// - [`Channel::Base`]: a static offset on top of the core temperature.
/// - [`Channel::Body`]: `Core + Base`, derived at read time and never stored.
/// - [`Channel::Rate`]: modifier-only channel scaling how fast core temperature moves.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Channel {
    World,
    FreezingPoint,
    BurningPoint,
    Core,
    Base,
    Body,
    Rate,
}

impl Channel {
    /// Channels that hold a stored scalar, in storage order.
    pub const STORED: [Channel; 5] = [
        Channel::World,
        Channel::FreezingPoint,
        Channel::BurningPoint,
        Channel::Core,
        Channel::Base,
    ];

    /// Channels that own a modifier chain, in chain order.
    pub const MODIFIABLE: [Channel; 6] = [
        Channel::World,
        Channel::FreezingPoint,
        Channel::BurningPoint,
        Channel::Core,
        Channel::Base,
        Channel::Rate,
    ];

    /// Parses a channel id such as `"freezing_point"`.
    pub fn parse(id: &str) -> Result<Self, TemperatureError> {
        id.parse()
            .map_err(|_| TemperatureError::UnknownChannel(id.to_string()))
    }

    /// Index into [`Channel::STORED`], or `None` for derived / modifier-only channels.
    pub const fn stored_index(self) -> Option<usize> {
        match self {
            Self::World => Some(0),
            Self::FreezingPoint => Some(1),
            Self::BurningPoint => Some(2),
            Self::Core => Some(3),
            Self::Base => Some(4),
            Self::Body | Self::Rate => None,
        }
    }

    /// Index into [`Channel::MODIFIABLE`], or `None` for [`Channel::Body`].
    pub const fn chain_index(self) -> Option<usize> {
        match self {
            Self::World => Some(0),
            Self::FreezingPoint => Some(1),
            Self::BurningPoint => Some(2),
            Self::Core => Some(3),
            Self::Base => Some(4),
            Self::Rate => Some(5),
            Self::Body => None,
        }
    }

    /// Returns true if the channel is derived from others and cannot be written.
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Body)
    }

    /// Bit for this channel inside a [`ChannelSet`].
    pub const fn flag(self) -> ChannelSet {
        match self {
            Self::World => ChannelSet::WORLD,
            Self::FreezingPoint => ChannelSet::FREEZING_POINT,
            Self::BurningPoint => ChannelSet::BURNING_POINT,
            Self::Core => ChannelSet::CORE,
            Self::Base => ChannelSet::BASE,
            Self::Rate => ChannelSet::RATE,
            Self::Body => ChannelSet::empty(),
        }
    }
}

bitflags! {
    /// Set of chain-bearing channels, used to record which chains changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ChannelSet: u8 {
        const WORLD          = 1 << 0;
        const FREEZING_POINT = 1 << 1;
        const BURNING_POINT  = 1 << 2;
        const CORE           = 1 << 3;
        const BASE           = 1 << 4;
        const RATE           = 1 << 5;
    }
}

impl ChannelSet {
    /// Iterates the channels contained in this set, in chain order.
    pub fn channels(self) -> impl Iterator<Item = Channel> {
        Channel::MODIFIABLE
            .into_iter()
            .filter(move |channel| self.contains(channel.flag()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn ids_round_trip() {
        for channel in Channel::iter() {
            assert_eq!(Channel::parse(channel.as_ref()).unwrap(), channel);
        }
        assert_eq!(Channel::FreezingPoint.to_string(), "freezing_point");
        assert!(Channel::parse("ambient").is_err());
    }

    #[test]
    fn indices_cover_their_tables() {
        for (i, channel) in Channel::STORED.iter().enumerate() {
            assert_eq!(channel.stored_index(), Some(i));
        }
        for (i, channel) in Channel::MODIFIABLE.iter().enumerate() {
            assert_eq!(channel.chain_index(), Some(i));
        }
        assert_eq!(Channel::Body.stored_index(), None);
        assert_eq!(Channel::Rate.stored_index(), None);
        assert_eq!(Channel::Body.chain_index(), None);
    }

    #[test]
    fn channel_set_iterates_in_chain_order() {
        let set = Channel::Rate.flag() | Channel::World.flag() | Channel::Body.flag();
        let channels: Vec<_> = set.channels().collect();
        assert_eq!(channels, vec![Channel::World, Channel::Rate]);
    }
}
