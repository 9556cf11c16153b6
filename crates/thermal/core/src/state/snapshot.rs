//! Plain-data views of temperature state for sync and inspection.

use arrayvec::ArrayVec;
use sha2::{Digest, Sha256};

use crate::channel::Channel;
use crate::modifier::Modifier;

/// One modifier as shipped to observers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierSnapshot {
    pub id: String,
    pub tag: String,
    pub payload: Vec<f64>,
    pub refresh_rate: u32,
    /// `-1` for modifiers that never expire.
    pub expire_ticks: i64,
    pub ticks_existed: u32,
    pub last_result: f64,
}

impl From<&Modifier> for ModifierSnapshot {
    fn from(modifier: &Modifier) -> Self {
        Self {
            id: modifier.id().to_string(),
            tag: modifier.tag().to_string(),
            payload: modifier.kind().payload(),
            refresh_rate: modifier.refresh(),
            expire_ticks: modifier.lifetime().as_ticks(),
            ticks_existed: modifier.ticks_existed(),
            last_result: modifier.last_result(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainSnapshot {
    pub channel: Channel,
    pub modifiers: Vec<ModifierSnapshot>,
}

/// Stored scalars plus every modifier chain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureSnapshot {
    pub world: f64,
    pub freezing_point: f64,
    pub burning_point: f64,
    pub core: f64,
    pub base: f64,
    pub chains: ArrayVec<ChainSnapshot, 6>,
}

impl TemperatureSnapshot {
    pub fn body(&self) -> f64 {
        self.core + self.base
    }

    /// Stored scalars in [`Channel::STORED`] order.
    pub fn values(&self) -> [f64; 5] {
        [
            self.world,
            self.freezing_point,
            self.burning_point,
            self.core,
            self.base,
        ]
    }

    pub fn chain(&self, channel: Channel) -> Option<&ChainSnapshot> {
        self.chains.iter().find(|chain| chain.channel == channel)
    }

    /// SHA-256 over the structural identity of every chain.
    ///
    /// Covers ids, tags, payloads, refresh rates and expiries in chain order. Tick
    /// counters and cached results are excluded so ageing alone does not
    /// change the digest.
    pub fn modifier_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for chain in &self.chains {
            hasher.update(chain.channel.as_ref().as_bytes());
            hasher.update((chain.modifiers.len() as u32).to_le_bytes());
            for modifier in &chain.modifiers {
                hasher.update(modifier.id.as_bytes());
                hasher.update([0]);
                hasher.update(modifier.tag.as_bytes());
                hasher.update([0]);
                hasher.update(modifier.refresh_rate.to_le_bytes());
                hasher.update(modifier.expire_ticks.to_le_bytes());
                for value in &modifier.payload {
                    hasher.update(value.to_le_bytes());
                }
            }
        }
        hasher.finalize().into()
    }
}
