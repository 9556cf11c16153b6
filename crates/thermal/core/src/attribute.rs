//! Attribute modifier composition layered on top of chain results.
//!
//! After a chain has produced a channel value, external attribute modifiers
//! (equipment, potions, host systems) get the final word. Operations are
//! applied strictly in the order the source lists them:
//!
//! - **Addition**: `value + amount`
//! - **MultiplyBase**: `value * (1 + amount)`
//! - **MultiplyTotal**: `value * amount`
//!
//! Unknown operation codes are skipped so newer hosts can ship operations
//! this crate does not understand.

use crate::channel::Channel;
use crate::modifier::EntityId;

/// Channels composited each tick, in composition order.
pub const ATTRIBUTE_CHANNELS: [Channel; 5] = [
    Channel::World,
    Channel::Core,
    Channel::Base,
    Channel::BurningPoint,
    Channel::FreezingPoint,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeOperation {
    Addition,
    MultiplyBase,
    MultiplyTotal,
    Unknown(u8),
}

impl AttributeOperation {
    /// Maps the host's numeric operation code (0, 1, 2).
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Addition,
            1 => Self::MultiplyBase,
            2 => Self::MultiplyTotal,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeModifier {
    pub operation: AttributeOperation,
    pub amount: f64,
}

impl AttributeModifier {
    pub const fn new(operation: AttributeOperation, amount: f64) -> Self {
        Self { operation, amount }
    }

    fn apply(&self, value: f64) -> f64 {
        match self.operation {
            AttributeOperation::Addition => value + self.amount,
            AttributeOperation::MultiplyBase => value * (1.0 + self.amount),
            AttributeOperation::MultiplyTotal => value * self.amount,
            AttributeOperation::Unknown(_) => value,
        }
    }
}

/// Ordered attribute modifiers for one channel.
///
/// # Example
/// ```
/// # use thermal_core::attribute::AttributeStack;
/// let stack = AttributeStack::new().add(5.0).multiply_base(1.0).multiply_total(0.5);
/// assert_eq!(stack.apply(10.0), 15.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeStack {
    modifiers: Vec<AttributeModifier>,
}

impl AttributeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: AttributeModifier) {
        self.modifiers.push(modifier);
    }

    pub fn extend(&mut self, modifiers: impl IntoIterator<Item = AttributeModifier>) {
        self.modifiers.extend(modifiers);
    }

    #[must_use]
    pub fn add(mut self, amount: f64) -> Self {
        self.push(AttributeModifier::new(AttributeOperation::Addition, amount));
        self
    }

    #[must_use]
    pub fn multiply_base(mut self, amount: f64) -> Self {
        self.push(AttributeModifier::new(AttributeOperation::MultiplyBase, amount));
        self
    }

    #[must_use]
    pub fn multiply_total(mut self, amount: f64) -> Self {
        self.push(AttributeModifier::new(AttributeOperation::MultiplyTotal, amount));
        self
    }

    /// Folds every modifier over `base` in list order.
    pub fn apply(&self, base: f64) -> f64 {
        self.modifiers
            .iter()
            .fold(base, |value, modifier| modifier.apply(value))
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }
}

impl FromIterator<AttributeModifier> for AttributeStack {
    fn from_iter<I: IntoIterator<Item = AttributeModifier>>(iter: I) -> Self {
        Self {
            modifiers: iter.into_iter().collect(),
        }
    }
}

/// Applies `stacks[i]` to `values[i]` for every channel.
pub fn compose<const N: usize>(values: [f64; N], stacks: &[AttributeStack; N]) -> [f64; N] {
    let mut out = values;
    for (value, stack) in out.iter_mut().zip(stacks) {
        *value = stack.apply(*value);
    }
    out
}

/// Supplies attribute modifiers per (entity, channel). Re-read every tick.
pub trait AttributeSource: Send + Sync {
    fn stack(&self, entity: EntityId, channel: Channel) -> AttributeStack;

    /// Stacks for [`ATTRIBUTE_CHANNELS`], in order.
    fn stacks(&self, entity: EntityId) -> [AttributeStack; 5] {
        ATTRIBUTE_CHANNELS.map(|channel| self.stack(entity, channel))
    }
}

/// Source with no attribute modifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAttributes;

impl AttributeSource for NoAttributes {
    fn stack(&self, _entity: EntityId, _channel: Channel) -> AttributeStack {
        AttributeStack::new()
    }
}
