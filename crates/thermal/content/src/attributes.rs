//! Static attribute modifiers keyed by entity and channel.

use thermal_core::{
    AttributeModifier, AttributeSource, AttributeStack, Channel, EntityId,
};

/// Attribute modifiers for one channel of one entity, or of every entity
/// when `entity` is `None`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeEntry {
    #[cfg_attr(feature = "serde", serde(default))]
    pub entity: Option<EntityId>,
    pub channel: Channel,
    pub modifiers: Vec<AttributeModifier>,
}

/// Table-backed [`AttributeSource`]. Matching entries are concatenated in
/// file order, so global entries listed first apply first.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeTable {
    #[cfg_attr(feature = "serde", serde(default))]
    pub entries: Vec<AttributeEntry>,
}

impl AttributeTable {
    pub fn new(entries: Vec<AttributeEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AttributeSource for AttributeTable {
    fn stack(&self, entity: EntityId, channel: Channel) -> AttributeStack {
        self.entries
            .iter()
            .filter(|entry| entry.channel == channel && entry.entity.is_none_or(|id| id == entity))
            .flat_map(|entry| entry.modifiers.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use thermal_core::AttributeOperation;

    use super::*;

    #[test]
    fn global_and_entity_entries_concatenate() {
        let table = AttributeTable::new(vec![
            AttributeEntry {
                entity: None,
                channel: Channel::Core,
                modifiers: vec![AttributeModifier::new(AttributeOperation::Addition, 1.0)],
            },
            AttributeEntry {
                entity: Some(EntityId(7)),
                channel: Channel::Core,
                modifiers: vec![AttributeModifier::new(AttributeOperation::MultiplyTotal, 3.0)],
            },
        ]);

        assert_eq!(table.stack(EntityId(7), Channel::Core).apply(1.0), 6.0);
        assert_eq!(table.stack(EntityId(8), Channel::Core).apply(1.0), 2.0);
        assert!(table.stack(EntityId(7), Channel::World).is_empty());
    }
}
