//! Insertion descriptors for modifier chains.

use std::sync::Arc;

use crate::modifier::{Modifier, ModifierId};

/// What to do relative to the matched entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    Before,
    After,
    /// Overwrite the match; reject when nothing matches.
    Replace,
    /// Overwrite the match; append when nothing matches.
    ReplaceOrAdd,
}

impl Placement {
    pub const fn is_replace(self) -> bool {
        matches!(self, Self::Replace | Self::ReplaceOrAdd)
    }
}

/// Which end of the chain the target scan starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    First,
    Last,
}

/// Predicate selecting an existing chain entry.
#[derive(Clone)]
pub enum ModifierMatch {
    Any,
    Id(ModifierId),
    /// Matches by kind tag (`"biome"`, `"hearth"`, ...).
    Kind(&'static str),
    Predicate(Arc<dyn Fn(&Modifier) -> bool + Send + Sync>),
}

impl ModifierMatch {
    pub fn predicate(f: impl Fn(&Modifier) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, modifier: &Modifier) -> bool {
        match self {
            Self::Any => true,
            Self::Id(id) => modifier.id() == id,
            Self::Kind(tag) => modifier.tag() == *tag,
            Self::Predicate(f) => f(modifier),
        }
    }
}

impl core::fmt::Debug for ModifierMatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Kind(tag) => f.debug_tuple("Kind").field(tag).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Where a new modifier goes: placement, scan anchor and target.
#[derive(Clone, Debug)]
pub struct Addition {
    pub placement: Placement,
    pub anchor: Anchor,
    pub target: ModifierMatch,
}

impl Addition {
    pub fn new(placement: Placement, anchor: Anchor, target: ModifierMatch) -> Self {
        Self {
            placement,
            anchor,
            target,
        }
    }

    /// Append after the last entry.
    pub fn at_end() -> Self {
        Self::new(Placement::After, Anchor::Last, ModifierMatch::Any)
    }

    /// Prepend before the first entry.
    pub fn at_start() -> Self {
        Self::new(Placement::Before, Anchor::First, ModifierMatch::Any)
    }

    /// Overwrite the first entry with `id`, or append.
    pub fn replace_or_add(id: impl Into<ModifierId>) -> Self {
        Self::new(
            Placement::ReplaceOrAdd,
            Anchor::First,
            ModifierMatch::Id(id.into()),
        )
    }

    /// Overwrite the first entry with `id`, or reject.
    pub fn replace(id: impl Into<ModifierId>) -> Self {
        Self::new(Placement::Replace, Anchor::First, ModifierMatch::Id(id.into()))
    }

    /// Insert right after the first entry with the given kind tag.
    pub fn after_kind(tag: &'static str) -> Self {
        Self::new(Placement::After, Anchor::First, ModifierMatch::Kind(tag))
    }

    /// Insert right before the first entry with the given kind tag.
    pub fn before_kind(tag: &'static str) -> Self {
        Self::new(Placement::Before, Anchor::First, ModifierMatch::Kind(tag))
    }
}

impl Default for Addition {
    fn default() -> Self {
        Self::at_end()
    }
}

/// Why an insert did not touch the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
    /// The id is already present and duplicates were not allowed.
    Duplicate,
    /// `Replace` found nothing to overwrite.
    NoReplaceTarget,
    /// The id is not known to the modifier registry.
    Unregistered,
    /// The entity has no temperature state.
    NoChain,
    /// A hook cancelled the insert.
    Vetoed,
}

/// Result of inserting into a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InsertOutcome {
    Inserted { index: usize },
    Replaced { index: usize },
    Appended { index: usize },
    Rejected(Rejection),
}

impl InsertOutcome {
    /// True when the chain was mutated.
    pub const fn is_changed(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Inserted { index } | Self::Replaced { index } | Self::Appended { index } => {
                Some(*index)
            }
            Self::Rejected(_) => None,
        }
    }
}
