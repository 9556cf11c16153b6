//! Hook that pins modifiers in place.

use std::collections::BTreeSet;

use thermal_core::{Modifier, ModifierId};

use super::{HookContext, ModifierHook};

/// Vetoes caller-driven removal of the listed modifier ids.
///
/// Expiry still evicts protected modifiers.
#[derive(Debug, Clone, Default)]
pub struct ProtectModifiersHook {
    ids: BTreeSet<ModifierId>,
}

impl ProtectModifiersHook {
    pub fn new(ids: impl IntoIterator<Item = ModifierId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn protects(&self, id: &ModifierId) -> bool {
        self.ids.contains(id)
    }
}

impl ModifierHook for ProtectModifiersHook {
    fn name(&self) -> &'static str {
        "protect_modifiers"
    }

    fn priority(&self) -> i32 {
        -10
    }

    fn allow_remove(&self, _ctx: &HookContext, modifier: &Modifier) -> bool {
        !self.protects(modifier.id())
    }
}
