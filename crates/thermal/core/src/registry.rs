//! Registered modifier ids and their factories.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::modifier::{Modifier, ModifierId, ModifierKind};

type Factory = Arc<dyn Fn() -> Modifier + Send + Sync>;

/// Default sample count for a registry-built biome modifier.
pub const DEFAULT_BIOME_SAMPLES: u32 = 9;
/// Default search range for a registry-built block modifier.
pub const DEFAULT_BLOCK_RANGE: u32 = 7;

/// Maps modifier ids to factories producing fresh instances.
///
/// Modifiers added by id must be registered; anything else is rejected by the
/// registry-aware insert paths.
#[derive(Clone, Default)]
pub struct ModifierRegistry {
    factories: BTreeMap<ModifierId, Factory>,
}

impl ModifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind under its `thermal:<tag>` id.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins = [
            ModifierKind::Biome {
                samples: DEFAULT_BIOME_SAMPLES,
            },
            ModifierKind::Underground,
            ModifierKind::Block {
                range: DEFAULT_BLOCK_RANGE,
            },
            ModifierKind::Season,
            ModifierKind::Weather,
            ModifierKind::Water { strength: 0.01 },
            ModifierKind::Freezing { chill: 0.0 },
            ModifierKind::Fire,
            ModifierKind::Hearth { strength: 1 },
            ModifierKind::Food { temperature: 0.0 },
            ModifierKind::SoulSprout,
            ModifierKind::Mount {
                warming: 0.0,
                cooling: 0.0,
            },
            ModifierKind::Offset(0.0),
            ModifierKind::Scale(1.0),
        ];
        for kind in builtins {
            registry.register_kind(kind);
        }
        registry
    }

    /// Registers `factory` under `id`, replacing any previous registration.
    pub fn register(
        &mut self,
        id: impl Into<ModifierId>,
        factory: impl Fn() -> Modifier + Send + Sync + 'static,
    ) -> &mut Self {
        self.factories.insert(id.into(), Arc::new(factory));
        self
    }

    /// Registers a built-in kind under its default id.
    pub fn register_kind(&mut self, kind: ModifierKind) -> &mut Self {
        let id = ModifierId::builtin(kind.tag());
        self.register(id, move || Modifier::new(kind.clone()))
    }

    pub fn unregister(&mut self, id: &ModifierId) -> bool {
        self.factories.remove(id).is_some()
    }

    pub fn contains(&self, id: &ModifierId) -> bool {
        self.factories.contains_key(id)
    }

    /// Builds a fresh modifier for `id`, or `None` when unregistered.
    pub fn create(&self, id: &ModifierId) -> Option<Modifier> {
        self.factories.get(id).map(|factory| factory())
    }

    pub fn ids(&self) -> impl Iterator<Item = &ModifierId> {
        self.factories.keys()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl core::fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_include_compat_ids() {
        let registry = ModifierRegistry::with_builtins();
        assert!(registry.contains(&"thermal:season".into()));
        assert!(registry.contains(&"thermal:weather".into()));
        assert!(!registry.contains(&"thermal:unknown".into()));

        let biome = registry.create(&"thermal:biome".into()).unwrap();
        assert_eq!(biome.tag(), "biome");
        assert!(biome.is_fresh());
    }

    #[test]
    fn custom_registration_and_removal() {
        let mut registry = ModifierRegistry::new();
        registry.register("mod:sauna", || {
            Modifier::with_id("mod:sauna", ModifierKind::Offset(0.3))
        });
        let id = ModifierId::from("mod:sauna");
        assert_eq!(registry.create(&id).map(|m| m.id().clone()), Some(id.clone()));
        assert!(registry.unregister(&id));
        assert!(registry.create(&id).is_none());
        assert!(registry.is_empty());
    }
}
