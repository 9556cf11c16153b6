//! Hook registry for managing and running modifier hooks.

use std::sync::Arc;

use thermal_core::Modifier;
use tracing::debug;

use super::{HookContext, HookDecision, ModifierHook};

/// Registry that runs modifier hooks in priority order.
///
/// Cloning is cheap; the worker and builders share the same sorted slice.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Arc<[Arc<dyn ModifierHook>]>,
}

impl HookRegistry {
    /// Creates a registry. Hooks are sorted by priority (lower values first).
    pub fn new(mut hooks: Vec<Arc<dyn ModifierHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    /// Runs every hook over a pending add.
    ///
    /// Returns the modifier to insert, or `None` when a hook cancelled it.
    pub fn before_add(&self, ctx: &HookContext, mut modifier: Modifier) -> Option<Modifier> {
        for hook in self.hooks.iter() {
            match hook.before_add(ctx, &modifier) {
                HookDecision::Proceed => {}
                HookDecision::Replace(replacement) => {
                    debug!(
                        target: "runtime::hooks",
                        hook = hook.name(),
                        entity = %ctx.entity,
                        from = %modifier.id(),
                        to = %replacement.id(),
                        "Hook replaced modifier"
                    );
                    modifier = replacement;
                }
                HookDecision::Cancel => {
                    debug!(
                        target: "runtime::hooks",
                        hook = hook.name(),
                        entity = %ctx.entity,
                        modifier = %modifier.id(),
                        "Hook cancelled modifier add"
                    );
                    return None;
                }
            }
        }
        Some(modifier)
    }

    /// Returns true when no hook vetoes removing `modifier`.
    pub fn allow_remove(&self, ctx: &HookContext, modifier: &Modifier) -> bool {
        match self.hooks.iter().find(|h| !h.allow_remove(ctx, modifier)) {
            Some(hook) => {
                debug!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    entity = %ctx.entity,
                    modifier = %modifier.id(),
                    "Hook vetoed modifier removal"
                );
                false
            }
            None => true,
        }
    }

    /// Returns the number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over hook names and priorities (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::ProtectModifiersHook;
    use thermal_core::{Channel, EntityId, ModifierId, ModifierKind, TrackedKind};

    struct Strengthen;

    impl ModifierHook for Strengthen {
        fn name(&self) -> &'static str {
            "strengthen"
        }

        fn before_add(&self, _ctx: &HookContext, modifier: &Modifier) -> HookDecision {
            match modifier.kind() {
                ModifierKind::Water { strength } => HookDecision::Replace(Modifier::new(
                    ModifierKind::Water {
                        strength: strength * 2.0,
                    },
                )),
                _ => HookDecision::Proceed,
            }
        }
    }

    struct NoFire;

    impl ModifierHook for NoFire {
        fn name(&self) -> &'static str {
            "no_fire"
        }

        fn priority(&self) -> i32 {
            5
        }

        fn before_add(&self, _ctx: &HookContext, modifier: &Modifier) -> HookDecision {
            if modifier.tag() == "fire" {
                HookDecision::Cancel
            } else {
                HookDecision::Proceed
            }
        }
    }

    fn ctx() -> HookContext {
        HookContext {
            entity: EntityId(1),
            kind: TrackedKind::Player,
            channel: Channel::World,
            tick: 0,
            chain_len: 0,
        }
    }

    #[test]
    fn hooks_run_in_priority_order() {
        let registry = HookRegistry::new(vec![
            Arc::new(NoFire),
            Arc::new(Strengthen),
            Arc::new(ProtectModifiersHook::default()),
        ]);
        let names: Vec<_> = registry.hooks().map(|(name, _)| name).collect();
        assert_eq!(names, ["protect_modifiers", "strengthen", "no_fire"]);
    }

    #[test]
    fn replacements_and_cancels_apply() {
        let registry = HookRegistry::new(vec![Arc::new(Strengthen), Arc::new(NoFire)]);

        let water = Modifier::new(ModifierKind::Water { strength: 0.01 });
        let added = registry.before_add(&ctx(), water).unwrap();
        assert_eq!(added.kind().payload(), vec![0.02]);

        assert!(registry.before_add(&ctx(), Modifier::new(ModifierKind::Fire)).is_none());
    }

    #[test]
    fn protected_ids_veto_removal() {
        let registry = HookRegistry::new(vec![Arc::new(ProtectModifiersHook::new([
            ModifierId::builtin("soul_sprout"),
        ]))]);
        let sprout = Modifier::new(ModifierKind::SoulSprout);
        let fire = Modifier::new(ModifierKind::Fire);
        assert!(!registry.allow_remove(&ctx(), &sprout));
        assert!(registry.allow_remove(&ctx(), &fire));
    }
}
