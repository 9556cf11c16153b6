//! Ordered modifier chains.
//!
//! A chain is folded left to right once per tick. Order is meaningful, so
//! every insert goes through an [`Addition`] that names where the new entry
//! lands relative to an existing one.
mod addition;

use std::ops::ControlFlow;

pub use addition::{Addition, Anchor, InsertOutcome, ModifierMatch, Placement, Rejection};

use crate::channel::Channel;
use crate::modifier::{EntityContext, Modifier, ModifierId, ModifierKind};

/// Folds `modifiers` over `initial`. `NaN` steps leave the accumulator alone.
pub fn apply_modifiers(
    initial: f64,
    ctx: &EntityContext<'_>,
    channel: Channel,
    modifiers: &mut [Modifier],
) -> f64 {
    modifiers.iter_mut().fold(initial, |value, modifier| {
        let next = modifier.evaluate(value, ctx, channel);
        if next.is_nan() { value } else { next }
    })
}

/// Ordered modifiers for one (entity, channel) pair.
#[derive(Clone, Debug, Default)]
pub struct ModifierChain {
    modifiers: Vec<Modifier>,
}

impl ModifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_modifiers(modifiers: Vec<Modifier>) -> Self {
        Self { modifiers }
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn clear(&mut self) {
        self.modifiers.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ModifierId> {
        self.modifiers.iter().map(Modifier::id)
    }

    pub fn contains_id(&self, id: &ModifierId) -> bool {
        self.modifiers.iter().any(|modifier| modifier.id() == id)
    }

    /// First entry matching `target`.
    pub fn find(&self, target: &ModifierMatch) -> Option<&Modifier> {
        self.modifiers.iter().find(|modifier| target.matches(modifier))
    }

    /// Owned copy of the entries; later chain mutations do not show through.
    pub fn snapshot(&self) -> Vec<Modifier> {
        self.modifiers.clone()
    }

    /// Folds the chain over `initial`.
    pub fn apply(&mut self, initial: f64, ctx: &EntityContext<'_>, channel: Channel) -> f64 {
        apply_modifiers(initial, ctx, channel, &mut self.modifiers)
    }

    /// Inserts `modifier` according to `addition`.
    pub fn insert(
        &mut self,
        modifier: Modifier,
        allow_duplicates: bool,
        addition: &Addition,
    ) -> InsertOutcome {
        if !allow_duplicates
            && !addition.placement.is_replace()
            && self.contains_id(modifier.id())
        {
            return InsertOutcome::Rejected(Rejection::Duplicate);
        }

        let target = match addition.anchor {
            Anchor::First => self
                .modifiers
                .iter()
                .position(|entry| addition.target.matches(entry)),
            Anchor::Last => self
                .modifiers
                .iter()
                .rposition(|entry| addition.target.matches(entry)),
        };

        match (target, addition.placement) {
            (Some(index), Placement::Replace | Placement::ReplaceOrAdd) => {
                self.modifiers[index] = modifier;
                InsertOutcome::Replaced { index }
            }
            (Some(index), Placement::After) => {
                self.modifiers.insert(index + 1, modifier);
                InsertOutcome::Inserted { index: index + 1 }
            }
            (Some(index), Placement::Before) => {
                self.modifiers.insert(index, modifier);
                InsertOutcome::Inserted { index }
            }
            (None, Placement::Replace) => InsertOutcome::Rejected(Rejection::NoReplaceTarget),
            (None, _) => {
                self.modifiers.push(modifier);
                InsertOutcome::Appended {
                    index: self.modifiers.len() - 1,
                }
            }
        }
    }

    /// Appends every modifier, skipping ids already present unless
    /// `allow_duplicates`. Returns how many were added.
    pub fn extend(
        &mut self,
        modifiers: impl IntoIterator<Item = Modifier>,
        allow_duplicates: bool,
    ) -> usize {
        let before = self.modifiers.len();
        for modifier in modifiers {
            if allow_duplicates || !self.contains_id(modifier.id()) {
                self.modifiers.push(modifier);
            }
        }
        self.modifiers.len() - before
    }

    /// Removes up to `max` entries matching `predicate`, front to back.
    pub fn remove_where(&mut self, max: usize, predicate: impl FnMut(&Modifier) -> bool) -> usize {
        self.remove_where_vetoed(max, predicate, |_| true)
    }

    /// Like [`ModifierChain::remove_where`], but `allow` may keep an
    /// individual candidate. A veto does not stop the scan.
    pub fn remove_where_vetoed(
        &mut self,
        max: usize,
        mut predicate: impl FnMut(&Modifier) -> bool,
        mut allow: impl FnMut(&Modifier) -> bool,
    ) -> usize {
        let mut removed = 0;
        self.modifiers.retain(|modifier| {
            if removed < max && predicate(modifier) && allow(modifier) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn for_each(&self, f: impl FnMut(&Modifier)) {
        self.modifiers.iter().for_each(f);
    }

    /// Visits entries until `f` breaks, returning the break value.
    pub fn for_each_until<B>(&self, mut f: impl FnMut(&Modifier) -> ControlFlow<B>) -> Option<B> {
        for modifier in &self.modifiers {
            if let ControlFlow::Break(value) = f(modifier) {
                return Some(value);
            }
        }
        None
    }

    /// Mutates payloads in place. Order and membership stay untouched.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&ModifierId, &mut ModifierKind)) {
        for modifier in &mut self.modifiers {
            let id = modifier.id().clone();
            f(&id, modifier.kind_mut());
        }
    }

    /// Ages every entry by one tick and evicts the expired ones.
    pub fn advance(&mut self) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain_mut(|modifier| !modifier.advance());
        before - self.modifiers.len()
    }
}

impl<'a> IntoIterator for &'a ModifierChain {
    type Item = &'a Modifier;
    type IntoIter = std::slice::Iter<'a, Modifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemperatureConfig;
    use crate::modifier::{EntityId, Position, SampleKind, Sampler};

    struct Silent;

    impl Sampler for Silent {
        fn sample(&self, _: EntityId, _: Position, _: SampleKind) -> f64 {
            f64::NAN
        }
    }

    fn offset(id: &str, delta: f64) -> Modifier {
        Modifier::with_id(id, ModifierKind::Offset(delta))
    }

    fn chain_of(ids: &[&str]) -> ModifierChain {
        ModifierChain::from_modifiers(ids.iter().map(|id| offset(id, 1.0)).collect())
    }

    fn ids(chain: &ModifierChain) -> Vec<&str> {
        chain.ids().map(ModifierId::as_str).collect()
    }

    #[test]
    fn fold_is_deterministic_and_skips_nan() {
        let config = TemperatureConfig::default();
        let ctx = EntityContext::new(EntityId(7), Position::default(), 0, &Silent, &config);
        let build = || {
            ModifierChain::from_modifiers(vec![
                offset("a", 2.0),
                Modifier::new(ModifierKind::Weather),
                Modifier::with_id("b", ModifierKind::Scale(3.0)),
            ])
        };

        let mut first = build();
        let mut second = build();
        assert_eq!(first.apply(1.0, &ctx, Channel::World), 9.0);
        assert_eq!(second.apply(1.0, &ctx, Channel::World), 9.0);
    }

    #[test]
    fn insert_after_first_match() {
        let mut chain = chain_of(&["A", "B", "C"]);
        let addition = Addition::new(
            Placement::After,
            Anchor::First,
            ModifierMatch::Id("B".into()),
        );
        let outcome = chain.insert(offset("D", 0.0), false, &addition);
        assert_eq!(outcome, InsertOutcome::Inserted { index: 2 });
        assert_eq!(ids(&chain), ["A", "B", "D", "C"]);
    }

    #[test]
    fn insert_before_last_uses_rightmost_match() {
        let mut chain = ModifierChain::from_modifiers(vec![
            offset("A", 0.0),
            Modifier::with_id("X", ModifierKind::Fire),
            offset("B", 0.0),
            Modifier::with_id("Y", ModifierKind::Fire),
        ]);
        let addition = Addition::new(Placement::Before, Anchor::Last, ModifierMatch::Kind("fire"));
        chain.insert(offset("D", 0.0), false, &addition);
        assert_eq!(ids(&chain), ["A", "X", "B", "D", "Y"]);
    }

    #[test]
    fn replace_or_add_overwrites_or_appends() {
        let mut chain = chain_of(&["A", "B"]);
        let outcome = chain.insert(offset("C", 5.0), false, &Addition::replace_or_add("C"));
        assert_eq!(outcome, InsertOutcome::Appended { index: 2 });
        assert_eq!(ids(&chain), ["A", "B", "C"]);

        let outcome = chain.insert(offset("A", 9.0), false, &Addition::replace_or_add("A"));
        assert_eq!(outcome, InsertOutcome::Replaced { index: 0 });
        assert_eq!(ids(&chain), ["A", "B", "C"]);
        assert!(matches!(chain.iter().next().map(Modifier::kind), Some(ModifierKind::Offset(v)) if *v == 9.0));
    }

    #[test]
    fn replace_without_target_is_rejected() {
        let mut chain = chain_of(&["A"]);
        let outcome = chain.insert(offset("Z", 0.0), false, &Addition::replace("Z"));
        assert_eq!(outcome, InsertOutcome::Rejected(Rejection::NoReplaceTarget));
        assert!(!outcome.is_changed());
        assert_eq!(ids(&chain), ["A"]);
    }

    #[test]
    fn duplicate_rejection_leaves_chain_unchanged() {
        let mut chain = chain_of(&["A", "B"]);
        let outcome = chain.insert(offset("A", 0.0), false, &Addition::at_end());
        assert_eq!(outcome, InsertOutcome::Rejected(Rejection::Duplicate));
        assert!(!outcome.is_changed());
        assert_eq!(ids(&chain), ["A", "B"]);

        let outcome = chain.insert(offset("A", 0.0), true, &Addition::at_end());
        assert!(outcome.is_changed());
        assert_eq!(ids(&chain), ["A", "B", "A"]);
    }

    #[test]
    fn presets_on_empty_and_populated_chains() {
        let mut chain = ModifierChain::new();
        assert_eq!(
            chain.insert(offset("A", 0.0), false, &Addition::at_end()),
            InsertOutcome::Appended { index: 0 }
        );
        chain.insert(offset("B", 0.0), false, &Addition::at_start());
        chain.insert(offset("C", 0.0), false, &Addition::at_end());
        assert_eq!(ids(&chain), ["B", "A", "C"]);
    }

    #[test]
    fn vetoed_removal_keeps_scanning() {
        let mut chain = chain_of(&["A", "B", "A", "C", "A"]);
        let removed = chain.remove_where_vetoed(
            2,
            |m| m.id().as_str() != "C",
            |m| m.id().as_str() != "B",
        );
        assert_eq!(removed, 2);
        assert_eq!(ids(&chain), ["B", "C", "A"]);
        assert_eq!(chain.remove_where(usize::MAX, |m| m.id().as_str() == "Q"), 0);
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut chain = chain_of(&["A"]);
        let added = chain.extend(vec![offset("A", 0.0), offset("B", 0.0)], false);
        assert_eq!(added, 1);
        assert_eq!(ids(&chain), ["A", "B"]);
    }

    #[test]
    fn advance_evicts_expired_entries() {
        let mut chain = ModifierChain::from_modifiers(vec![
            offset("keep", 0.0),
            offset("short", 0.0).expires(0),
            offset("long", 0.0).expires(2),
        ]);
        assert_eq!(chain.advance(), 1);
        assert_eq!(ids(&chain), ["keep", "long"]);
        assert_eq!(chain.advance(), 0);
        assert_eq!(chain.advance(), 1);
        assert_eq!(ids(&chain), ["keep"]);
    }

    #[test]
    fn snapshots_do_not_alias() {
        let mut chain = chain_of(&["A", "B"]);
        let snapshot = chain.snapshot();
        chain.clear();
        chain.insert(offset("C", 0.0), false, &Addition::at_end());
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id().as_str(), "A");
    }

    #[test]
    fn iteration_helpers() {
        let mut chain = chain_of(&["A", "B", "C"]);
        let found = chain.for_each_until(|m| {
            if m.id().as_str() == "B" {
                ControlFlow::Break(m.id().clone())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(found, Some(ModifierId::from("B")));

        chain.for_each_mut(|_, kind| {
            if let ModifierKind::Offset(delta) = kind {
                *delta *= 2.0;
            }
        });
        let mut total = 0.0;
        chain.for_each(|m| {
            if let ModifierKind::Offset(delta) = m.kind() {
                total += delta;
            }
        });
        assert_eq!(total, 6.0);
    }
}
