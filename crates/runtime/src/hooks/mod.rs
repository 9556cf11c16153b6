//! Modifier hook system for runtime orchestration.
//!
//! Hooks observe every modifier add and removal the runtime performs on
//! behalf of callers. Before an add, each hook may let it through, swap the
//! modifier for another one, or cancel it outright. Before a removal, any hook
//! may veto an individual candidate; the scan keeps going past vetoed entries.
//!
//! # Architecture
//!
//! - Hooks are registered in the RuntimeBuilder and sorted by priority
//! - Add decisions chain: a replacement is what later hooks see
//! - Cancelled adds surface as `Rejected(Vetoed)` and a lifecycle event
//! - Rules driven by the worker itself (conditions, mounts, food) do not
//!   pass through hooks

mod protect;
mod registry;

pub use protect::ProtectModifiersHook;
pub use registry::HookRegistry;

use thermal_core::{Channel, EntityId, Modifier, TrackedKind};

/// Context provided to hooks when a modifier is about to change.
#[derive(Debug, Clone, Copy)]
pub struct HookContext {
    pub entity: EntityId,
    pub kind: TrackedKind,
    pub channel: Channel,
    /// Simulation tick the change happens on.
    pub tick: u64,
    /// Entries in the target chain before the change.
    pub chain_len: usize,
}

/// What a hook wants done with a pending add.
#[derive(Debug, Clone)]
pub enum HookDecision {
    Proceed,
    /// Add this modifier instead.
    Replace(Modifier),
    Cancel,
}

/// Hook consulted before modifier adds and removals.
///
/// # Execution Order
///
/// Hooks are sorted by priority (lower values execute first). A cancel stops
/// the chain; later hooks never see the modifier.
pub trait ModifierHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging and debugging).
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn before_add(&self, _ctx: &HookContext, _modifier: &Modifier) -> HookDecision {
        HookDecision::Proceed
    }

    /// Returns false to keep `modifier` in its chain.
    fn allow_remove(&self, _ctx: &HookContext, _modifier: &Modifier) -> bool {
        true
    }
}
