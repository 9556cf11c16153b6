//! Runtime orchestration for the temperature simulation.
//!
//! This crate wires the pure `thermal-core` pipeline into a tick-driven
//! service: a simulation worker owns the tick loop, tracked entity state lives
//! in a mutex-guarded [`StateRegistry`], observers receive sync payloads and
//! hazards through the topic-based [`EventBus`], and [`RuntimeHandle`] offers a
//! cloneable async façade for gameplay code.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and run loop
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`hooks`] lets callers cancel, replace or veto modifier changes
//! - [`oracle`] bundles the read-only collaborators (sampler, attributes, config)
//! - [`registry`] keeps per-entity temperature state
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod hooks;
pub mod oracle;
pub mod registry;
pub mod runtime;

mod workers;

pub use api::{EntityUpdate, Result, RuntimeError, RuntimeHandle};
pub use events::{
    Event, EventBus, HazardEvent, LifecycleEvent, SyncEvent, SyncKind, Topic,
};
pub use hooks::{HookContext, HookDecision, HookRegistry, ModifierHook};
pub use oracle::OracleManager;
pub use registry::{SharedRegistry, StateRegistry, TrackedEntity};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::Deferred;
