//! Deterministic temperature pipeline shared by the runtime and tools.
//!
//! `thermal-core` owns the canonical rules: unit conversion, the modifier
//! state machine, ordered modifier chains, per-entity temperature state,
//! attribute composition and change detection. Everything here is pure;
//! world queries, attribute lists and sync fan-out arrive through the
//! collaborator traits re-exported below.
pub mod attribute;
pub mod chain;
pub mod channel;
pub mod config;
pub mod error;
pub mod modifier;
pub mod registry;
pub mod rules;
pub mod sample;
pub mod schedule;
pub mod state;
pub mod sync;
pub mod units;
pub mod world;

pub use attribute::{
    ATTRIBUTE_CHANNELS, AttributeModifier, AttributeOperation, AttributeSource, AttributeStack,
    NoAttributes, compose,
};
pub use chain::{
    Addition, Anchor, InsertOutcome, ModifierChain, ModifierMatch, Placement, Rejection,
    apply_modifiers,
};
pub use channel::{Channel, ChannelSet};
pub use config::{CompatSettings, MountInsulation, TemperatureConfig};
pub use error::TemperatureError;
pub use modifier::{
    EntityContext, EntityId, Expiry, Modifier, ModifierId, ModifierKind, ModifierLogic, Position,
    SampleKind, Sampler, Trend,
};
pub use registry::ModifierRegistry;
pub use rules::{
    EntityConditions, InsulationChange, MountKind, SleepProblem, SleepVerdict, TempResistance,
};
pub use sample::{SampleRegion, SampleTable, SampleValues};
pub use schedule::{TaskId, TaskQueue};
pub use state::{
    ChainSnapshot, Hazard, ModifierSnapshot, TemperatureSnapshot, TemperatureState, TickReport,
};
pub use sync::{ChangeNotifier, SyncMessage, SyncPayload, SyncPublisher, SyncTarget, TrackedKind};
pub use units::{Units, convert_units};
