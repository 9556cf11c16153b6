//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the tick loop and executes every command that
//! mutates tracked state.

mod publisher;
mod simulation;

pub use simulation::{Command, Deferred, SimulationWorker};
