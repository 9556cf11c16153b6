//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, temperature state and content
//! loading so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use thermal_core::{EntityId, TemperatureError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("entity {0} is not tracked")]
    UnknownEntity(EntityId),

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error(transparent)]
    Temperature(#[from] TemperatureError),

    #[error(transparent)]
    Content(#[from] anyhow::Error),
}
