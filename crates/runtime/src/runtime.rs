//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API plus an interval-driven run loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::hooks::{HookRegistry, ModifierHook};
use crate::oracle::OracleManager;
use crate::registry::StateRegistry;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Wall-clock length of one simulation tick in the run loop.
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that orchestrates the temperature simulation
///
/// Design: Runtime owns the worker and the tick cadence.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    config: RuntimeConfig,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Advance the simulation by one tick
    pub async fn step(&self) -> Result<u64> {
        self.handle.tick().await
    }

    /// Run `ticks` ticks paced by the configured interval.
    pub async fn run_for(&self, ticks: u64) -> Result<u64> {
        let mut interval = self.interval();
        let mut last = 0;
        for _ in 0..ticks {
            interval.tick().await;
            last = self.step().await?;
        }
        Ok(last)
    }

    /// Run the tick loop continuously
    pub async fn run(&self) -> Result<()> {
        let mut interval = self.interval();
        loop {
            interval.tick().await;
            self.step().await?;
        }
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every handle clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }

    fn interval(&self) -> time::Interval {
        let mut interval = time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleManager>,
    registry: Option<StateRegistry>,
    hooks: Vec<Arc<dyn ModifierHook>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            registry: None,
            hooks: Vec::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Start from previously tracked entities instead of an empty registry.
    pub fn registry(mut self, registry: StateRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Adds a modifier hook. Hooks run in priority order regardless of the
    /// order they are added in.
    pub fn hook(mut self, hook: impl ModifierHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;
        let registry = self.registry.unwrap_or_default().shared();

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(
            command_tx,
            event_bus.clone(),
            registry.clone(),
            oracles.clone(),
        );

        let sim_worker = SimulationWorker::new(
            registry,
            oracles,
            HookRegistry::new(self.hooks),
            command_rx,
            event_bus,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            config: self.config,
            sim_worker_handle,
        })
    }
}
