//! Read-only collaborators of the simulation, bundled for the worker.
//!
//! An [`OracleManager`] carries everything a tick reads but never writes: the
//! environmental sampler, attribute source, temperature configuration and
//! modifier registry. The data is immutable at runtime; dynamic state lives in
//! the [`StateRegistry`](crate::registry::StateRegistry).
use std::sync::Arc;

use thermal_content::ContentFactory;
use thermal_core::{
    AttributeSource, EntityContext, EntityId, ModifierRegistry, NoAttributes, Position, Sampler,
    TemperatureConfig, world,
};

use crate::api::Result;

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) sampler: Arc<dyn Sampler>,
    pub(crate) attributes: Arc<dyn AttributeSource>,
    pub(crate) config: Arc<TemperatureConfig>,
    pub(crate) modifiers: Arc<ModifierRegistry>,
}

impl OracleManager {
    /// Creates a manager with no attribute modifiers and the built-in
    /// modifier registry.
    pub fn new(sampler: Arc<dyn Sampler>, config: TemperatureConfig) -> Self {
        Self {
            sampler,
            attributes: Arc::new(NoAttributes),
            config: Arc::new(config),
            modifiers: Arc::new(ModifierRegistry::with_builtins()),
        }
    }

    /// Loads config, samples and attributes from a content directory.
    pub fn from_content(factory: &ContentFactory) -> Result<Self> {
        let config = factory.load_config()?;
        let samples = factory.load_samples()?;
        let attributes = factory.load_attributes()?;
        tracing::info!(
            target: "runtime::oracle",
            data_dir = %factory.data_dir().display(),
            regions = samples.regions.len(),
            attribute_entries = attributes.entries.len(),
            "Loaded temperature content"
        );
        Ok(Self::new(Arc::new(samples), config).with_attributes(Arc::new(attributes)))
    }

    pub fn with_attributes(mut self, attributes: Arc<dyn AttributeSource>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_registry(mut self, modifiers: ModifierRegistry) -> Self {
        self.modifiers = Arc::new(modifiers);
        self
    }

    /// Sampling context for one entity.
    pub fn context(&self, entity: EntityId, position: Position, age: u64) -> EntityContext<'_> {
        EntityContext::new(entity, position, age, self.sampler.as_ref(), &self.config)
    }

    /// World temperature at a position no entity occupies.
    pub fn temperature_at(&self, position: Position) -> f64 {
        let ctx = self.context(EntityId::default(), position, 0);
        world::temperature_at(&ctx, &self.modifiers)
    }

    pub fn config(&self) -> &TemperatureConfig {
        &self.config
    }

    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    pub fn attributes(&self) -> &dyn AttributeSource {
        self.attributes.as_ref()
    }
}
