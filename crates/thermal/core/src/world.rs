//! Point temperature queries that do not belong to any tracked entity.
use crate::chain::apply_modifiers;
use crate::channel::Channel;
use crate::modifier::{EntityContext, Modifier, ModifierId, ModifierKind};
use crate::registry::{DEFAULT_BIOME_SAMPLES, DEFAULT_BLOCK_RANGE, ModifierRegistry};

/// World temperature at `ctx.position`, folded through a throwaway chain.
pub fn temperature_at(ctx: &EntityContext<'_>, registry: &ModifierRegistry) -> f64 {
    let mut chain = Vec::with_capacity(4);
    chain.push(Modifier::new(ModifierKind::Biome {
        samples: DEFAULT_BIOME_SAMPLES,
    }));
    if ctx.config.compat.seasons
        && let Some(season) = registry.create(&ModifierId::builtin("season"))
    {
        chain.push(season);
    }
    chain.push(Modifier::new(ModifierKind::Underground));
    chain.push(Modifier::new(ModifierKind::Block {
        range: DEFAULT_BLOCK_RANGE,
    }));
    apply_modifiers(0.0, ctx, Channel::World, &mut chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompatSettings, TemperatureConfig};
    use crate::modifier::{EntityId, Position};
    use crate::sample::{SampleTable, SampleValues};

    fn table() -> SampleTable {
        SampleTable::new(SampleValues {
            biome: Some(1.0),
            surface: Some(64.0),
            season: Some(-0.5),
            ..SampleValues::default()
        })
    }

    #[test]
    fn season_only_counts_when_enabled() {
        let table = table();
        let registry = ModifierRegistry::with_builtins();
        let surface = Position::new(0.0, 70.0, 0.0);

        let plain = TemperatureConfig::default();
        let ctx = EntityContext::new(EntityId(0), surface, 0, &table, &plain);
        assert_eq!(temperature_at(&ctx, &registry), 1.0);

        let seasonal = TemperatureConfig {
            compat: CompatSettings {
                seasons: true,
                weather: false,
            },
            ..TemperatureConfig::default()
        };
        let ctx = EntityContext::new(EntityId(0), surface, 0, &table, &seasonal);
        assert_eq!(temperature_at(&ctx, &registry), 0.5);
    }

    #[test]
    fn deep_positions_approach_cave_temperature() {
        let table = table();
        let registry = ModifierRegistry::with_builtins();
        let config = TemperatureConfig::default();
        let deep = Position::new(0.0, -100.0, 0.0);
        let ctx = EntityContext::new(EntityId(0), deep, 0, &table, &config);
        assert!((temperature_at(&ctx, &registry) - config.cave_temperature).abs() < 1e-12);
    }
}
