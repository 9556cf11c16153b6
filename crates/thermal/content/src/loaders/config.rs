//! Temperature configuration loader.

use std::path::Path;

use thermal_core::TemperatureConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for temperature configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys keep their defaults, so a partial file only overrides
    /// what it names.
    pub fn load(path: &Path) -> LoadResult<TemperatureConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<TemperatureConfig> {
        let config: TemperatureConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}
