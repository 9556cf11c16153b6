//! Content factory for building collaborators from data files.

use std::path::{Path, PathBuf};

use thermal_core::{SampleTable, TemperatureConfig};

use crate::attributes::AttributeTable;
use crate::loaders::{AttributeLoader, ConfigLoader, LoadResult, SampleTableLoader};

/// Content factory that loads all temperature content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── samples.ron
/// └── attributes.ron
/// ```
///
/// `attributes.ron` is optional; a missing file yields an empty table.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the content shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }

    /// Load temperature configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<TemperatureConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load the environmental sample table from `samples.ron`.
    pub fn load_samples(&self) -> LoadResult<SampleTable> {
        SampleTableLoader::load(&self.data_dir.join("samples.ron"))
    }

    /// Load attribute modifiers from `attributes.ron`.
    pub fn load_attributes(&self) -> LoadResult<AttributeTable> {
        let path = self.data_dir.join("attributes.ron");
        if !path.exists() {
            return Ok(AttributeTable::default());
        }
        AttributeLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_data_loads() {
        let factory = ContentFactory::bundled();
        let config = factory.load_config().unwrap();
        assert!(config.min_temp < config.max_temp);
        assert!(!factory.load_samples().unwrap().regions.is_empty());
        assert!(!factory.load_attributes().unwrap().is_empty());
    }

    #[test]
    fn attributes_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert!(factory.load_attributes().unwrap().is_empty());
        assert!(factory.load_config().is_err());
    }
}
