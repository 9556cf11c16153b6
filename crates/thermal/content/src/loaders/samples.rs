//! Environmental sample table loader.

use std::path::Path;

use thermal_core::SampleTable;

use crate::loaders::{LoadResult, read_file};

/// Loader for sample tables from RON files.
pub struct SampleTableLoader;

impl SampleTableLoader {
    /// Load a sample table from a RON file.
    pub fn load(path: &Path) -> LoadResult<SampleTable> {
        let content = read_file(path)?;
        let table: SampleTable = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse sample table RON: {}", e))?;

        Ok(table)
    }
}
