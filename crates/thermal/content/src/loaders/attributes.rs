//! Attribute table loader.

use std::path::Path;

use crate::attributes::AttributeTable;
use crate::loaders::{LoadResult, read_file};

/// Loader for attribute tables from RON files.
pub struct AttributeLoader;

impl AttributeLoader {
    /// Load an attribute table from a RON file.
    pub fn load(path: &Path) -> LoadResult<AttributeTable> {
        let content = read_file(path)?;
        let table: AttributeTable = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute table RON: {}", e))?;

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use thermal_core::{AttributeSource, Channel, EntityId};

    use super::*;

    #[test]
    fn loads_entries_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
    entries: [
        (channel: world, modifiers: [(operation: Addition, amount: 5.0)]),
        (entity: Some(EntityId(2)), channel: world, modifiers: [
            (operation: MultiplyBase, amount: 1.0),
            (operation: MultiplyTotal, amount: 0.5),
        ]),
    ],
)"#
        )
        .unwrap();

        let table = AttributeLoader::load(file.path()).unwrap();
        assert_eq!(table.stack(EntityId(2), Channel::World).apply(10.0), 15.0);
        assert_eq!(table.stack(EntityId(3), Channel::World).apply(10.0), 15.0);
        assert_eq!(table.stack(EntityId(3), Channel::Core).apply(10.0), 10.0);
    }
}
