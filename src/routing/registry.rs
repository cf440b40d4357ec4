//! Atomically swappable mount table snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::MountTable;

/// Shared handle to the current mount table.
///
/// Readers take a snapshot with `load` and use it for the whole request;
/// a reload builds a new table and swaps it in with `replace`.
#[derive(Debug)]
pub struct MountRegistry {
    table: ArcSwap<MountTable>,
}

impl MountRegistry {
    pub fn new(table: MountTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    pub fn load(&self) -> Arc<MountTable> {
        self.table.load_full()
    }

    pub fn replace(&self, table: MountTable) {
        let mounts = table.len();
        self.table.store(Arc::new(table));
        tracing::info!(mounts, "Mount table replaced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_old_snapshots_alive() {
        let registry = MountRegistry::new(MountTable::new(true));
        let before = registry.load();

        let mut table = MountTable::new(true);
        table.ignore("static").unwrap();
        registry.replace(table);

        assert!(before.is_empty());
        assert_eq!(registry.load().len(), 1);
    }
}
