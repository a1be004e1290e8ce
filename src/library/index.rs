// Read-only index over the current fetch result; replaced wholesale on library change.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::fetch::FetchResult;
use super::item::MediaItem;
use crate::error::IndexError;

pub struct AssetIndex {
    current: RwLock<Arc<FetchResult>>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(FetchResult::default())),
        }
    }

    /// Install a new generation of items. Returns the new generation number.
    pub fn replace(&self, items: Vec<Arc<MediaItem>>) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation() + 1;
        debug!("fetch result generation {} with {} items", generation, items.len());
        *current = Arc::new(FetchResult::new(generation, items));
        generation
    }

    /// The fetch result as of now. Later replacements do not affect it.
    pub fn snapshot(&self) -> Arc<FetchResult> {
        self.current.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation()
    }

    pub fn count(&self) -> usize {
        self.current.read().count()
    }

    pub fn item(&self, index: usize) -> Result<Arc<MediaItem>, IndexError> {
        self.snapshot().item(index)
    }

    pub fn items_in_index_range(&self, indices: &BTreeSet<usize>) -> Vec<Arc<MediaItem>> {
        self.snapshot().items_in_index_range(indices)
    }
}

impl Default for AssetIndex {
    fn default() -> Self {
        Self::new()
    }
}
