// Generation-stamped, immutable snapshot of the library's ordered items.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::item::MediaItem;
use crate::error::IndexError;

#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    generation: u64,
    items: Vec<Arc<MediaItem>>,
}

impl FetchResult {
    pub fn new(generation: u64, items: Vec<Arc<MediaItem>>) -> Self {
        Self { generation, items }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Result<Arc<MediaItem>, IndexError> {
        self.items
            .get(index)
            .cloned()
            .ok_or(IndexError::OutOfRange {
                index,
                count: self.items.len(),
            })
    }

    /// Items at `indices`, in index order. Indices past the end are dropped.
    pub fn items_in_index_range(&self, indices: &BTreeSet<usize>) -> Vec<Arc<MediaItem>> {
        indices
            .iter()
            .filter_map(|&i| self.items.get(i).cloned())
            .collect()
    }
}
