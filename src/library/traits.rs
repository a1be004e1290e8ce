use std::collections::BTreeSet;
use std::sync::Arc;

use super::item::MediaItem;
use crate::geometry::rect::{Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    AspectFill,
    AspectFit,
}

/// Thumbnail cache that pre-renders items at a fixed target size.
pub trait CacheBackend: Send + Sync {
    fn start_caching(&self, items: &[Arc<MediaItem>], target_size: Size, content_mode: ContentMode);
    fn stop_caching(&self, items: &[Arc<MediaItem>], target_size: Size, content_mode: ContentMode);
    fn reset_all(&self);
}

/// Maps content-space rectangles to the item indices laid out inside them.
pub trait LayoutGeometry {
    fn indices_for_rect(&self, rect: Rect) -> BTreeSet<usize>;
}
