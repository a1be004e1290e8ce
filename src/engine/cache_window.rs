// Thumbnail pre-cache window: decides which items to start and stop caching as the viewport moves.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::{EngineConfig, PREHEAT_MARGIN_FRACTION};
use crate::geometry::rect::{Rect, Size};
use crate::library::fetch::FetchResult;
use crate::library::traits::{CacheBackend, ContentMode, LayoutGeometry};

/// Item indices whose thumbnails should start or stop being cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDelta {
    pub to_start: BTreeSet<usize>,
    pub to_stop: BTreeSet<usize>,
}

impl CacheDelta {
    pub fn is_empty(&self) -> bool {
        self.to_start.is_empty() && self.to_stop.is_empty()
    }
}

/// Viewport grown by half its height above and below, to warm scroll-ahead content.
pub fn preheat_rect(viewport: Rect) -> Rect {
    viewport.inset_by(0.0, -PREHEAT_MARGIN_FRACTION * viewport.height())
}

/// Difference between the previous preheat window and the one around `current`.
///
/// Returns `None` when there is nothing to do: no items, a zero-height
/// viewport, or a midpoint move no larger than `threshold_fraction` of the
/// viewport height.
pub fn compute_delta(
    previous: Rect,
    current: Rect,
    threshold_fraction: f64,
    item_count: usize,
    layout: &dyn LayoutGeometry,
) -> Option<CacheDelta> {
    if item_count == 0 || current.is_empty() {
        return None;
    }

    let preheat = preheat_rect(current);
    let distance = (preheat.mid_y() - previous.mid_y()).abs();
    if !(distance > threshold_fraction * current.height()) {
        return None;
    }

    let mut to_stop = BTreeSet::new();
    for band in previous.subtract(&preheat) {
        to_stop.extend(layout.indices_for_rect(band));
    }
    let mut to_start = BTreeSet::new();
    for band in preheat.subtract(&previous) {
        to_start.extend(layout.indices_for_rect(band));
    }

    // Cells straddling a band edge are still inside the new window, or were
    // already warmed by the previous one.
    let kept = layout.indices_for_rect(preheat);
    to_stop.retain(|i| *i < item_count && !kept.contains(i));
    let resident = layout.indices_for_rect(previous);
    to_start.retain(|i| *i < item_count && !resident.contains(i));

    Some(CacheDelta { to_start, to_stop })
}

/// Owns the last applied preheat window and drives the cache backend.
///
/// Mutation goes through `&mut self`, so it stays on the thread delivering
/// scroll events.
pub struct CacheWindowManager {
    cache: Arc<dyn CacheBackend>,
    previous_preheat_rect: Rect,
    threshold_fraction: f64,
    target_size: Size,
    content_mode: ContentMode,
}

impl CacheWindowManager {
    pub fn new(cache: Arc<dyn CacheBackend>, config: &EngineConfig) -> Self {
        Self {
            cache,
            previous_preheat_rect: Rect::ZERO,
            threshold_fraction: config.preheat_threshold_fraction,
            target_size: config.thumbnail_size(),
            content_mode: ContentMode::AspectFill,
        }
    }

    pub fn previous_preheat_rect(&self) -> Rect {
        self.previous_preheat_rect
    }

    pub fn target_size(&self) -> Size {
        self.target_size
    }

    /// Drop every cached thumbnail and forget the previous window.
    pub fn reset(&mut self) {
        self.cache.reset_all();
        self.previous_preheat_rect = Rect::ZERO;
    }

    /// Apply the delta for a new viewport against `fetch_result`.
    ///
    /// The previous window only advances when a delta was applied.
    pub fn update(
        &mut self,
        viewport: Rect,
        fetch_result: &FetchResult,
        layout: &dyn LayoutGeometry,
    ) -> Option<CacheDelta> {
        let delta = compute_delta(
            self.previous_preheat_rect,
            viewport,
            self.threshold_fraction,
            fetch_result.count(),
            layout,
        )?;

        let start_items = fetch_result.items_in_index_range(&delta.to_start);
        let stop_items = fetch_result.items_in_index_range(&delta.to_stop);
        if !start_items.is_empty() {
            self.cache
                .start_caching(&start_items, self.target_size, self.content_mode);
        }
        if !stop_items.is_empty() {
            self.cache
                .stop_caching(&stop_items, self.target_size, self.content_mode);
        }

        self.previous_preheat_rect = preheat_rect(viewport);
        debug!(
            "cache window gen={} start={} stop={} window={:?}",
            fetch_result.generation(),
            start_items.len(),
            stop_items.len(),
            self.previous_preheat_rect
        );
        Some(delta)
    }
}
