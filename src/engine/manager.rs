// Library media manager: the gallery's entry point for pre-caching and cropped video export.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::backend::ExportBackend;
use super::cache_window::{CacheDelta, CacheWindowManager};
use super::dispatch::MainQueue;
use super::exporter::{ExportResult, VideoCropExporter};
use super::progress::ProgressSink;
use super::registry::ExportSessionRegistry;
use crate::config::EngineConfig;
use crate::geometry::rect::Rect;
use crate::library::index::AssetIndex;
use crate::library::item::MediaItem;
use crate::library::traits::{CacheBackend, LayoutGeometry};

pub struct LibraryMediaManager {
    config: EngineConfig,
    index: Arc<AssetIndex>,
    cache_window: CacheWindowManager,
    exporter: VideoCropExporter,
}

impl LibraryMediaManager {
    pub fn new(
        config: EngineConfig,
        cache_backend: Arc<dyn CacheBackend>,
        export_backend: Arc<dyn ExportBackend>,
        queue: MainQueue,
    ) -> Self {
        let cache_window = CacheWindowManager::new(cache_backend, &config);
        let exporter = VideoCropExporter::new(
            export_backend,
            Arc::new(ExportSessionRegistry::new()),
            queue,
            &config,
        );
        Self {
            config,
            index: Arc::new(AssetIndex::new()),
            cache_window,
            exporter,
        }
    }

    /// Start from an empty cache window.
    pub fn initialize(&mut self) {
        info!(
            "media manager initialized, thumbnail size {:?}",
            self.cache_window.target_size()
        );
        self.reset_cached_assets();
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<AssetIndex> {
        &self.index
    }

    pub fn exporter(&self) -> &VideoCropExporter {
        &self.exporter
    }

    pub fn registry(&self) -> &Arc<ExportSessionRegistry> {
        self.exporter.registry()
    }

    /// Replace the library contents with a new generation. Cached thumbnails
    /// of the old generation are dropped.
    pub fn set_fetch_result(&mut self, items: Vec<Arc<MediaItem>>) -> u64 {
        let generation = self.index.replace(items);
        self.reset_cached_assets();
        generation
    }

    /// True when the library has anything to show.
    pub fn has_result_items(&self) -> bool {
        self.index.count() > 0
    }

    pub fn asset(&self, index: usize) -> Option<Arc<MediaItem>> {
        match self.index.item(index) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("fetch result does not contain this index: {}", e);
                None
            }
        }
    }

    pub fn reset_cached_assets(&mut self) {
        self.cache_window.reset();
    }

    /// Move the pre-cache window to follow `bounds`, the visible scroll area.
    pub fn update_cached_assets(
        &mut self,
        bounds: Rect,
        layout: &dyn LayoutGeometry,
    ) -> Option<CacheDelta> {
        let snapshot = self.index.snapshot();
        self.cache_window.update(bounds, &snapshot, layout)
    }

    pub fn fetch_video_url_and_crop<F>(
        &self,
        item: Arc<MediaItem>,
        crop_rect: Rect,
        sink: Arc<dyn ProgressSink>,
        callback: F,
    ) where
        F: FnOnce(ExportResult) + Send + 'static,
    {
        self.fetch_video_url_and_crop_with_duration(item, crop_rect, None, sink, callback)
    }

    pub fn fetch_video_url_and_crop_with_duration<F>(
        &self,
        item: Arc<MediaItem>,
        crop_rect: Rect,
        duration: Option<Duration>,
        sink: Arc<dyn ProgressSink>,
        callback: F,
    ) where
        F: FnOnce(ExportResult) + Send + 'static,
    {
        self.exporter
            .export_cropped_video(item, crop_rect, duration, sink, callback);
    }

    pub fn force_cancel_exporting(&self) -> usize {
        self.exporter.cancel_all()
    }
}
