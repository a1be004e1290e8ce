// Shared fakes for the export backend and thumbnail cache.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use ma_gallery_engine::engine::backend::{
    AssetRequestOptions, ExportBackend, ExportPreset, ExportRequest, ExportSession, ExportStatus,
    OutputFileType, VideoAsset,
};
use ma_gallery_engine::engine::composition::VideoComposition;
use ma_gallery_engine::geometry::rect::Size;
use ma_gallery_engine::geometry::transform::AffineTransform;
use ma_gallery_engine::library::item::{MediaItem, TrackInfo};
use ma_gallery_engine::library::traits::{CacheBackend, ContentMode};

pub struct FakeAsset {
    pub duration: Duration,
    pub tracks: Vec<TrackInfo>,
}

impl VideoAsset for FakeAsset {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn video_tracks(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }
}

/// Session whose progress follows a script and whose end is driven by the test.
pub struct FakeSession {
    progress_script: Mutex<VecDeque<f32>>,
    status: watch::Sender<ExportStatus>,
    error: Mutex<Option<String>>,
    output_url: Mutex<Option<PathBuf>>,
    pub requested_url: PathBuf,
    pub cancelled: AtomicBool,
}

impl FakeSession {
    fn new(requested_url: PathBuf, script: Vec<f32>) -> Self {
        let (status, _) = watch::channel(ExportStatus::Exporting);
        Self {
            progress_script: Mutex::new(script.into()),
            status,
            error: Mutex::new(None),
            output_url: Mutex::new(None),
            requested_url,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn complete(&self) {
        *self.output_url.lock() = Some(self.requested_url.clone());
        self.status.send_replace(ExportStatus::Completed);
    }

    pub fn complete_without_output(&self) {
        self.status.send_replace(ExportStatus::Completed);
    }

    pub fn fail(&self, detail: &str) {
        *self.error.lock() = Some(detail.to_string());
        self.status.send_replace(ExportStatus::Failed);
    }
}

#[async_trait]
impl ExportSession for FakeSession {
    fn progress(&self) -> f32 {
        let mut script = self.progress_script.lock();
        if script.len() > 1 {
            script.pop_front().unwrap_or(0.0)
        } else {
            script.front().copied().unwrap_or(0.0)
        }
    }

    fn status(&self) -> ExportStatus {
        *self.status.borrow()
    }

    fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    fn output_url(&self) -> Option<PathBuf> {
        self.output_url.lock().clone()
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.status.send_replace(ExportStatus::Cancelled);
    }

    async fn finished(&self) -> ExportStatus {
        let mut rx = self.status.subscribe();
        loop {
            let status = *rx.borrow_and_update();
            if status.is_terminal() {
                return status;
            }
            if rx.changed().await.is_err() {
                return ExportStatus::Unknown;
            }
        }
    }
}

pub struct RecordedExport {
    pub composition: VideoComposition,
    pub output_url: PathBuf,
    pub file_type: OutputFileType,
    pub preset: ExportPreset,
}

pub struct FakeBackend {
    pub asset_duration: Duration,
    pub tracks: Vec<TrackInfo>,
    pub fail_resolve: bool,
    pub progress_script: Vec<f32>,
    pub resolve_options: Mutex<Vec<AssetRequestOptions>>,
    pub exports: Mutex<Vec<RecordedExport>>,
    started_tx: mpsc::UnboundedSender<Arc<FakeSession>>,
}

impl FakeBackend {
    /// Backend serving a 1920x1080 portrait-recorded video of `duration`.
    pub fn new(duration: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<Arc<FakeSession>>) {
        Self::configured(duration, |_| {})
    }

    pub fn configured(
        duration: Duration,
        configure: impl FnOnce(&mut FakeBackend),
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Arc<FakeSession>>) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let mut backend = Self {
            asset_duration: duration,
            tracks: vec![portrait_track()],
            fail_resolve: false,
            progress_script: vec![0.0],
            resolve_options: Mutex::new(Vec::new()),
            exports: Mutex::new(Vec::new()),
            started_tx,
        };
        configure(&mut backend);
        (Arc::new(backend), started_rx)
    }
}

#[async_trait]
impl ExportBackend for FakeBackend {
    async fn request_video_asset(
        &self,
        _item: &MediaItem,
        options: AssetRequestOptions,
    ) -> Result<Arc<dyn VideoAsset>> {
        self.resolve_options.lock().push(options);
        if self.fail_resolve {
            return Err(anyhow!("asset not available offline"));
        }
        Ok(Arc::new(FakeAsset {
            duration: self.asset_duration,
            tracks: self.tracks.clone(),
        }))
    }

    fn start_export(&self, request: ExportRequest) -> Result<Arc<dyn ExportSession>> {
        let session = Arc::new(FakeSession::new(
            request.output_url.clone(),
            self.progress_script.clone(),
        ));
        self.exports.lock().push(RecordedExport {
            composition: request.composition,
            output_url: request.output_url,
            file_type: request.file_type,
            preset: request.preset,
        });
        let _ = self.started_tx.send(session.clone());
        Ok(session)
    }
}

pub fn portrait_track() -> TrackInfo {
    TrackInfo {
        track_id: 1,
        natural_size: Size::new(1920.0, 1080.0),
        preferred_transform: AffineTransform::new(0.0, 1.0, -1.0, 0.0, 1080.0, 0.0),
    }
}

pub fn video_item(id: &str, seconds: f64) -> Arc<MediaItem> {
    Arc::new(MediaItem::video(
        id,
        Size::new(1920.0, 1080.0),
        seconds,
        AffineTransform::new(0.0, 1.0, -1.0, 0.0, 1080.0, 0.0),
    ))
}

pub fn image_items(n: usize) -> Vec<Arc<MediaItem>> {
    (0..n)
        .map(|i| Arc::new(MediaItem::image(format!("img-{}", i), Size::new(3024.0, 4032.0))))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheCall {
    Start(Vec<String>, Size, ContentMode),
    Stop(Vec<String>, Size, ContentMode),
    Reset,
}

#[derive(Default)]
pub struct RecordingCache {
    pub calls: Mutex<Vec<CacheCall>>,
}

fn ids(items: &[Arc<MediaItem>]) -> Vec<String> {
    items.iter().map(|i| i.local_id.clone()).collect()
}

impl CacheBackend for RecordingCache {
    fn start_caching(&self, items: &[Arc<MediaItem>], target_size: Size, content_mode: ContentMode) {
        self.calls
            .lock()
            .push(CacheCall::Start(ids(items), target_size, content_mode));
    }

    fn stop_caching(&self, items: &[Arc<MediaItem>], target_size: Size, content_mode: ContentMode) {
        self.calls
            .lock()
            .push(CacheCall::Stop(ids(items), target_size, content_mode));
    }

    fn reset_all(&self) {
        self.calls.lock().push(CacheCall::Reset);
    }
}

/// Poll `cond` while letting (possibly paused) time advance.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}
