// Cropped video export: builds the composition, submits it and reports the outcome on the main queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::backend::{
    AssetRequestOptions, ExportBackend, ExportPreset, ExportRequest, ExportStatus, OutputFileType,
};
use super::composition::VideoComposition;
use super::dispatch::MainQueue;
use super::progress::{ProgressPoller, ProgressSink};
use super::registry::{ExportSessionRegistry, SessionId};
use crate::config::{EngineConfig, PROGRESS_POLL_INTERVAL_MS};
use crate::error::ExportError;
use crate::geometry::rect::Rect;
use crate::library::item::MediaItem;

pub type ExportResult = Result<PathBuf, ExportError>;

pub struct VideoCropExporter {
    backend: Arc<dyn ExportBackend>,
    registry: Arc<ExportSessionRegistry>,
    queue: MainQueue,
    output_dir: PathBuf,
    output_extension: &'static str,
    file_type: OutputFileType,
    poll_interval: Duration,
}

/// Everything the background task needs, detached from `&self`.
struct ExportJob {
    id: SessionId,
    backend: Arc<dyn ExportBackend>,
    registry: Arc<ExportSessionRegistry>,
    queue: MainQueue,
    output_url: PathBuf,
    file_type: OutputFileType,
    poll_interval: Duration,
    item: Arc<MediaItem>,
    crop_rect: Rect,
    max_duration: Option<Duration>,
    sink: Arc<dyn ProgressSink>,
}

impl VideoCropExporter {
    pub fn new(
        backend: Arc<dyn ExportBackend>,
        registry: Arc<ExportSessionRegistry>,
        queue: MainQueue,
        config: &EngineConfig,
    ) -> Self {
        Self {
            backend,
            registry,
            queue,
            output_dir: config.output_dir(),
            output_extension: config.output_file_extension(),
            file_type: config.output_file_type,
            poll_interval: Duration::from_millis(PROGRESS_POLL_INTERVAL_MS),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn registry(&self) -> &Arc<ExportSessionRegistry> {
        &self.registry
    }

    /// Fresh output location in the configured directory.
    pub fn unique_output_url(&self) -> PathBuf {
        unique_output_url(&self.output_dir, self.output_extension)
    }

    /// Export `crop_rect` of `item` to a new file without blocking the caller.
    ///
    /// The job is registered before this returns, so a following `cancel_all`
    /// reaches it. `sink` and `completion` are only ever called on the main
    /// queue, and `completion` at most once. The job leaves the registry when
    /// it ends even if the main queue is gone.
    pub fn export_cropped_video<F>(
        &self,
        item: Arc<MediaItem>,
        crop_rect: Rect,
        max_duration: Option<Duration>,
        sink: Arc<dyn ProgressSink>,
        completion: F,
    ) where
        F: FnOnce(ExportResult) + Send + 'static,
    {
        let job = ExportJob {
            id: self.registry.reserve(),
            backend: self.backend.clone(),
            registry: self.registry.clone(),
            queue: self.queue.clone(),
            output_url: self.unique_output_url(),
            file_type: self.file_type,
            poll_interval: self.poll_interval,
            item,
            crop_rect,
            max_duration,
            sink,
        };
        tokio::spawn(job.run(completion));
    }

    /// Ask every in-flight export to cancel. Their completions still fire.
    pub fn cancel_all(&self) -> usize {
        self.registry.cancel_all()
    }
}

impl ExportJob {
    async fn run<F>(self, completion: F)
    where
        F: FnOnce(ExportResult) + Send + 'static,
    {
        let result = self.execute().await;
        self.registry.unregister(self.id);
        self.queue.dispatch(move || completion(result));
    }

    async fn execute(&self) -> ExportResult {
        if !self.item.is_video() {
            error!("export {:?}: {} is not a video", self.id, self.item.local_id);
            return Err(ExportError::CompositionBuildFailed);
        }

        let asset = match self
            .backend
            .request_video_asset(&self.item, AssetRequestOptions::full_quality())
            .await
        {
            Ok(asset) => asset,
            Err(e) => {
                error!("export {:?}: could not resolve asset {}: {}", self.id, self.item.local_id, e);
                return Err(ExportError::CompositionBuildFailed);
            }
        };

        if self.registry.is_cancel_requested(self.id) {
            debug!("export {:?} cancelled before submission", self.id);
            return Err(ExportError::Unhandled(ExportStatus::Cancelled));
        }

        let composition =
            match VideoComposition::for_crop(asset.as_ref(), self.crop_rect, self.max_duration) {
                Ok(composition) => composition,
                Err(e) => {
                    error!("export {:?}: composition for {} failed: {}", self.id, self.item.local_id, e);
                    return Err(ExportError::CompositionBuildFailed);
                }
            };

        let request = ExportRequest {
            asset,
            composition,
            output_url: self.output_url.clone(),
            file_type: self.file_type,
            preset: ExportPreset::HighestQuality,
        };
        let session = match self.backend.start_export(request) {
            Ok(session) => session,
            Err(e) => {
                error!("export {:?}: backend rejected job: {}", self.id, e);
                return Err(ExportError::BackendFailure(e.to_string()));
            }
        };
        self.registry.attach(self.id, session.clone());
        info!(
            "export {:?} started for {} -> {}",
            self.id,
            self.item.local_id,
            self.output_url.display()
        );

        let poller = ProgressPoller::start(
            session.clone(),
            self.sink.clone(),
            self.queue.clone(),
            self.poll_interval,
        );
        let status = session.finished().await;
        poller.stop().await;

        match status {
            ExportStatus::Completed => match session.output_url() {
                Some(url) => {
                    info!("export {:?} completed: {}", self.id, url.display());
                    Ok(url)
                }
                None => {
                    warn!("export {:?} completed without an output url", self.id);
                    Err(ExportError::MissingOutput)
                }
            },
            ExportStatus::Failed => {
                let detail = session
                    .error()
                    .unwrap_or_else(|| "unknown export error".to_string());
                warn!("export {:?} failed: {}", self.id, detail);
                Err(ExportError::BackendFailure(detail))
            }
            other => {
                warn!("export {:?} finished with status {:?}, not handled", self.id, other);
                Err(ExportError::Unhandled(other))
            }
        }
    }
}

fn unique_output_url(dir: &Path, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", Uuid::new_v4(), extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_output_urls_differ() {
        let dir = Path::new("/tmp/exports");
        let a = unique_output_url(dir, "mp4");
        let b = unique_output_url(dir, "mp4");
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(dir));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("mp4"));
    }
}
