// Export backend abstraction: asset resolution, export submission and live session handles.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::composition::VideoComposition;
use crate::library::item::{MediaItem, TrackInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportStatus {
    Unknown,
    Waiting,
    Exporting,
    Completed,
    Failed,
    Cancelled,
}

impl ExportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExportStatus::Completed | ExportStatus::Failed | ExportStatus::Cancelled
        )
    }
}

/// Output container written by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFileType {
    #[default]
    Mp4,
    Mov,
    M4v,
}

impl OutputFileType {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFileType::Mp4 => "mp4",
            OutputFileType::Mov => "mov",
            OutputFileType::M4v => "m4v",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPreset {
    HighestQuality,
    MediumQuality,
    LowQuality,
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    HighQualityFormat,
    FastFormat,
    Opportunistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRequestOptions {
    /// Allow downloading the original from remote storage.
    pub network_access_allowed: bool,
    pub delivery_mode: DeliveryMode,
}

impl AssetRequestOptions {
    /// Full-quality original, fetched over the network when not on device.
    pub fn full_quality() -> Self {
        Self {
            network_access_allowed: true,
            delivery_mode: DeliveryMode::HighQualityFormat,
        }
    }
}

/// A playable asset resolved from a library item.
pub trait VideoAsset: Send + Sync {
    fn duration(&self) -> Duration;
    fn video_tracks(&self) -> Vec<TrackInfo>;
}

pub struct ExportRequest {
    pub asset: Arc<dyn VideoAsset>,
    pub composition: VideoComposition,
    pub output_url: PathBuf,
    pub file_type: OutputFileType,
    pub preset: ExportPreset,
}

/// Live handle to one export running inside the backend.
#[async_trait]
pub trait ExportSession: Send + Sync {
    /// Fraction complete in `[0, 1]`.
    fn progress(&self) -> f32;
    fn status(&self) -> ExportStatus;
    fn error(&self) -> Option<String>;
    fn output_url(&self) -> Option<PathBuf>;
    /// Request cancellation. Returns immediately; the session still finishes.
    fn cancel(&self);
    /// Resolves once the session reaches a terminal status.
    async fn finished(&self) -> ExportStatus;
}

#[async_trait]
pub trait ExportBackend: Send + Sync {
    async fn request_video_asset(
        &self,
        item: &MediaItem,
        options: AssetRequestOptions,
    ) -> Result<Arc<dyn VideoAsset>>;

    fn start_export(&self, request: ExportRequest) -> Result<Arc<dyn ExportSession>>;
}
