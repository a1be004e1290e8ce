use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::backend::OutputFileType;
use crate::geometry::rect::Size;

/// Fraction of the viewport height added above and below it when pre-warming thumbnails.
pub const PREHEAT_MARGIN_FRACTION: f64 = 0.5;

/// Default midpoint travel, as a fraction of viewport height, before the cache window moves.
pub const DEFAULT_PREHEAT_THRESHOLD_FRACTION: f64 = 1.0 / 3.0;

/// Hard ceiling on the exported instruction time range, in seconds.
pub const INSTRUCTION_RANGE_CAP_SECONDS: u64 = 60;

/// Output frame rate of every export.
pub const EXPORT_FRAME_RATE: u32 = 30;

/// Period of the export progress poller in milliseconds.
pub const PROGRESS_POLL_INTERVAL_MS: u64 = 100;

/// Progress above this value is reported as done and the sink is reset to zero.
pub const PROGRESS_COMPLETE_THRESHOLD: f32 = 0.99;

/// Number of thumbnail columns the screen width is divided into.
pub const THUMBNAIL_COLUMNS: u32 = 4;

/// Top-level configuration for the gallery engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen width in points.
    pub screen_width: f64,
    /// Device pixel scale (points to pixels).
    pub screen_scale: f64,
    /// Container the export backend writes. Also decides the file extension.
    pub output_file_type: OutputFileType,
    /// Midpoint travel fraction that triggers a cache window update.
    pub preheat_threshold_fraction: f64,
    /// Directory for exported files. Falls back to the platform temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Square thumbnail size requested from the cache backend, in pixels.
    pub fn thumbnail_size(&self) -> Size {
        let side = self.screen_width / THUMBNAIL_COLUMNS as f64 * self.screen_scale;
        Size::new(side, side)
    }

    /// Extension of exported files, without the dot.
    pub fn output_file_extension(&self) -> &'static str {
        self.output_file_type.extension()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 390.0,
            screen_scale: 3.0,
            output_file_type: OutputFileType::Mp4,
            preheat_threshold_fraction: DEFAULT_PREHEAT_THRESHOLD_FRACTION,
            temp_dir: None,
        }
    }
}
