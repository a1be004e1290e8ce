use crate::geometry::rect::Size;
use crate::geometry::transform::AffineTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// One library asset. Owned by the library; shared read-only within a fetch generation.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    /// Library-assigned identifier, stable across generations.
    pub local_id: String,
    pub kind: MediaKind,
    /// `None` for stills.
    pub duration_seconds: Option<f64>,
    /// Size of the stored pixel buffer, before orientation is applied.
    pub natural_size: Size,
    /// Sensor-to-display orientation of the stored buffer.
    pub preferred_transform: AffineTransform,
}

impl MediaItem {
    pub fn image(local_id: impl Into<String>, natural_size: Size) -> Self {
        Self {
            local_id: local_id.into(),
            kind: MediaKind::Image,
            duration_seconds: None,
            natural_size,
            preferred_transform: AffineTransform::IDENTITY,
        }
    }

    pub fn video(
        local_id: impl Into<String>,
        natural_size: Size,
        duration_seconds: f64,
        preferred_transform: AffineTransform,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            kind: MediaKind::Video,
            duration_seconds: Some(duration_seconds),
            natural_size,
            preferred_transform,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Geometry of one video track inside a resolved asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackInfo {
    pub track_id: i32,
    pub natural_size: Size,
    pub preferred_transform: AffineTransform,
}
