// Crop composition: render size, frame rate and the single static-transform instruction.

use std::time::Duration;

use anyhow::{anyhow, Result};

use super::backend::VideoAsset;
use crate::config::{EXPORT_FRAME_RATE, INSTRUCTION_RANGE_CAP_SECONDS};
use crate::geometry::rect::{Rect, Size};
use crate::geometry::transform::{build_transform, AffineTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Duration,
    pub duration: Duration,
}

impl TimeRange {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Transform applied to one source track from `at` onward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerInstruction {
    pub track_id: i32,
    pub transform: AffineTransform,
    pub at: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionInstruction {
    pub time_range: TimeRange,
    pub layer_instructions: Vec<LayerInstruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoComposition {
    pub render_size: Size,
    pub frame_rate: u32,
    pub instructions: Vec<CompositionInstruction>,
}

impl VideoComposition {
    /// Composition that crops the first video track of `asset` to `crop_rect`.
    ///
    /// Fails when the asset has no video track or the crop has no area.
    pub fn for_crop(
        asset: &dyn VideoAsset,
        crop_rect: Rect,
        max_duration: Option<Duration>,
    ) -> Result<Self> {
        if crop_rect.is_empty() {
            return Err(anyhow!("crop rect {:?} has no area", crop_rect));
        }
        let track = asset
            .video_tracks()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("asset has no video track"))?;

        let layer = LayerInstruction {
            track_id: track.track_id,
            transform: build_transform(&track, crop_rect),
            at: Duration::ZERO,
        };
        let instruction = CompositionInstruction {
            time_range: TimeRange {
                start: Duration::ZERO,
                duration: instruction_duration(max_duration, asset.duration()),
            },
            layer_instructions: vec![layer],
        };

        Ok(Self {
            render_size: crop_rect.size,
            frame_rate: EXPORT_FRAME_RATE,
            instructions: vec![instruction],
        })
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    /// Total time covered by the instructions.
    pub fn duration(&self) -> Duration {
        self.instructions
            .iter()
            .map(|i| i.time_range.end())
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

/// Shortest of the hard cap, the caller's limit and the asset itself.
pub fn instruction_duration(max_duration: Option<Duration>, asset_duration: Duration) -> Duration {
    let cap = Duration::from_secs(INSTRUCTION_RANGE_CAP_SECONDS);
    let limit = match max_duration {
        Some(max) => max.min(cap),
        None => cap,
    };
    asset_duration.min(limit)
}
