// Affine transforms and the orientation-correcting crop transform for video tracks.

use glam::{DAffine2, DMat2, DVec2};
use tracing::debug;

use super::rect::{Point, Rect, Size};
use crate::library::item::TrackInfo;

/// Scale applied after rotation and translation. Stays at identity until the
/// render size is allowed to differ from the crop size.
const RENDER_SCALE: f64 = 1.0;

/// 2x3 affine matrix with the `[a b c d tx ty]` layout used by media containers:
/// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform(DAffine2);

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform(DAffine2::IDENTITY);

    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self(DAffine2::from_mat2_translation(
            DMat2::from_cols(DVec2::new(a, b), DVec2::new(c, d)),
            DVec2::new(tx, ty),
        ))
    }

    pub fn a(&self) -> f64 {
        self.0.matrix2.x_axis.x
    }

    pub fn b(&self) -> f64 {
        self.0.matrix2.x_axis.y
    }

    pub fn c(&self) -> f64 {
        self.0.matrix2.y_axis.x
    }

    pub fn d(&self) -> f64 {
        self.0.matrix2.y_axis.y
    }

    pub fn tx(&self) -> f64 {
        self.0.translation.x
    }

    pub fn ty(&self) -> f64 {
        self.0.translation.y
    }

    /// Prepend a translation: points are translated, then mapped by `self`.
    pub fn translated_by(&self, tx: f64, ty: f64) -> Self {
        Self(self.0 * DAffine2::from_translation(DVec2::new(tx, ty)))
    }

    /// Prepend a rotation by `angle` radians.
    pub fn rotated_by(&self, angle: f64) -> Self {
        Self(self.0 * DAffine2::from_angle(angle))
    }

    /// Prepend a scale.
    pub fn scaled_by(&self, sx: f64, sy: f64) -> Self {
        Self(self.0 * DAffine2::from_scale(DVec2::new(sx, sy)))
    }

    pub fn apply(&self, point: Point) -> Point {
        let p = self.0.transform_point2(DVec2::new(point.x, point.y));
        Point::new(p.x, p.y)
    }

    /// Rotation encoded by the matrix, `atan2(b, a)`.
    pub fn rotation_angle(&self) -> f64 {
        self.b().atan2(self.a())
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Recording orientation derived from a track's preferred transform.
///
/// Matching is exact on the `-1.0` entries; near-unit values from unusual
/// encoders fall through to `Unknown` and get no rotation offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 90°, `[0 1 -1 0]`.
    Portrait,
    /// 270°, `[0 -1 1 0]`.
    PortraitUpsideDown,
    /// 180°, `[-1 0 0 -1]`.
    LandscapeLeft,
    /// Sensor-native, identity rotation.
    LandscapeRight,
    Unknown,
}

impl Orientation {
    pub fn from_preferred_transform(t: &AffineTransform) -> Self {
        if t.b() == -1.0 {
            Orientation::PortraitUpsideDown
        } else if t.c() == -1.0 {
            Orientation::Portrait
        } else if t.a() == -1.0 {
            Orientation::LandscapeLeft
        } else if t.a() == 1.0 && t.b() == 0.0 && t.c() == 0.0 && t.d() == 1.0 {
            Orientation::LandscapeRight
        } else {
            Orientation::Unknown
        }
    }

    /// Offset that moves rotated content of `natural_size` back to the top-left origin.
    pub fn rotation_offset(self, natural_size: Size) -> Point {
        match self {
            Orientation::Portrait => Point::new(natural_size.height, 0.0),
            Orientation::PortraitUpsideDown => Point::new(0.0, natural_size.width),
            Orientation::LandscapeLeft => Point::new(natural_size.width, natural_size.height),
            Orientation::LandscapeRight | Orientation::Unknown => Point::ZERO,
        }
    }
}

/// Transform mapping a track's native pixel buffer into `crop_rect`.
///
/// Rotates by the preferred transform's angle, then translates by the
/// orientation offset minus the crop origin. Pure and deterministic.
pub fn build_transform(track: &TrackInfo, crop_rect: Rect) -> AffineTransform {
    let preferred = track.preferred_transform;
    let rotation = preferred.rotation_angle();
    let orientation = Orientation::from_preferred_transform(&preferred);
    let rotation_offset = orientation.rotation_offset(track.natural_size);
    let offset = Point::new(-crop_rect.origin.x, -crop_rect.origin.y);

    let transform = AffineTransform::IDENTITY
        .scaled_by(RENDER_SCALE, RENDER_SCALE)
        .translated_by(offset.x + rotation_offset.x, offset.y + rotation_offset.y)
        .rotated_by(rotation);

    debug!(
        "crop transform: track size {:?}, preferred {:?}, orientation {:?}, angle {:.4}, offset {:?} -> {:?}",
        track.natural_size, preferred, orientation, rotation, rotation_offset, transform
    );
    transform
}

pub fn radians(degrees: f64) -> f64 {
    std::f64::consts::PI * degrees / 180.0
}

pub fn degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}
