// Plane geometry: rectangles for viewport math and affine transforms for video orientation.

pub mod rect;
pub mod transform;
