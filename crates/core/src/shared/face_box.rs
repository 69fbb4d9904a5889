use serde::{Deserialize, Serialize};

/// Axis-aligned face rectangle in image pixel coordinates.
///
/// `y` is the top edge and `y + height` the bottom edge. Produced by a
/// [`FaceDetector`](crate::detection::domain::face_detector::FaceDetector)
/// and consumed read-only by the window placer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y as f64
    }

    pub fn bottom(&self) -> f64 {
        self.y as f64 + self.height as f64
    }
}
