use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A chessboard X-junction as reported by a corner detector.
///
/// Detector-agnostic: adapters convert their native descriptors into this
/// type before grid reconstruction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    /// Subpixel position in image pixels.
    pub position: Point2<f32>,
    /// Directions of the two grid lines through the corner, radians.
    /// Each is an undirected line, so `a` and `a + π` are equivalent.
    pub axes: [f32; 2],
    /// Detector response; larger is more corner-like.
    pub strength: f32,
}

impl Corner {
    pub fn new(position: Point2<f32>, axes: [f32; 2], strength: f32) -> Self {
        Self {
            position,
            axes,
            strength,
        }
    }
}
