//! Extreme points of an organized grid and of an image frame.

use floorplane_core::{CanvasSize, PointGrid, Quad};
use nalgebra::Point2;

/// Outer corners of the grid as a [`Quad`]: bottom-left, bottom-right,
/// top-right, top-left.
pub fn extract_corners(grid: &PointGrid) -> Quad {
    let last_row = grid.rows() - 1;
    let last_col = grid.cols() - 1;
    Quad::new([
        grid.get(last_row, 0),
        grid.get(last_row, last_col),
        grid.get(0, last_col),
        grid.get(0, 0),
    ])
}

/// Corners of a `width x height` image frame in the same order as
/// [`extract_corners`].
pub fn extract_image_corners(size: CanvasSize) -> Quad {
    Quad::from_canvas(size)
}

/// The bottom-left grid point and its right-hand neighbour.
pub fn two_bottom_left_points(grid: &PointGrid) -> (Point2<f32>, Point2<f32>) {
    let last_row = grid.rows() - 1;
    (grid.get(last_row, 0), grid.get(last_row, 1))
}

/// Angle in degrees between the bottom edge of the grid and the image
/// horizontal. Always in `[0, 90]`; `0` for a degenerate edge.
pub fn horizon_tilt_deg(grid: &PointGrid) -> f32 {
    let (a, b) = two_bottom_left_points(grid);
    let len = (b - a).norm();
    if len <= f32::EPSILON {
        return 0.0;
    }
    ((b.y - a.y).abs() / len).clamp(0.0, 1.0).asin().to_degrees()
}
