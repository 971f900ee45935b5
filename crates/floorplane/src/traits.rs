//! Seams between the projector and its pixel-level collaborators.

use floorplane_core::{warp_perspective_gray, CanvasSize, GrayImage, GrayImageView, GridSize, Homography};
use nalgebra::Point2;

/// Finds the inner corners of a chessboard pattern.
///
/// Implementations return exactly `size.len()` points in any row-major or
/// column-major scan order, or `None` when the pattern is not visible.
pub trait PatternDetector {
    fn detect(&self, image: &GrayImageView<'_>, size: GridSize) -> Option<Vec<Point2<f32>>>;
}

/// Resamples an image through a destination-from-source homography.
pub trait ImageWarper {
    fn warp(&self, image: &GrayImageView<'_>, h: &Homography, out: CanvasSize) -> Option<GrayImage>;
}

/// [`ImageWarper`] backed by [`warp_perspective_gray`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BilinearWarper;

impl ImageWarper for BilinearWarper {
    fn warp(&self, image: &GrayImageView<'_>, h: &Homography, out: CanvasSize) -> Option<GrayImage> {
        warp_perspective_gray(image, h, out.width, out.height)
    }
}
