//! End-to-end floor-plane projection of a single image.

use crate::display::{DebugDisplay, NoDisplay};
use crate::traits::{BilinearWarper, ImageWarper, PatternDetector};
use floorplane_chessboard::{
    extract_corners, horizon_tilt_deg, organize_grid, two_bottom_left_points, OrderingError,
};
use floorplane_core::{
    build_canvas_safe_homography, CanvasSize, GrayImage, GrayImageView, GridSize, Homography,
    HomographyError, Quad, RansacParams,
};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Largest rectified canvas accepted by default, in pixels.
pub const DEFAULT_MAX_CANVAS_PIXELS: usize = 64 * 1024 * 1024;

/// Errors produced by [`FloorProjector::project`].
#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("chessboard pattern not found")]
    PatternNotFound,

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    Homography(#[from] HomographyError),

    #[error("rectified canvas {width}x{height} exceeds the limit of {max_pixels} pixels")]
    CanvasTooLarge {
        width: usize,
        height: usize,
        max_pixels: usize,
    },

    #[error("perspective warp failed")]
    WarpFailed,
}

/// Projector configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorParams {
    /// Forward intermediate images to the [`DebugDisplay`].
    pub interactive: bool,
    /// Upper bound on `width * height` of the rectified image.
    pub max_canvas_pixels: usize,
    pub ransac: RansacParams,
}

impl Default for ProjectorParams {
    fn default() -> Self {
        Self {
            interactive: false,
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
            ransac: RansacParams::default(),
        }
    }
}

/// Output of a successful projection.
#[derive(Clone, Debug)]
pub struct FloorProjection {
    pub rectified: GrayImage,
    /// Target rectangle of the pattern in `rectified` coordinates.
    pub target: Quad,
    /// Outer pattern corners in the input image.
    pub source: Quad,
    /// Input image corners mapped into `rectified` coordinates.
    pub transformed_corners: Quad,
    /// Maps input pixels to `rectified` pixels; includes `shift`.
    pub homography: Homography,
    pub shift: [i32; 2],
    pub square_size_px: f32,
    pub horizon_tilt_deg: f32,
}

impl FloorProjection {
    /// Everything but the pixels, for serialization.
    pub fn report(&self) -> ProjectionReport {
        ProjectionReport {
            width: self.rectified.width,
            height: self.rectified.height,
            target: self.target,
            source: self.source,
            transformed_corners: self.transformed_corners,
            homography: self.homography.to_array(),
            shift: self.shift,
            square_size_px: self.square_size_px,
            horizon_tilt_deg: self.horizon_tilt_deg,
        }
    }
}

/// Serializable summary of a [`FloorProjection`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionReport {
    pub width: usize,
    pub height: usize,
    pub target: Quad,
    pub source: Quad,
    pub transformed_corners: Quad,
    pub homography: [[f64; 3]; 3],
    pub shift: [i32; 2],
    pub square_size_px: f32,
    pub horizon_tilt_deg: f32,
}

/// Axis-aligned rectangle the pattern is straightened onto.
///
/// Anchored at the bottom-left pattern corner `blp`, with `square` pixels
/// between neighbouring corners; y grows downward so the top edge sits at
/// `blp.y - square * (rows - 1)`.
pub fn target_rectangle(blp: Point2<f32>, square: f32, size: GridSize) -> Quad {
    let w = square * (size.cols() - 1) as f32;
    let h = square * (size.rows() - 1) as f32;
    Quad::new([
        Point2::new(blp.x, blp.y),
        Point2::new(blp.x + w, blp.y),
        Point2::new(blp.x + w, blp.y - h),
        Point2::new(blp.x, blp.y - h),
    ])
}

/// Rectifies images onto the plane of a chessboard pattern.
pub struct FloorProjector<D, W = BilinearWarper, S = NoDisplay> {
    detector: D,
    warper: W,
    display: S,
    params: ProjectorParams,
}

impl<D: PatternDetector> FloorProjector<D> {
    pub fn new(detector: D, params: ProjectorParams) -> Self {
        Self {
            detector,
            warper: BilinearWarper,
            display: NoDisplay,
            params,
        }
    }
}

impl<D, W, S> FloorProjector<D, W, S> {
    pub fn with_warper<W2: ImageWarper>(self, warper: W2) -> FloorProjector<D, W2, S> {
        FloorProjector {
            detector: self.detector,
            warper,
            display: self.display,
            params: self.params,
        }
    }

    pub fn with_display<S2: DebugDisplay>(self, display: S2) -> FloorProjector<D, W, S2> {
        FloorProjector {
            detector: self.detector,
            warper: self.warper,
            display,
            params: self.params,
        }
    }

    pub fn params(&self) -> &ProjectorParams {
        &self.params
    }
}

impl<D, W, S> FloorProjector<D, W, S>
where
    D: PatternDetector,
    W: ImageWarper,
    S: DebugDisplay,
{
    /// Detect `pattern` in `image` and warp the image so the pattern becomes
    /// an axis-aligned grid of square cells.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width, height = image.height, rows = pattern.rows(), cols = pattern.cols())
        )
    )]
    pub fn project(
        &self,
        image: &GrayImageView<'_>,
        pattern: GridSize,
    ) -> Result<FloorProjection, ProjectError> {
        let raw = self
            .detector
            .detect(image, pattern)
            .ok_or(ProjectError::PatternNotFound)?;
        self.show("source", image);

        let grid = organize_grid(&raw, pattern)?;
        let source = extract_corners(&grid);
        let (blp, next) = two_bottom_left_points(&grid);
        let square_size_px = (next - blp).norm();
        let target = target_rectangle(blp, square_size_px, pattern);
        let horizon_tilt_deg = horizon_tilt_deg(&grid);
        debug!(
            "pattern {}x{}: square {:.2}px, tilt {:.2} deg",
            pattern.rows(), pattern.cols(), square_size_px, horizon_tilt_deg
        );

        let safe = build_canvas_safe_homography(&source, &target, image.size(), &self.params.ransac)?;
        let out = safe.transformed_bounds.extent().canvas_size();
        self.check_canvas(out)?;

        let rectified = self
            .warper
            .warp(image, &safe.h, out)
            .ok_or(ProjectError::WarpFailed)?;
        self.show("rectified", &rectified.view());

        Ok(FloorProjection {
            rectified,
            target: safe.shift_quad(&target),
            source,
            transformed_corners: safe.transformed_bounds,
            homography: safe.h,
            shift: safe.shift,
            square_size_px,
            horizon_tilt_deg,
        })
    }

    fn check_canvas(&self, out: CanvasSize) -> Result<(), ProjectError> {
        if out.area() > self.params.max_canvas_pixels {
            return Err(ProjectError::CanvasTooLarge {
                width: out.width,
                height: out.height,
                max_pixels: self.params.max_canvas_pixels,
            });
        }
        Ok(())
    }

    fn show(&self, name: &str, image: &GrayImageView<'_>) {
        if self.params.interactive {
            self.display.show(name, image, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn target_rectangle_is_anchored_at_bottom_left() {
        let size = GridSize::new(4, 5).unwrap();
        let q = target_rectangle(Point2::new(100.0, 300.0), 20.0, size);
        assert_eq!(q.bottom_left(), Point2::new(100.0, 300.0));
        assert_eq!(q.bottom_right(), Point2::new(180.0, 300.0));
        assert_eq!(q.top_right(), Point2::new(180.0, 240.0));
        assert_eq!(q.top_left(), Point2::new(100.0, 240.0));
    }

    #[test]
    fn params_fill_missing_fields_from_defaults() {
        let p: ProjectorParams =
            serde_json::from_str(r#"{ "interactive": true, "ransac": { "max_iters": 50 } }"#)
                .unwrap();
        assert!(p.interactive);
        assert_eq!(p.max_canvas_pixels, DEFAULT_MAX_CANVAS_PIXELS);
        assert_eq!(p.ransac.max_iters, 50);
        assert_relative_eq!(
            p.ransac.reprojection_threshold_px,
            RansacParams::default().reprojection_threshold_px
        );
    }
}
