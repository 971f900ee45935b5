//! Core types and utilities for floor-plane rectification.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete corner detector or image codec.
//!
//! ## Quickstart
//!
//! ```
//! use floorplane_core::{build_canvas_safe_homography, CanvasSize, Quad, RansacParams};
//! use nalgebra::Point2;
//!
//! let current = Quad::new([
//!     Point2::new(20.0, 90.0),
//!     Point2::new(110.0, 80.0),
//!     Point2::new(100.0, 20.0),
//!     Point2::new(30.0, 25.0),
//! ]);
//! let target = Quad::new([
//!     Point2::new(20.0, 90.0),
//!     Point2::new(110.0, 90.0),
//!     Point2::new(110.0, 30.0),
//!     Point2::new(20.0, 30.0),
//! ]);
//!
//! let safe = build_canvas_safe_homography(
//!     &current,
//!     &target,
//!     CanvasSize::new(128, 128),
//!     &RansacParams::default(),
//! )?;
//! assert!(safe.transformed_bounds.extent().min_x > -1.0);
//! # Ok::<(), floorplane_core::HomographyError>(())
//! ```

mod canvas;
mod corner;
mod grid;
mod homography;
mod image;
mod logger;
mod quad;
mod ransac;

pub use canvas::{build_canvas_safe_homography, CanvasSafeHomography};
pub use corner::Corner;
pub use grid::{GridSize, GridSizeError, PointGrid};
pub use homography::{
    estimate_homography, homography_from_4pt, is_degenerate_quad, Homography, HomographyError,
};
pub use image::{
    resize_gray, sample_bilinear, sample_bilinear_u8, warp_perspective_gray, GrayImage,
    GrayImageView,
};
pub use quad::{BoundingExtent, CanvasSize, Quad};
pub use ransac::{fit_homography_ransac, RansacParams, RobustHomography};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
