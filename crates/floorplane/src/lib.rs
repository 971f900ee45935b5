//! High-level facade crate for the `floorplane-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometric core and the chessboard ordering crate
//! - [`FloorProjector`], which turns a photograph of a chessboard lying on a
//!   plane into a top-down view of that plane
//! - (feature `image`) a ChESS-based [`PatternDetector`] and `image` helpers
//! - (feature `cli`) the `floorplane` batch binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use floorplane::detect::{gray_view, ChessPatternDetector};
//! use floorplane::{FloorProjector, GridSize, ProjectorParams};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("floor.png")?.decode()?.to_luma8();
//! let projector = FloorProjector::new(ChessPatternDetector::default(), ProjectorParams::default());
//!
//! let floor = projector.project(&gray_view(&img), GridSize::new(4, 5)?)?;
//! println!(
//!     "rectified {}x{}, square {:.1}px",
//!     floor.rectified.width, floor.rectified.height, floor.square_size_px
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `floorplane::core`: grids, quads, homographies, RANSAC, images, logging.
//! - `floorplane::chessboard`: scan-order detection and grid reordering.
//! - `floorplane::detect` (feature `image`): ChESS detector adapter.

pub use floorplane_chessboard as chessboard;
pub use floorplane_core as core;

pub use floorplane_chessboard::{Orientation, OrderingError};
pub use floorplane_core::{
    CanvasSize, Corner, GrayImage, GrayImageView, GridSize, Homography, HomographyError, Quad,
    RansacParams,
};

mod display;
mod projector;
mod traits;

pub use display::{display_size, DebugDisplay, NoDisplay, DEFAULT_SCREEN, DISPLAY_SCREEN_FRACTION};
pub use projector::{
    target_rectangle, FloorProjection, FloorProjector, ProjectError, ProjectionReport,
    ProjectorParams, DEFAULT_MAX_CANVAS_PIXELS,
};
pub use traits::{BilinearWarper, ImageWarper, PatternDetector};

#[cfg(feature = "image")]
pub mod detect;
