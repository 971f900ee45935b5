//! Chessboard corner ordering built on top of `floorplane-core`.
//!
//! ## Quickstart
//!
//! ```
//! use floorplane_chessboard::{extract_corners, organize_grid};
//! use floorplane_core::GridSize;
//! use nalgebra::Point2;
//!
//! let size = GridSize::new(2, 3).unwrap();
//! // Corners as a detector might emit them: bottom row first, right to left.
//! let raw = vec![
//!     Point2::new(40.0, 30.0), Point2::new(20.0, 30.0), Point2::new(0.0, 30.0),
//!     Point2::new(40.0, 10.0), Point2::new(20.0, 10.0), Point2::new(0.0, 10.0),
//! ];
//! let grid = organize_grid(&raw, size).unwrap();
//! assert_eq!(grid.get(0, 0), Point2::new(0.0, 10.0));
//!
//! let quad = extract_corners(&grid);
//! assert_eq!(quad.bottom_right(), Point2::new(40.0, 30.0));
//! ```
//!
//! Pipeline:
//! 0. (optional) Link raw detector corners into a complete board
//!    ([`ChessboardDetector::detect_from_corners`]).
//! 1. Classify the scan order of the raw list ([`detect_orientation`]).
//! 2. Pick row and column sweeps from the first point and its neighbours.
//! 3. Re-index the list so rows go down and columns go right in the image
//!    ([`organize_grid`]).
//! 4. Read off the outer corners ([`extract_corners`]).
//!
//! Transposed scans are classified but not reordered; [`organize_grid`]
//! reports them as [`OrderingError::UnsupportedOrientation`].

mod corners;
mod detector;
mod error;
mod geom;
mod gridgraph;
mod orientation;
mod organize;
mod params;

pub use corners::{extract_corners, extract_image_corners, horizon_tilt_deg, two_bottom_left_points};
pub use detector::ChessboardDetector;
pub use error::OrderingError;
pub use geom::{axis_misalignment, axis_vec_diff, dominant_grid_axis};
pub use gridgraph::{
    assign_grid_coordinates, connected_components, GridGraph, NeighborDirection, NodeNeighbor,
};
pub use orientation::{detect_orientation, is_monotonic_run, Axis, Orientation};
pub use organize::{organize_grid, scan_plan, ScanPlan, SweepRange};
pub use params::{ChessboardParams, GridGraphParams};

#[cfg(test)]
pub(crate) mod testutil {
    use floorplane_core::GridSize;
    use nalgebra::Point2;

    #[derive(Clone, Copy, Debug)]
    pub enum Scan {
        RowMajor,
        ColMajor,
    }

    /// Axis-aligned board in physical order: row-major, rows going down.
    pub fn board(size: GridSize) -> Vec<Point2<f32>> {
        (0..size.rows())
            .flat_map(|r| {
                (0..size.cols()).map(move |c| Point2::new(10.0 + 20.0 * c as f32, 10.0 + 20.0 * r as f32))
            })
            .collect()
    }

    /// Emit the board in `order`, optionally walking either axis backwards.
    pub fn scan_from(size: GridSize, order: Scan, flip_x: bool, flip_y: bool) -> Vec<Point2<f32>> {
        let phys = board(size);
        let rows: Vec<usize> = if flip_y {
            (0..size.rows()).rev().collect()
        } else {
            (0..size.rows()).collect()
        };
        let cols: Vec<usize> = if flip_x {
            (0..size.cols()).rev().collect()
        } else {
            (0..size.cols()).collect()
        };
        let mut out = Vec::with_capacity(size.len());
        match order {
            Scan::RowMajor => {
                for &r in &rows {
                    for &c in &cols {
                        out.push(phys[r * size.cols() + c]);
                    }
                }
            }
            Scan::ColMajor => {
                for &c in &cols {
                    for &r in &rows {
                        out.push(phys[r * size.cols() + c]);
                    }
                }
            }
        }
        out
    }

    /// Forward scan, or the same scan read back to front.
    pub fn scan(size: GridSize, order: Scan, reversed: bool) -> Vec<Point2<f32>> {
        scan_from(size, order, reversed, reversed)
    }
}
