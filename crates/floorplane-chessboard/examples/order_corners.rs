//! Order a synthetic, perspective-distorted board emitted bottom-up and
//! print its outer corners.
//!
//! Run with `RUST_LOG=debug cargo run -p floorplane-chessboard --example order_corners`.

use floorplane_chessboard::{detect_orientation, extract_corners, horizon_tilt_deg, organize_grid};
use floorplane_core::{GridSize, Homography};
use nalgebra::{Matrix3, Point2};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let size = GridSize::new(6, 9)?;
    let camera = Homography::new(Matrix3::new(
        0.92, 0.08, 140.0, //
        -0.05, 0.88, 90.0, //
        0.0002, 0.0006, 1.0,
    ));

    // Bottom row first, each row right to left.
    let mut raw = Vec::with_capacity(size.len());
    for r in (0..size.rows()).rev() {
        for c in (0..size.cols()).rev() {
            raw.push(Point2::new(c as f32 * 40.0, r as f32 * 40.0));
        }
    }
    let raw = camera.apply_all(&raw);

    let orientation = detect_orientation(&raw, size)?;
    println!("orientation: {orientation:?}");

    let grid = organize_grid(&raw, size)?;
    let quad = extract_corners(&grid);
    println!("bottom-left : {:?}", quad.bottom_left());
    println!("bottom-right: {:?}", quad.bottom_right());
    println!("top-right   : {:?}", quad.top_right());
    println!("top-left    : {:?}", quad.top_left());
    println!("horizon tilt: {:.2} deg", horizon_tilt_deg(&grid));
    Ok(())
}
