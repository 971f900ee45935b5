//! Rectify one photograph onto the plane of its chessboard.
//!
//! ```text
//! cargo run -p floorplane --example rectify_image -- floor.jpg 4 5 floor_top.png
//! ```

use floorplane::detect::{gray_view, ChessPatternDetector};
use floorplane::{FloorProjector, GridSize, ProjectorParams};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [input, rows, cols, output] = args.as_slice() else {
        return Err("usage: rectify_image <input> <rows> <cols> <output>".into());
    };
    let pattern = GridSize::new(rows.parse()?, cols.parse()?)?;

    let img = image::open(input)?.to_luma8();
    let projector = FloorProjector::new(ChessPatternDetector::default(), ProjectorParams::default());
    let floor = projector.project(&gray_view(&img), pattern)?;

    println!("{}", serde_json::to_string_pretty(&floor.report())?);

    let out = image::GrayImage::from_raw(
        floor.rectified.width as u32,
        floor.rectified.height as u32,
        floor.rectified.data,
    )
    .ok_or("rectified buffer does not match its size")?;
    out.save(output)?;
    Ok(())
}
