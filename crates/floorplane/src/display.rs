//! Optional visual feedback while projecting.

use floorplane_core::{CanvasSize, GrayImageView};

/// Fraction of the screen a debug image may occupy along either axis.
pub const DISPLAY_SCREEN_FRACTION: f32 = 0.7;

/// Screen the debug output is sized for when none is given.
pub const DEFAULT_SCREEN: CanvasSize = CanvasSize::new(1920, 1080);

/// Receives intermediate images by name.
///
/// `wait` marks images a viewer should hold on to until acknowledged.
pub trait DebugDisplay {
    fn show(&self, name: &str, image: &GrayImageView<'_>, wait: bool);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplay;

impl DebugDisplay for NoDisplay {
    fn show(&self, _name: &str, _image: &GrayImageView<'_>, _wait: bool) {}
}

/// Scale `original` to fit into 70% of `screen`, keeping the aspect ratio.
///
/// Small images are scaled up as well.
pub fn display_size(original: CanvasSize, screen: CanvasSize) -> CanvasSize {
    let target_w = screen.width as f32 * DISPLAY_SCREEN_FRACTION;
    let target_h = screen.height as f32 * DISPLAY_SCREEN_FRACTION;
    let ratio = (original.width as f32 / target_w).max(original.height as f32 / target_h);
    if !(ratio.is_finite() && ratio > 0.0) {
        return original;
    }
    CanvasSize::new(
        (original.width as f32 / ratio).round() as usize,
        (original.height as f32 / ratio).round() as usize,
    )
}
