use crate::traits::PatternDetector;
use chess_corners::{find_chess_corners_image, ChessConfig, ChessError, CornerDescriptor, ThresholdMode};
use floorplane_chessboard::{ChessboardDetector, ChessboardParams};
use floorplane_core::{Corner, GrayImageView, GridSize};
use log::{debug, warn};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced when adapting raw buffers to `image` types.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },
}

/// Reasonable default settings for the `chess-corners` ChESS detector.
///
/// Tuned for evenly lit boards that fill a good part of the frame; expect to
/// override it for difficult real-world images.
pub fn default_chess_config() -> ChessConfig {
    let mut cfg = ChessConfig::single_scale();
    cfg.threshold_mode = ThresholdMode::Relative;
    cfg.threshold_value = 0.2;
    cfg.nms_radius = 2;
    cfg
}

/// Convert an `image::GrayImage` into the lightweight core view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Build an `image::GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

/// Detect raw ChESS corners using `chess-corners`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, cfg), fields(width = img.width(), height = img.height()))
)]
pub fn detect_chess_corners_raw(
    img: &::image::GrayImage,
    cfg: &ChessConfig,
) -> Result<Vec<CornerDescriptor>, ChessError> {
    find_chess_corners_image(img, cfg)
}

/// Convert a ChESS descriptor into the detector-agnostic [`Corner`].
pub fn adapt_chess_corner(c: &CornerDescriptor) -> Corner {
    Corner {
        position: Point2::new(c.x, c.y),
        axes: [c.axes[0].angle, c.axes[1].angle],
        strength: c.response,
    }
}

/// Detect ChESS corners and adapt them into [`Corner`]s.
pub fn detect_corners(img: &::image::GrayImage, cfg: &ChessConfig) -> Result<Vec<Corner>, ChessError> {
    Ok(detect_chess_corners_raw(img, cfg)?
        .iter()
        .map(adapt_chess_corner)
        .collect())
}

/// [`PatternDetector`] backed by ChESS corners and the grid-graph
/// chessboard detector.
///
/// Reports the pattern only when a complete `rows x cols` board is linked;
/// corners come back in the board detector's scan order.
#[derive(Clone, Debug)]
pub struct ChessPatternDetector {
    cfg: ChessConfig,
    params: ChessboardParams,
}

impl ChessPatternDetector {
    pub fn new(cfg: ChessConfig, params: ChessboardParams) -> Self {
        Self { cfg, params }
    }

    pub fn config(&self) -> &ChessConfig {
        &self.cfg
    }

    pub fn params(&self) -> &ChessboardParams {
        &self.params
    }
}

impl Default for ChessPatternDetector {
    fn default() -> Self {
        Self::new(default_chess_config(), ChessboardParams::default())
    }
}

impl PatternDetector for ChessPatternDetector {
    fn detect(&self, image: &GrayImageView<'_>, size: GridSize) -> Option<Vec<Point2<f32>>> {
        let width = u32::try_from(image.width).ok()?;
        let height = u32::try_from(image.height).ok()?;
        let img = gray_image_from_slice(width, height, image.data).ok()?;
        let corners = match detect_corners(&img, &self.cfg) {
            Ok(corners) => corners,
            Err(e) => {
                warn!("ChESS detection failed: {e}");
                return None;
            }
        };
        debug!("ChESS found {} corners", corners.len());
        ChessboardDetector::new(self.params.clone()).detect_from_corners(&corners, size)
    }
}
