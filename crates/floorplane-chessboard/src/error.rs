use crate::Orientation;

/// Errors returned while ordering raw chessboard corners.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("expected {expected} corners for the pattern, got {got}")]
    PointCountMismatch { expected: usize, got: usize },
    #[error("no scan-order hypothesis matched the corner sequence")]
    AmbiguousOrientation,
    #[error("transposed corner order is not supported ({0:?})")]
    UnsupportedOrientation(Orientation),
}
