use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("grid must have at least 2 rows and 2 columns (got {rows}x{cols})")]
pub struct GridSizeError {
    pub rows: usize,
    pub cols: usize,
}

/// Inner-corner dimensions of a calibration pattern.
///
/// Always at least 2x2: construction and deserialization both go through
/// [`GridSize::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGridSize", into = "RawGridSize")]
pub struct GridSize {
    rows: usize,
    cols: usize,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawGridSize {
    rows: usize,
    cols: usize,
}

impl TryFrom<RawGridSize> for GridSize {
    type Error = GridSizeError;

    fn try_from(raw: RawGridSize) -> Result<Self, Self::Error> {
        GridSize::new(raw.rows, raw.cols)
    }
}

impl From<GridSize> for RawGridSize {
    fn from(size: GridSize) -> Self {
        Self {
            rows: size.rows,
            cols: size.cols,
        }
    }
}

impl GridSize {
    /// Validated constructor: both dimensions must be at least 2, otherwise
    /// there is no full row/column to test for monotonicity.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridSizeError> {
        if rows < 2 || cols < 2 {
            return Err(GridSizeError { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of inner corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Points arranged in physical row/column order.
///
/// Storage is row-major. Row index grows downward and column index grows
/// rightward in image space once the grid has been organized.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointGrid {
    size: GridSize,
    points: Vec<Point2<f32>>,
}

impl PointGrid {
    /// Wrap a row-major point list. Returns `None` on a length mismatch.
    pub fn from_row_major(size: GridSize, points: Vec<Point2<f32>>) -> Option<Self> {
        (points.len() == size.len()).then_some(Self { size, points })
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.size.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.size.cols
    }

    /// Point at `(row, col)`; panics when out of range, like slice indexing.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Point2<f32> {
        assert!(row < self.size.rows && col < self.size.cols);
        self.points[row * self.size.cols + col]
    }

    pub fn row(&self, row: usize) -> &[Point2<f32>] {
        let start = row * self.size.cols;
        &self.points[start..start + self.size.cols]
    }

    /// Flat row-major view of the grid.
    pub fn as_slice(&self) -> &[Point2<f32>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2<f32>> {
        self.points
    }
}
