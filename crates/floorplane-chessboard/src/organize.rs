//! Rebuild the physical row/column layout from a flat corner list.

use crate::orientation::detect_orientation;
use crate::OrderingError;
use floorplane_core::{GridSize, PointGrid};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Half-open integer range walked with a fixed `step` of `+1` or `-1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: isize,
    pub step: isize,
    pub stop: isize,
}

impl SweepRange {
    /// `0, 1, .., len - 1`.
    pub fn forward(len: usize) -> Self {
        Self {
            start: 0,
            step: 1,
            stop: len as isize,
        }
    }

    /// `len - 1, .., 1, 0`.
    pub fn backward(len: usize) -> Self {
        Self {
            start: len as isize - 1,
            step: -1,
            stop: -1,
        }
    }

    /// Forward when `ascending`, backward otherwise.
    pub fn along(len: usize, ascending: bool) -> Self {
        if ascending {
            Self::forward(len)
        } else {
            Self::backward(len)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let step = self.step;
        let stop = self.stop;
        std::iter::successors(Some(self.start), move |&i| Some(i + step))
            .take_while(move |&i| if step > 0 { i < stop } else { i > stop })
            .map(|i| i as usize)
    }
}

/// Sweeps chosen for a given corner list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanPlan {
    pub by_row: bool,
    pub rows: SweepRange,
    pub cols: SweepRange,
}

/// Pick the row and column sweeps from the first point and its two
/// neighbours in the list.
///
/// By row the column neighbour is `p[1]` and the row neighbour `p[cols]`;
/// by column they are `p[rows]` and `p[1]`.
pub fn scan_plan(
    points: &[Point2<f32>],
    size: GridSize,
    by_row: bool,
) -> Result<ScanPlan, OrderingError> {
    if points.len() != size.len() {
        return Err(OrderingError::PointCountMismatch {
            expected: size.len(),
            got: points.len(),
        });
    }
    let (col_next, row_next) = if by_row {
        (1, size.cols())
    } else {
        (size.rows(), 1)
    };
    let a = points[0];
    let b = points[col_next];
    let c = points[row_next];
    Ok(ScanPlan {
        by_row,
        rows: SweepRange::along(size.rows(), a.y < c.y),
        cols: SweepRange::along(size.cols(), a.x < b.x),
    })
}

/// Reorder `points` so that row index grows with image y and column index
/// grows with image x.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points), fields(points = points.len(), rows = size.rows(), cols = size.cols()))
)]
pub fn organize_grid(points: &[Point2<f32>], size: GridSize) -> Result<PointGrid, OrderingError> {
    let orientation = detect_orientation(points, size)?;
    if orientation.transposed {
        return Err(OrderingError::UnsupportedOrientation(orientation));
    }

    let plan = scan_plan(points, size, orientation.by_row)?;
    debug!(
        "grid sweep: by_row={} rows={:?} cols={:?}",
        plan.by_row, plan.rows, plan.cols
    );

    let mut ordered = Vec::with_capacity(size.len());
    for rr in plan.rows.iter() {
        for cc in plan.cols.iter() {
            let idx = if plan.by_row {
                rr * size.cols() + cc
            } else {
                cc * size.rows() + rr
            };
            ordered.push(points[idx]);
        }
    }

    PointGrid::from_row_major(size, ordered).ok_or(OrderingError::PointCountMismatch {
        expected: size.len(),
        got: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{board, scan, scan_from, Scan};

    fn size(rows: usize, cols: usize) -> GridSize {
        GridSize::new(rows, cols).unwrap()
    }

    #[test]
    fn sweeps_cover_every_index_once() {
        assert_eq!(SweepRange::forward(4).iter().collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(SweepRange::backward(4).iter().collect::<Vec<_>>(), [3, 2, 1, 0]);
        assert_eq!(
            SweepRange::backward(3),
            SweepRange {
                start: 2,
                step: -1,
                stop: -1
            }
        );
    }

    #[test]
    fn scan_plan_follows_the_anchor_points() {
        let s = size(3, 4);
        let plan = scan_plan(&scan_from(s, Scan::RowMajor, true, false), s, true).unwrap();
        assert_eq!(plan.cols, SweepRange::backward(4));
        assert_eq!(plan.rows, SweepRange::forward(3));

        let plan = scan_plan(&scan_from(s, Scan::ColMajor, false, true), s, false).unwrap();
        assert_eq!(plan.cols, SweepRange::forward(4));
        assert_eq!(plan.rows, SweepRange::backward(3));
    }

    #[test]
    fn scan_plan_needs_the_whole_board() {
        let s = size(3, 4);
        let pts = scan(s, Scan::RowMajor, false);
        for by_row in [true, false] {
            assert_eq!(
                scan_plan(&pts[..2], s, by_row).unwrap_err(),
                OrderingError::PointCountMismatch {
                    expected: 12,
                    got: 2
                }
            );
        }
        assert!(scan_plan(&[], s, true).is_err());
    }

    #[test]
    fn all_scan_orders_rebuild_the_physical_grid() {
        for rows in 2..7 {
            for cols in 2..7 {
                let s = size(rows, cols);
                let expected = board(s);
                for order in [Scan::RowMajor, Scan::ColMajor] {
                    for flip_x in [false, true] {
                        for flip_y in [false, true] {
                            let pts = scan_from(s, order, flip_x, flip_y);
                            let grid = organize_grid(&pts, s).unwrap_or_else(|e| {
                                panic!("{rows}x{cols} {order:?} flip_x={flip_x} flip_y={flip_y}: {e}")
                            });
                            assert_eq!(grid.as_slice(), expected.as_slice());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn reversed_row_scan_of_4x5_board() {
        let s = size(4, 5);
        let pts = scan(s, Scan::RowMajor, true);
        let grid = organize_grid(&pts, s).expect("grid");
        assert_eq!(grid.get(0, 0), pts[pts.len() - 1]);
        assert_eq!(grid.get(3, 4), pts[0]);
        for r in 0..3 {
            assert!(grid.get(r, 0).y < grid.get(r + 1, 0).y);
        }
        for c in 0..4 {
            assert!(grid.get(0, c).x < grid.get(0, c + 1).x);
        }
    }

    #[test]
    fn transposed_input_is_rejected() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 15.0),
            Point2::new(9.0, 8.0),
            Point2::new(9.0, 18.0),
        ];
        let err = organize_grid(&pts, size(3, 2)).unwrap_err();
        assert!(matches!(
            err,
            OrderingError::UnsupportedOrientation(o) if o.transposed && o.by_row
        ));
    }

    #[test]
    fn short_input_is_rejected() {
        let pts = scan(size(3, 3), Scan::RowMajor, false);
        assert_eq!(
            organize_grid(&pts[..8], size(3, 3)).unwrap_err(),
            OrderingError::PointCountMismatch {
                expected: 9,
                got: 8
            }
        );
    }
}
