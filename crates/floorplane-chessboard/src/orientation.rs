//! Scan-order classification of raw pattern corners.
//!
//! Corner detectors emit the inner corners of a board as a flat list whose
//! layout depends on how the board appeared in the frame: row by row or
//! column by column, starting from any corner. For a board photographed
//! roughly upright, the first full row (or column) of that list walks
//! monotonically along one image axis, which is enough to tell the layouts
//! apart.

use crate::OrderingError;
use floorplane_core::GridSize;
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// How a flat corner list maps onto the physical grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Orientation {
    /// The list is row-major (`true`) or column-major (`false`).
    pub by_row: bool,
    /// The run axis is swapped relative to the image axes.
    pub transposed: bool,
}

/// Image axis a monotonicity test looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn coord(self, p: &Point2<f32>) -> f32 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// Which grid dimension sets the length of the tested run.
#[derive(Clone, Copy, Debug)]
enum Run {
    Cols,
    Rows,
}

struct Hypothesis {
    run: Run,
    axis: Axis,
    orientation: Orientation,
}

/// Evaluated in order; the first hypothesis that holds wins.
const HYPOTHESES: [Hypothesis; 4] = [
    Hypothesis {
        run: Run::Cols,
        axis: Axis::X,
        orientation: Orientation {
            by_row: true,
            transposed: false,
        },
    },
    Hypothesis {
        run: Run::Rows,
        axis: Axis::Y,
        orientation: Orientation {
            by_row: false,
            transposed: false,
        },
    },
    Hypothesis {
        run: Run::Cols,
        axis: Axis::Y,
        orientation: Orientation {
            by_row: true,
            transposed: true,
        },
    },
    Hypothesis {
        run: Run::Rows,
        axis: Axis::X,
        orientation: Orientation {
            by_row: false,
            transposed: true,
        },
    },
];

/// `true` if the first `n` points strictly increase or strictly decrease
/// along `axis`.
///
/// A pair with equal coordinates advances neither direction, so any tie
/// inside the run breaks it. Requires `2 <= n < points.len()`.
pub fn is_monotonic_run(points: &[Point2<f32>], n: usize, axis: Axis) -> bool {
    if n < 2 || n >= points.len() {
        return false;
    }
    let mut increasing = 1;
    let mut decreasing = 1;
    for pair in points[..n].windows(2) {
        let prev = axis.coord(&pair[0]);
        let cur = axis.coord(&pair[1]);
        if cur > prev {
            increasing += 1;
        } else if cur < prev {
            decreasing += 1;
        }
    }
    increasing == n || decreasing == n
}

/// Classify the scan order of `points` for a pattern of `size`.
///
/// Transposed layouts are reported, not rejected; rejecting them is up to
/// the consumer (see [`crate::organize_grid`]).
pub fn detect_orientation(
    points: &[Point2<f32>],
    size: GridSize,
) -> Result<Orientation, OrderingError> {
    if points.len() != size.len() {
        return Err(OrderingError::PointCountMismatch {
            expected: size.len(),
            got: points.len(),
        });
    }

    let found = HYPOTHESES.iter().find(|hyp| {
        let n = match hyp.run {
            Run::Cols => size.cols(),
            Run::Rows => size.rows(),
        };
        is_monotonic_run(points, n, hyp.axis)
    });

    match found {
        Some(hyp) => {
            debug!(
                "corner scan order: by_row={} transposed={} ({:?}-monotonic run)",
                hyp.orientation.by_row, hyp.orientation.transposed, hyp.axis
            );
            Ok(hyp.orientation)
        }
        None => Err(OrderingError::AmbiguousOrientation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{scan, Scan};

    fn size(rows: usize, cols: usize) -> GridSize {
        GridSize::new(rows, cols).unwrap()
    }

    #[test]
    fn monotonic_run_counts_strict_steps() {
        let pts: Vec<_> = [0.0, 1.0, 2.0, 1.5, 7.0]
            .iter()
            .map(|&x| Point2::new(x, 0.0))
            .collect();
        assert!(is_monotonic_run(&pts, 3, Axis::X));
        assert!(!is_monotonic_run(&pts, 4, Axis::X));
        // The y coordinates are all equal: ties break the run.
        assert!(!is_monotonic_run(&pts, 3, Axis::Y));
        // The run must leave at least one point after it.
        assert!(!is_monotonic_run(&pts, 5, Axis::X));
    }

    #[test]
    fn decreasing_runs_are_monotonic() {
        let pts: Vec<_> = (0..4).map(|k| Point2::new(0.0, 10.0 - k as f32)).collect();
        assert!(is_monotonic_run(&pts, 3, Axis::Y));
    }

    #[test]
    fn row_major_board_is_by_row() {
        let pts = scan(size(4, 5), Scan::RowMajor, false);
        let o = detect_orientation(&pts, size(4, 5)).expect("orientation");
        assert_eq!(
            o,
            Orientation {
                by_row: true,
                transposed: false
            }
        );
    }

    #[test]
    fn every_supported_scan_is_classified() {
        for rows in 2..7 {
            for cols in 2..7 {
                let s = size(rows, cols);
                for reversed in [false, true] {
                    let by_row = detect_orientation(&scan(s, Scan::RowMajor, reversed), s);
                    assert_eq!(
                        by_row.map(|o| (o.by_row, o.transposed)),
                        Ok((true, false)),
                        "{rows}x{cols} row-major reversed={reversed}"
                    );
                    let by_col = detect_orientation(&scan(s, Scan::ColMajor, reversed), s);
                    assert_eq!(
                        by_col.map(|o| (o.by_row, o.transposed)),
                        Ok((false, false)),
                        "{rows}x{cols} col-major reversed={reversed}"
                    );
                }
            }
        }
    }

    #[test]
    fn column_scan_wins_when_the_row_run_has_ties() {
        // The first three x values tie, the first two y values increase.
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 20.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 20.0),
        ];
        assert_eq!(
            detect_orientation(&pts, size(2, 3)),
            Ok(Orientation {
                by_row: false,
                transposed: false
            })
        );
    }

    #[test]
    fn row_run_along_y_is_transposed() {
        // rows=3, cols=2: x ties over 2, y zig-zags over 3, y rises over 2.
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 15.0),
            Point2::new(9.0, 8.0),
            Point2::new(9.0, 18.0),
        ];
        assert_eq!(
            detect_orientation(&pts, size(3, 2)),
            Ok(Orientation {
                by_row: true,
                transposed: true
            })
        );
    }

    #[test]
    fn column_run_along_x_is_transposed() {
        // rows=2, cols=3: x zig-zags over 3, y ties over 2 and 3, x rises over 2.
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 7.0),
            Point2::new(15.0, 7.0),
            Point2::new(8.0, 14.0),
            Point2::new(18.0, 14.0),
        ];
        assert_eq!(
            detect_orientation(&pts, size(2, 3)),
            Ok(Orientation {
                by_row: false,
                transposed: true
            })
        );
    }

    #[test]
    fn flat_sequences_are_ambiguous() {
        let pts = vec![Point2::new(1.0, 1.0); 6];
        assert_eq!(
            detect_orientation(&pts, size(2, 3)),
            Err(OrderingError::AmbiguousOrientation)
        );
    }

    #[test]
    fn wrong_point_count_is_rejected() {
        let pts = vec![Point2::new(1.0, 1.0); 5];
        assert_eq!(
            detect_orientation(&pts, size(2, 3)),
            Err(OrderingError::PointCountMismatch {
                expected: 6,
                got: 5
            })
        );
    }
}
