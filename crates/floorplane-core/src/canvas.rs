//! Homographies whose output stays on a non-negative pixel canvas.
//!
//! A transform fit only from pattern correspondences can send parts of the
//! source image to negative destination coordinates, which an image buffer
//! cannot address. The builder fits once, measures where the whole source
//! canvas lands, and refits against targets translated by the integer shift
//! that moves that footprint into the positive quadrant.

use crate::{fit_homography_ransac, CanvasSize, Homography, HomographyError, Quad, RansacParams};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Result of [`build_canvas_safe_homography`].
///
/// `shift` is part of the transform's contract: `h` already includes it, and
/// any coordinate computed in the unshifted target frame must be moved by
/// `shift` before it can be compared with `h`'s output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSafeHomography {
    pub h: Homography,
    /// Integer translation `(dx, dy)` applied in destination space.
    pub shift: [i32; 2],
    /// Source canvas corners mapped through `h` (shift included).
    pub transformed_bounds: Quad,
}

impl CanvasSafeHomography {
    /// Move a quad from the unshifted target frame into `h`'s output frame.
    pub fn shift_quad(&self, q: &Quad) -> Quad {
        q.translated(self.shift[0] as f32, self.shift[1] as f32)
    }
}

fn canvas_shift(bounds: &Quad) -> [i32; 2] {
    let e = bounds.extent();
    // Truncation keeps the original integer-offset semantics: sub-pixel
    // negative coordinates above -1 are tolerated.
    [(-e.min_x).max(0.0) as i32, (-e.min_y).max(0.0) as i32]
}

/// Fit `to ~ H * from` such that the whole `from_canvas` maps to `x, y >= 0`.
///
/// Two sequential robust fits: a preliminary one to measure the footprint of
/// the source canvas, and a final one against the shifted targets.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(from, to, params), fields(w = from_canvas.width, h = from_canvas.height))
)]
pub fn build_canvas_safe_homography(
    from: &Quad,
    to: &Quad,
    from_canvas: CanvasSize,
    params: &RansacParams,
) -> Result<CanvasSafeHomography, HomographyError> {
    let preliminary = fit_homography_ransac(&from.corners, &to.corners, params)?.homography;

    let canvas = Quad::from_canvas(from_canvas);
    let bounds = Quad::new(canvas.corners.map(|p| preliminary.apply(p)));
    let shift = canvas_shift(&bounds);
    let (dx, dy) = (shift[0] as f32, shift[1] as f32);

    let shifted_to = to.translated(dx, dy);
    let transformed_bounds = bounds.translated(dx, dy);

    let h = fit_homography_ransac(&from.corners, &shifted_to.corners, params)?.homography;

    debug!(
        "canvas-safe homography: shift=({}, {}), output extent {:.1}x{:.1}",
        shift[0],
        shift[1],
        transformed_bounds.extent().width,
        transformed_bounds.extent().height
    );

    Ok(CanvasSafeHomography {
        h,
        shift,
        transformed_bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point2;

    fn quad(pts: [(f32, f32); 4]) -> Quad {
        Quad::new(pts.map(|(x, y)| Point2::new(x, y)))
    }

    fn assert_non_negative(q: &Quad) {
        for p in q.corners {
            assert!(p.x > -1.0 && p.y > -1.0, "corner {p:?} left the canvas");
        }
    }

    #[test]
    fn pulls_negative_footprint_back_onto_canvas() {
        // Pattern near the top-left; the target rectangle sits so close to the
        // origin that the rest of the image lands at negative coordinates.
        let from = quad([(40.0, 200.0), (260.0, 210.0), (240.0, 60.0), (60.0, 50.0)]);
        let to = quad([(5.0, 150.0), (225.0, 150.0), (225.0, 5.0), (5.0, 5.0)]);
        let canvas = CanvasSize::new(640, 480);

        let safe = build_canvas_safe_homography(&from, &to, canvas, &RansacParams::default())
            .expect("fit");
        assert!(safe.shift[0] > 0 || safe.shift[1] > 0);
        assert_non_negative(&safe.transformed_bounds);

        let mapped = Quad::from_canvas(canvas).corners.map(|p| safe.h.apply(p));
        assert_non_negative(&Quad::new(mapped));

        let shifted_to = safe.shift_quad(&to);
        for (p, q) in from.corners.iter().zip(shifted_to.corners) {
            let m = safe.h.apply(*p);
            assert_abs_diff_eq!(m.x, q.x, epsilon = 1e-2);
            assert_abs_diff_eq!(m.y, q.y, epsilon = 1e-2);
        }
    }

    #[test]
    fn positive_footprint_needs_no_shift() {
        let from = quad([(0.0, 100.0), (100.0, 100.0), (100.0, 0.0), (0.0, 0.0)]);
        let to = from.translated(50.0, 30.0);
        let safe = build_canvas_safe_homography(
            &from,
            &to,
            CanvasSize::new(100, 100),
            &RansacParams::default(),
        )
        .expect("fit");
        assert_eq!(safe.shift, [0, 0]);
        assert_abs_diff_eq!(safe.transformed_bounds.extent().min_x, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn rerun_on_rectified_output_is_identity() {
        let from = quad([(30.0, 220.0), (300.0, 240.0), (280.0, 40.0), (50.0, 60.0)]);
        let to = quad([(30.0, 220.0), (300.0, 220.0), (300.0, 20.0), (30.0, 20.0)]);
        let first = build_canvas_safe_homography(
            &from,
            &to,
            CanvasSize::new(400, 300),
            &RansacParams::default(),
        )
        .expect("first pass");

        let projected = first.shift_quad(&to);
        let out_canvas = first.transformed_bounds.extent().canvas_size();
        let second = build_canvas_safe_homography(
            &projected,
            &projected,
            out_canvas,
            &RansacParams::default(),
        )
        .expect("second pass");

        assert_eq!(second.shift, [0, 0]);
        assert!(second.h.max_abs_diff(&Homography::identity()) < 1e-4);
    }

    #[test]
    fn degenerate_targets_fail() {
        let from = quad([(0.0, 100.0), (100.0, 100.0), (100.0, 0.0), (0.0, 0.0)]);
        let to = quad([(0.0, 0.0), (10.0, 10.0), (20.0, 20.0), (10.0, 10.0)]);
        assert!(matches!(
            build_canvas_safe_homography(&from, &to, CanvasSize::new(100, 100), &RansacParams::default()),
            Err(HomographyError::DegenerateCorrespondence { .. })
        ));
    }
}
