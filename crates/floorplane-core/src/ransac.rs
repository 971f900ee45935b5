//! RANSAC wrapper around the 4-point homography solver.
//!
//! Minimal samples whose points are collinear in either plane are skipped,
//! so a correspondence set without four independent pairs never yields a
//! model and surfaces as [`HomographyError::DegenerateCorrespondence`].

use crate::homography::{estimate_homography, homography_from_4pt, is_degenerate_quad};
use crate::{Homography, HomographyError};
use log::debug;
use nalgebra::Point2;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

const MIN_SAMPLES: usize = 4;

/// RANSAC settings for robust homography fitting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Inlier threshold on the reprojection error, in destination pixels.
    pub reprojection_threshold_px: f64,
    /// Upper bound on sampled hypotheses.
    pub max_iters: usize,
    /// Desired probability of drawing at least one all-inlier sample.
    pub confidence: f64,
    /// RNG seed, fixed so repeated runs agree.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            reprojection_threshold_px: 3.0,
            max_iters: 2000,
            confidence: 0.995,
            seed: 0x5eed,
        }
    }
}

/// Output of [`fit_homography_ransac`].
#[derive(Clone, Debug)]
pub struct RobustHomography {
    pub homography: Homography,
    /// Indices of the correspondences consistent with `homography`.
    pub inliers: Vec<usize>,
    /// Number of hypotheses evaluated.
    pub iters: usize,
}

fn reprojection_error(h: &Homography, src: Point2<f32>, dst: Point2<f32>) -> f64 {
    let p = h.apply(src);
    let dx = (p.x - dst.x) as f64;
    let dy = (p.y - dst.y) as f64;
    let err = (dx * dx + dy * dy).sqrt();
    if err.is_finite() {
        err
    } else {
        f64::INFINITY
    }
}

fn collect_inliers(
    h: &Homography,
    from: &[Point2<f32>],
    to: &[Point2<f32>],
    thresh: f64,
) -> Vec<usize> {
    from.iter()
        .zip(to)
        .enumerate()
        .filter(|(_, (&s, &d))| reprojection_error(h, s, d) <= thresh)
        .map(|(k, _)| k)
        .collect()
}

/// Adaptive iteration bound for the current inlier ratio.
fn required_iterations(confidence: f64, inlier_ratio: f64, max_iters: usize) -> usize {
    if confidence <= 0.0 || inlier_ratio <= 0.0 {
        return max_iters;
    }
    let denom = (1.0 - inlier_ratio.powi(MIN_SAMPLES as i32)).max(1e-12).ln();
    if denom >= 0.0 {
        return max_iters;
    }
    let n = ((1.0 - confidence).ln() / denom).ceil();
    if n.is_finite() {
        (n as usize).min(max_iters)
    } else {
        max_iters
    }
}

fn fit_sample(from: &[Point2<f32>], to: &[Point2<f32>], idx: &[usize]) -> Option<Homography> {
    let s = [from[idx[0]], from[idx[1]], from[idx[2]], from[idx[3]]];
    let d = [to[idx[0]], to[idx[1]], to[idx[2]], to[idx[3]]];
    if is_degenerate_quad(&s) || is_degenerate_quad(&d) {
        return None;
    }
    homography_from_4pt(&s, &d)
}

/// Fit `to ~ H * from` while tolerating a fraction of mismatched pairs.
///
/// With exactly four pairs the single possible sample is solved directly.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(from, to, params), fields(pairs = from.len()))
)]
pub fn fit_homography_ransac(
    from: &[Point2<f32>],
    to: &[Point2<f32>],
    params: &RansacParams,
) -> Result<RobustHomography, HomographyError> {
    if from.len() != to.len() {
        return Err(HomographyError::MismatchedLengths {
            from: from.len(),
            to: to.len(),
        });
    }
    let n = from.len();
    let degenerate = HomographyError::DegenerateCorrespondence { pairs: n };
    if n < MIN_SAMPLES {
        return Err(degenerate);
    }

    if n == MIN_SAMPLES {
        let homography = fit_sample(from, to, &[0, 1, 2, 3]).ok_or(degenerate)?;
        let inliers = collect_inliers(&homography, from, to, params.reprojection_threshold_px);
        return Ok(RobustHomography {
            homography,
            inliers,
            iters: 1,
        });
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<(Homography, Vec<usize>)> = None;
    let mut budget = params.max_iters.max(1);
    let mut iters = 0;

    while iters < budget {
        iters += 1;
        let sample = rand::seq::index::sample(&mut rng, n, MIN_SAMPLES).into_vec();
        let Some(h) = fit_sample(from, to, &sample) else {
            continue;
        };

        let inliers = collect_inliers(&h, from, to, params.reprojection_threshold_px);
        if inliers.len() < MIN_SAMPLES {
            continue;
        }
        let improves = best
            .as_ref()
            .is_none_or(|(_, best_inliers)| inliers.len() > best_inliers.len());
        if improves {
            let ratio = inliers.len() as f64 / n as f64;
            budget = required_iterations(params.confidence, ratio, params.max_iters).max(iters);
            best = Some((h, inliers));
        }
    }

    let (h, inliers) = best.ok_or(degenerate)?;

    // Least-squares refit over the consensus set.
    let inlier_from: Vec<_> = inliers.iter().map(|&k| from[k]).collect();
    let inlier_to: Vec<_> = inliers.iter().map(|&k| to[k]).collect();
    let homography = estimate_homography(&inlier_from, &inlier_to).unwrap_or(h);
    let inliers = collect_inliers(&homography, from, to, params.reprojection_threshold_px);

    debug!(
        "ransac homography: {} / {} inliers after {} iterations",
        inliers.len(),
        n,
        iters
    );

    Ok(RobustHomography {
        homography,
        inliers,
        iters,
    })
}
