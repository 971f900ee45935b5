use floorplane_core::Corner;
use nalgebra::Vector2;
use std::f32::consts::PI;

/// Angle between an undirected axis `axis_angle` (defined modulo π) and a
/// directed vector angle `vec_angle`. Returns a value in `[0, π/2]`.
pub fn axis_vec_diff(axis_angle: f32, vec_angle: f32) -> f32 {
    let two_pi = 2.0 * PI;

    // Difference in [-π, π).
    let mut diff = (vec_angle - axis_angle).rem_euclid(two_pi);
    if diff >= PI {
        diff -= two_pi;
    }
    let diff_abs = diff.abs();

    diff_abs.min(PI - diff_abs)
}

/// How far `vec_angle` is from the closer of the two grid axes at `corner`.
pub fn axis_misalignment(corner: &Corner, vec_angle: f32) -> f32 {
    corner
        .axes
        .iter()
        .map(|&axis| axis_vec_diff(axis, vec_angle))
        .fold(f32::INFINITY, f32::min)
}

/// Dominant grid direction of a corner cloud, radians in `(-π/4, π/4]`.
///
/// Both axes of every corner vote. Grid axes repeat every quarter turn, so
/// votes are averaged in quadruple-angle space and weighted by strength.
pub fn dominant_grid_axis(corners: &[Corner]) -> Option<f32> {
    let mut sum = Vector2::<f32>::zeros();
    let mut weight_sum = 0.0f32;

    for c in corners {
        let w = c.strength.max(0.0);
        if w <= 0.0 {
            continue;
        }
        for axis in c.axes {
            let four_theta = 4.0 * axis;
            sum += w * Vector2::new(four_theta.cos(), four_theta.sin());
            weight_sum += w;
        }
    }

    if weight_sum <= 0.0 {
        return None;
    }
    let mean = sum / weight_sum;
    if mean.norm_squared() < 1e-6 {
        return None;
    }
    Some(0.25 * mean.y.atan2(mean.x))
}
