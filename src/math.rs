//! Vector helpers shared by the estimator, controller and formatter.
//!
//! Every helper here is total: zero-length and non-finite inputs map to
//! `None` or to a documented fallback instead of producing NaN.

use nalgebra::Vector3;

/// Lengths below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// Unit vector in the direction of `v`, or `None` when `v` is degenerate.
pub fn safe_normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    if !is_finite(v) {
        return None;
    }
    let n = v.norm();
    if n > EPSILON {
        Some(v / n)
    } else {
        None
    }
}

pub fn is_finite(v: &Vector3<f64>) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// `acos` of a dot product between unit vectors, in degrees.
///
/// Products that drift past +/-1 through rounding are pinned to 0 or 180
/// according to their sign; a non-finite product yields `fallback`.
pub fn acos_deg(dot: f64, fallback: f64) -> f64 {
    if !dot.is_finite() {
        return fallback;
    }
    dot.clamp(-1.0, 1.0).acos() * RAD_TO_DEG
}

/// `asin` of a dot product between unit vectors, in degrees.
pub fn asin_deg(dot: f64) -> f64 {
    if !dot.is_finite() {
        return 0.0;
    }
    dot.clamp(-1.0, 1.0).asin() * RAD_TO_DEG
}

/// Angle between two directions in radians, `[0, pi]`. Degenerate input gives 0.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    match (safe_normalize(a), safe_normalize(b)) {
        (Some(a), Some(b)) => a.dot(&b).clamp(-1.0, 1.0).acos(),
        _ => 0.0,
    }
}

/// Some unit vector orthogonal to `v` (which must be unit length).
pub fn any_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    safe_normalize(&v.cross(&Vector3::x()))
        .or_else(|| safe_normalize(&v.cross(&Vector3::y())))
        .unwrap_or_else(Vector3::z)
}

/// Strict open-interval comparison `target - margin < value < target + margin`.
pub fn equal_with_margin(value: f64, target: f64, margin: f64) -> bool {
    value > target - margin && value < target + margin
}

/// Push a non-zero rate whose magnitude is under `floor` up to `floor`,
/// keeping its sign. Zero stays zero.
pub fn clamp_min_rate(rate: f64, floor: f64) -> f64 {
    if rate == 0.0 || !rate.is_finite() {
        0.0
    } else if rate.abs() < floor {
        floor.copysign(rate)
    } else {
        rate
    }
}
