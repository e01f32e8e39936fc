use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector3;

use crate::estimation::Axes;
use crate::math::{safe_normalize, EPSILON};

// ---------------------------------------------------------------------------
// Guidance: lean-angle curves and pitch/roll to thrust direction
// ---------------------------------------------------------------------------

/// Arctangent soft saturation: the lean angle (deg) commanded for a drift
/// `speed` (m/s). Bounded by `max_angle`; larger `responsiveness` flattens
/// the curve so the lean falls off earlier.
pub fn soft_lean(speed: f64, responsiveness: f64, max_angle: f64) -> f64 {
    if !speed.is_finite() {
        return 0.0;
    }
    (speed / responsiveness).atan() / FRAC_PI_2 * max_angle
}

/// Thrust-axis direction (world) of a craft holding `pitch`/`roll` degrees
/// relative to the horizon while keeping its current heading.
///
/// `axes` are the control axes (thrust along `up`), `up_g` the unit vector
/// opposing gravity. With the craft's own pitch and roll this returns its
/// own `up` axis; with 0/0 it returns `up_g`.
pub fn pitch_roll_direction(
    axes: &Axes,
    up_g: &Vector3<f64>,
    pitch: f64,
    roll: f64,
) -> Vector3<f64> {
    let (h_forward, h_right) = axes.horizontal(up_g);
    let (sp, cp) = pitch.to_radians().sin_cos();
    let sr = roll.to_radians().sin();

    let forward = h_forward * cp + up_g * sp;
    // Right axis must stay orthogonal to the pitched forward axis.
    let a = if cp.abs() > EPSILON { -sp / cp * sr } else { 0.0 };
    let b = (1.0 - a * a - sr * sr).max(0.0).sqrt();
    let right = h_forward * a + h_right * b + up_g * sr;

    safe_normalize(&right.cross(&forward)).unwrap_or(*up_g)
}
