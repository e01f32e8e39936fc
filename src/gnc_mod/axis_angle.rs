use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::math::{any_perpendicular, safe_normalize};

// ---------------------------------------------------------------------------
// Axis-angle tracking law
// ---------------------------------------------------------------------------

/// Angle used to scale the turn from unit `reference` to unit `target`.
///
/// `atan2(|r x t|, sqrt(1 - |r x t|^2))` for acute angles; any obtuse
/// separation is reported as `pi` so large turns run at full authority.
pub fn rotation_angle(reference: &Vector3<f64>, target: &Vector3<f64>) -> f64 {
    let s = reference.cross(target).norm().min(1.0);
    if reference.dot(target) < 0.0 {
        return PI;
    }
    s.atan2((1.0 - s * s).max(0.0).sqrt())
}

/// Angular velocity that turns `reference` toward `target`, both given in
/// the same (local) frame.
///
/// Magnitude is `max(floor, max_rate * angle / pi * velocity_scale)`;
/// already-aligned inputs produce exactly zero. Antiparallel inputs have no
/// defined axis, so an arbitrary perpendicular one is used instead of
/// stalling.
pub fn axis_angle_rate(
    reference: &Vector3<f64>,
    target: &Vector3<f64>,
    max_rate: f64,
    velocity_scale: f64,
    floor: f64,
) -> Vector3<f64> {
    let (Some(reference), Some(target)) = (safe_normalize(reference), safe_normalize(target))
    else {
        return Vector3::zeros();
    };

    let axis = match safe_normalize(&reference.cross(&target)) {
        Some(axis) => axis,
        None if reference.dot(&target) < 0.0 => any_perpendicular(&reference),
        None => return Vector3::zeros(),
    };

    let angle = rotation_angle(&reference, &target);
    if angle == 0.0 {
        return Vector3::zeros();
    }

    let magnitude = (max_rate * (angle / PI) * velocity_scale).max(floor);
    axis * magnitude
}
