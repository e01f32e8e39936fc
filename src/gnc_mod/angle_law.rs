use nalgebra::Vector3;

use crate::config::ThrustOrientation;
use crate::estimation::{AttitudeAngles, Axes, SpeedComponents};
use crate::math::clamp_min_rate;
use super::rate::RateLimits;

// ---------------------------------------------------------------------------
// Angle-difference law (independent pitch and roll channels)
// ---------------------------------------------------------------------------

/// Angle span (deg) over which the rate ramps from zero to the maximum.
pub const REFERENCE_RANGE: f64 = 90.0;

/// World angular velocity from per-channel proportional control on the
/// gravity-relative pitch and roll.
///
/// `pitch_rate = max_pitch * (target - current) / 90` about the control
/// right axis; the roll channel turns about the control forward axis so
/// that a larger target roll raises the right wing. Both channels are
/// inverted when the craft is upside down, saturated at the actuator
/// maximum and floored to `min_rate`.
pub fn angle_difference_rate(
    axes: &Axes,
    current: &AttitudeAngles,
    target_pitch: f64,
    target_roll: f64,
    upside_down: bool,
    limits: &RateLimits,
    min_rate: f64,
) -> Vector3<f64> {
    let sign = if upside_down { -1.0 } else { 1.0 };
    let pitch_rate = sign * limits.pitch * (target_pitch - current.pitch) / REFERENCE_RANGE;
    let roll_rate = -sign * limits.roll * (target_roll - current.roll) / REFERENCE_RANGE;

    let pitch_rate = saturate(pitch_rate, limits.pitch, min_rate);
    let roll_rate = saturate(roll_rate, limits.roll, min_rate);

    axes.right * pitch_rate + axes.forward * roll_rate
}

/// Heading-relative pitch and tilt (deg) at which the main thrust opposes
/// the direction of travel.
pub fn retrograde_targets(thrust: ThrustOrientation) -> (f64, f64) {
    match thrust {
        ThrustOrientation::Rear => (180.0, 90.0),
        ThrustOrientation::Bottom => (90.0, 90.0),
    }
}

/// Sensor-local angular velocity turning the main thrust against the
/// direction of travel, away from gravity.
///
/// `current` is the heading-relative attitude (pitch = angle between travel
/// and the sensor nose, roll = tilt against the right wing). `control_speed`
/// holds the velocity along the remapped space control axes. The pitch
/// channel follows the sign of the forward control speed, the roll channel
/// the sign of the speed along the thrust axis. Bottom thrust still moving
/// along its thrust axis turns at the complement of the proportional rate
/// so a near-180° turn starts at full speed. Yaw fades out and roll fades
/// in as pitch approaches 90°.
pub fn retrograde_angle_rate(
    current: &AttitudeAngles,
    control_speed: &SpeedComponents,
    thrust: ThrustOrientation,
    limits: &RateLimits,
    min_rate: f64,
) -> Vector3<f64> {
    let (target_pitch, target_tilt) = retrograde_targets(thrust);
    let mut pitch_rate = limits.pitch * (target_pitch - current.pitch) / REFERENCE_RANGE;
    let mut yaw_rate = limits.yaw * (target_tilt - current.roll) / REFERENCE_RANGE;
    let mut roll_rate = limits.roll * (target_tilt - current.roll) / REFERENCE_RANGE;

    let bottom = thrust == ThrustOrientation::Bottom;
    if bottom {
        pitch_rate = pitch_rate.abs();
    }
    pitch_rate *= sign(control_speed.forward);
    roll_rate *= sign(control_speed.up);

    if bottom && control_speed.up > 0.0 {
        pitch_rate = limits.pitch - pitch_rate;
        yaw_rate = limits.yaw - yaw_rate;
        roll_rate = limits.roll - roll_rate;
    }

    yaw_rate *= 1.0 - current.pitch / REFERENCE_RANGE;
    roll_rate *= current.pitch / REFERENCE_RANGE;

    Vector3::new(
        saturate(pitch_rate, limits.pitch, min_rate),
        -saturate(yaw_rate, limits.yaw, min_rate),
        -saturate(roll_rate, limits.roll, min_rate),
    )
}

/// Limit to `[-max, max]`, then apply the minimum-rate floor.
fn saturate(rate: f64, max: f64, floor: f64) -> f64 {
    clamp_min_rate(rate.max(-max).min(max), floor)
}

/// Sign with zero mapping to zero.
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::AttitudeReference;

    fn level() -> AttitudeAngles {
        AttitudeAngles { pitch: 0.0, roll: 0.0, reference: AttitudeReference::Gravity }
    }

    fn heading(pitch: f64, roll: f64) -> AttitudeAngles {
        AttitudeAngles { pitch, roll, reference: AttitudeReference::Heading }
    }

    fn speed(forward: f64, up: f64) -> SpeedComponents {
        SpeedComponents { forward, right: 0.0, up }
    }

    #[test]
    fn on_target_is_zero() {
        let w = angle_difference_rate(&Axes::local(), &level(), 0.0, 0.0, false, &RateLimits::uniform(30.0), 0.015);
        assert_eq!(w, Vector3::zeros());
    }

    #[test]
    fn full_reference_range_gives_max_rate() {
        let w = angle_difference_rate(&Axes::local(), &level(), 90.0, 0.0, false, &RateLimits::uniform(30.0), 0.015);
        assert!((w.x - 30.0).abs() < 1e-12, "pitch about +X, got {w}");
    }

    #[test]
    fn large_error_saturates_at_maximum() {
        let current = AttitudeAngles { pitch: -80.0, roll: -60.0, reference: AttitudeReference::Gravity };
        let w = angle_difference_rate(&Axes::local(), &current, 45.0, 45.0, false, &RateLimits::uniform(30.0), 0.015);
        assert!((w.x - 30.0).abs() < 1e-12, "got {w}");
        assert!((w.z - 30.0).abs() < 1e-12, "got {w}");
    }

    #[test]
    fn raising_right_wing_rolls_left() {
        let w = angle_difference_rate(&Axes::local(), &level(), 0.0, 10.0, false, &RateLimits::uniform(30.0), 0.015);
        // Rolling left is a negative angular velocity about forward (-Z), i.e. +Z.
        assert!(w.z > 0.0, "got {w}");
    }

    #[test]
    fn small_error_is_floored() {
        let w = angle_difference_rate(&Axes::local(), &level(), 0.001, 0.0, false, &RateLimits::uniform(1.0), 0.015);
        assert!((w.x - 0.015).abs() < 1e-12);
    }

    #[test]
    fn inverted_craft_reverses_channels() {
        let upright = angle_difference_rate(&Axes::local(), &level(), 20.0, 5.0, false, &RateLimits::uniform(30.0), 0.015);
        let inverted = angle_difference_rate(&Axes::local(), &level(), 20.0, 5.0, true, &RateLimits::uniform(30.0), 0.015);
        assert!((upright + inverted).norm() < 1e-12);
    }

    #[test]
    fn retrograde_reached_is_quiet() {
        let w = retrograde_angle_rate(
            &heading(180.0, 90.0),
            &speed(0.0, -20.0),
            ThrustOrientation::Rear,
            &RateLimits::uniform(30.0),
            0.015,
        );
        assert_eq!(w, Vector3::zeros());
    }

    #[test]
    fn rear_thrust_pitches_nose_away_from_travel() {
        // Travel has a component toward the sensor top, which is the
        // negative control forward for rear thrust: the nose goes down.
        let w = retrograde_angle_rate(
            &heading(150.0, 90.0),
            &speed(-3.0, -10.0),
            ThrustOrientation::Rear,
            &RateLimits::uniform(30.0),
            0.015,
        );
        assert!((w.x + 10.0).abs() < 1e-12, "got {w}");
        assert_eq!(w.y, 0.0);
        assert_eq!(w.z, 0.0);
    }

    #[test]
    fn half_turn_saturates() {
        let w = retrograde_angle_rate(
            &heading(0.0, 90.0),
            &speed(1.0, 40.0),
            ThrustOrientation::Rear,
            &RateLimits::uniform(30.0),
            0.015,
        );
        assert!((w.x - 30.0).abs() < 1e-12, "got {w}");
    }

    #[test]
    fn bottom_thrust_moving_along_thrust_axis_flips_to_complement() {
        // pitch: |30 * 30 / 90| = 10 -> 30 - 10 = 20
        // yaw:   0 -> 30, scaled by 1 - 60/90
        // roll:  0 -> 30, scaled by 60/90
        let w = retrograde_angle_rate(
            &heading(60.0, 90.0),
            &speed(2.0, 5.0),
            ThrustOrientation::Bottom,
            &RateLimits::uniform(30.0),
            0.015,
        );
        assert!((w.x - 20.0).abs() < 1e-9, "got {w}");
        assert!((w.y + 10.0).abs() < 1e-9, "got {w}");
        assert!((w.z + 20.0).abs() < 1e-9, "got {w}");
    }

    #[test]
    fn bottom_thrust_moving_against_thrust_axis_stays_proportional() {
        let w = retrograde_angle_rate(
            &heading(60.0, 90.0),
            &speed(2.0, -5.0),
            ThrustOrientation::Bottom,
            &RateLimits::uniform(30.0),
            0.015,
        );
        assert!((w.x - 10.0).abs() < 1e-9, "got {w}");
        assert_eq!(w.y, 0.0);
        assert_eq!(w.z, 0.0);
    }
}
