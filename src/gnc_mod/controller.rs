use log::error;
use nalgebra::Vector3;

use crate::config::{ControlLaw, FlightConfig, ThrustOrientation};
use crate::estimation::{Axes, AttitudeReference, MotionState, SpeedComponents};
use crate::math::safe_normalize;
use super::angle_law::{angle_difference_rate, retrograde_angle_rate};
use super::axis_angle::axis_angle_rate;
use super::guidance::pitch_roll_direction;
use super::rate::{RateCommand, RateLimits};

// ---------------------------------------------------------------------------
// Control target handed over by the active flight mode
// ---------------------------------------------------------------------------

/// What the active mode wants this tick. Produced fresh every tick and
/// consumed immediately; nothing here outlives the tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ControlTarget {
    /// Point the main-thrust axis along this world direction.
    Direction(Vector3<f64>),
    /// Hold these gravity-relative angles (deg).
    PitchRoll { pitch: f64, roll: f64 },
    /// Mode disabled: no rotation requested.
    #[default]
    None,
}

/// Trait for attitude controllers.
///
/// Implement this to plug a different control law into [`crate::FlightAssist`].
pub trait Controller {
    /// Rate command in the sensor's local frame.
    fn control(
        &mut self,
        target: &ControlTarget,
        motion: &MotionState,
        limits: &RateLimits,
    ) -> RateCommand;

    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Orientation controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OrientationController {
    pub law: ControlLaw,
    pub velocity_scale: f64,
    pub min_rate: f64,
    gravity_thrust_axis: Vector3<f64>, // sensor-local
    space_thrust_axis: Vector3<f64>,   // sensor-local
    space_thrust: ThrustOrientation,
}

impl OrientationController {
    pub fn new(config: &FlightConfig) -> Self {
        Self {
            law: config.control_law,
            velocity_scale: config.velocity_scale,
            min_rate: config.min_rate,
            gravity_thrust_axis: Axes::local().remapped(config.gravity_main_thrust).up,
            space_thrust_axis: Axes::local().remapped(config.space_main_thrust).up,
            space_thrust: config.space_main_thrust,
        }
    }

    /// Main-thrust axis in sensor-local coordinates for the current regime.
    pub fn thrust_axis(&self, in_gravity: bool) -> Vector3<f64> {
        if in_gravity {
            self.gravity_thrust_axis
        } else {
            self.space_thrust_axis
        }
    }

    /// `ComputeRate`: angular velocity (sensor-local) turning the thrust axis
    /// toward a world direction.
    pub fn compute_rate(
        &self,
        reference_local: &Vector3<f64>,
        target_world: &Vector3<f64>,
        motion: &MotionState,
        actuator_max: f64,
    ) -> Vector3<f64> {
        let target_local = motion.frame.to_local(target_world);
        axis_angle_rate(
            reference_local,
            &target_local,
            actuator_max,
            self.velocity_scale,
            self.min_rate,
        )
    }

    /// Velocity along the space control axes when the angle-difference law
    /// should steer toward `direction`: weightless, moving, and `direction`
    /// pointing straight back along the heading.
    fn retrograde_speed(&self, direction: &Vector3<f64>, motion: &MotionState) -> Option<SpeedComponents> {
        if self.law != ControlLaw::AngleDifference
            || motion.in_gravity
            || motion.attitude.reference != AttitudeReference::Heading
        {
            return None;
        }
        let heading = motion.heading?;
        let direction = safe_normalize(direction)?;
        if direction.dot(&heading) > RETROGRADE_TOLERANCE - 1.0 {
            return None;
        }
        let v = motion.velocity();
        Some(SpeedComponents {
            forward: v.dot(&motion.space_axes.forward),
            right: v.dot(&motion.space_axes.right),
            up: v.dot(&motion.space_axes.up),
        })
    }
}

/// Tolerance on `1 + direction . heading` for a target to count as retrograde.
const RETROGRADE_TOLERANCE: f64 = 1e-6;

impl Controller for OrientationController {
    fn control(
        &mut self,
        target: &ControlTarget,
        motion: &MotionState,
        limits: &RateLimits,
    ) -> RateCommand {
        let w = match *target {
            ControlTarget::None => Vector3::zeros(),
            ControlTarget::Direction(direction) => match self.retrograde_speed(&direction, motion) {
                Some(control_speed) => retrograde_angle_rate(
                    &motion.attitude,
                    &control_speed,
                    self.space_thrust,
                    limits,
                    self.min_rate,
                ),
                None => {
                    let reference = self.thrust_axis(motion.in_gravity);
                    self.compute_rate(&reference, &direction, motion, limits.pitch)
                }
            },
            ControlTarget::PitchRoll { pitch, roll } => match motion.gravity {
                // Pitch and roll are only defined against a gravity vector.
                None => Vector3::zeros(),
                Some(up_g) => match self.law {
                    ControlLaw::AxisAngle => {
                        let direction =
                            pitch_roll_direction(&motion.gravity_axes, &up_g, pitch, roll);
                        self.compute_rate(&self.gravity_thrust_axis, &direction, motion, limits.pitch)
                    }
                    ControlLaw::AngleDifference => {
                        let w_world = angle_difference_rate(
                            &motion.gravity_axes,
                            &motion.attitude,
                            pitch,
                            roll,
                            motion.upside_down,
                            limits,
                            self.min_rate,
                        );
                        motion.frame.to_local(&w_world)
                    }
                },
            },
        };

        let command = RateCommand::from_angular_velocity(&w);
        if command.is_finite() {
            command
        } else {
            error!("non-finite rate {command:?} replaced with zero");
            RateCommand::zero()
        }
    }

    fn name(&self) -> &str {
        match self.law {
            ControlLaw::AxisAngle => "AxisAngle",
            ControlLaw::AngleDifference => "AngleDifference",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::MotionEstimator;
    use nalgebra::Rotation3;

    const LIMITS: RateLimits = RateLimits { pitch: 30.0, yaw: 30.0, roll: 30.0 };

    fn motion_at(rot: Rotation3<f64>, gravity: Option<Vector3<f64>>) -> MotionState {
        let mut est = MotionEstimator::new(&FlightConfig::default(), Rotation3::identity());
        est.update(Vector3::zeros(), rot, gravity);
        est.update(Vector3::zeros(), rot, gravity)
    }

    fn moving(rot: Rotation3<f64>, step: Vector3<f64>) -> MotionState {
        let mut est = MotionEstimator::new(&FlightConfig::default(), Rotation3::identity());
        est.update(Vector3::zeros(), rot, None);
        est.update(step, rot, None)
    }

    fn gravity() -> Option<Vector3<f64>> {
        Some(Vector3::new(0.0, -9.81, 0.0))
    }

    #[test]
    fn level_hover_target_is_quiet() {
        let mut c = OrientationController::new(&FlightConfig::default());
        let m = motion_at(Rotation3::identity(), gravity());
        let cmd = c.control(&ControlTarget::PitchRoll { pitch: 0.0, roll: 0.0 }, &m, &LIMITS);
        assert!(cmd.magnitude() < 1e-9, "got {cmd:?}");
    }

    #[test]
    fn no_target_no_rate() {
        let mut c = OrientationController::new(&FlightConfig::default());
        let m = motion_at(Rotation3::identity(), None);
        assert_eq!(c.control(&ControlTarget::None, &m, &LIMITS), RateCommand::zero());
    }

    #[test]
    fn pitch_up_target_commands_positive_pitch() {
        for law in [ControlLaw::AxisAngle, ControlLaw::AngleDifference] {
            let cfg = FlightConfig { control_law: law, ..Default::default() };
            let mut c = OrientationController::new(&cfg);
            let m = motion_at(Rotation3::identity(), gravity());
            let cmd = c.control(&ControlTarget::PitchRoll { pitch: 20.0, roll: 0.0 }, &m, &LIMITS);
            assert!(cmd.pitch > 0.0, "{law}: {cmd:?}");
            assert!(cmd.roll.abs() < 1e-9 && cmd.yaw.abs() < 1e-9, "{law}: {cmd:?}");
        }
    }

    #[test]
    fn pitch_roll_in_space_is_ignored() {
        let mut c = OrientationController::new(&FlightConfig::default());
        let m = motion_at(Rotation3::identity(), None);
        let cmd = c.control(&ControlTarget::PitchRoll { pitch: 20.0, roll: 5.0 }, &m, &LIMITS);
        assert_eq!(cmd, RateCommand::zero());
    }

    #[test]
    fn retrograde_direction_uses_space_thrust_axis() {
        // Rear thrust: the thrust axis is the nose. Target straight up (+Y)
        // needs a nose-up pitch.
        let mut c = OrientationController::new(&FlightConfig::default());
        let m = motion_at(Rotation3::identity(), None);
        let cmd = c.control(&ControlTarget::Direction(Vector3::y()), &m, &LIMITS);
        assert!(cmd.pitch > 0.0, "got {cmd:?}");
        assert!((cmd.pitch - 15.0).abs() < 1e-9);
    }

    #[test]
    fn control_is_deterministic() {
        let mut c = OrientationController::new(&FlightConfig::default());
        let rot = Rotation3::from_euler_angles(0.1, 0.4, -0.2);
        let m = motion_at(rot, None);
        let target = ControlTarget::Direction(Vector3::new(0.3, -0.2, 0.9));
        let a = c.control(&target, &m, &LIMITS);
        let b = c.control(&target, &m, &LIMITS);
        assert_eq!(a, b);
    }

    #[test]
    fn angle_difference_steers_retrograde_in_space() {
        let cfg = FlightConfig { control_law: ControlLaw::AngleDifference, ..Default::default() };
        let mut c = OrientationController::new(&cfg);
        // Travelling nose-first with a slight climb; retrograde needs a
        // half turn, started nose-down at the actuator maximum.
        let m = moving(Rotation3::identity(), Vector3::new(0.0, 0.02, -0.2));
        let retro = -m.heading.unwrap();
        let cmd = c.control(&ControlTarget::Direction(retro), &m, &LIMITS);
        assert!((cmd.pitch + 30.0).abs() < 1e-9, "got {cmd:?}");
        assert!(cmd.yaw.abs() <= 0.015 + 1e-12, "got {cmd:?}");
        assert!(cmd.roll.abs() <= 0.015 + 1e-12, "got {cmd:?}");
    }

    #[test]
    fn angle_difference_keeps_axis_angle_for_other_directions() {
        let m = moving(Rotation3::from_euler_angles(0.1, 0.4, -0.2), Vector3::new(0.1, 0.02, -0.2));
        let prograde = ControlTarget::Direction(m.heading.unwrap());
        let mut legacy = OrientationController::new(&FlightConfig {
            control_law: ControlLaw::AngleDifference,
            ..Default::default()
        });
        let mut axis_angle = OrientationController::new(&FlightConfig::default());
        assert_eq!(
            legacy.control(&prograde, &m, &LIMITS),
            axis_angle.control(&prograde, &m, &LIMITS)
        );
    }

    #[test]
    fn rear_thrust_held_vertical_needs_no_correction() {
        let nose_up = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::FRAC_PI_2);
        for law in [ControlLaw::AxisAngle, ControlLaw::AngleDifference] {
            let cfg = FlightConfig {
                control_law: law,
                gravity_main_thrust: ThrustOrientation::Rear,
                ..Default::default()
            };
            let mut est = MotionEstimator::new(&cfg, Rotation3::identity());
            est.update(Vector3::zeros(), nose_up, gravity());
            let m = est.update(Vector3::zeros(), nose_up, gravity());
            let mut c = OrientationController::new(&cfg);
            let cmd = c.control(&ControlTarget::PitchRoll { pitch: 0.0, roll: 0.0 }, &m, &LIMITS);
            // Rounding noise may only ever reach the minimum-rate floor.
            for rate in [cmd.pitch, cmd.yaw, cmd.roll] {
                assert!(rate.abs() <= cfg.min_rate + 1e-12, "{law}: {cmd:?}");
            }
        }
    }

    #[test]
    fn rear_thrust_nose_below_vertical_pitches_up() {
        // 20 degrees short of vertical: the control frame reads pitch -20.
        let tilted = Rotation3::from_axis_angle(&Vector3::x_axis(), 70f64.to_radians());
        for law in [ControlLaw::AxisAngle, ControlLaw::AngleDifference] {
            let cfg = FlightConfig {
                control_law: law,
                gravity_main_thrust: ThrustOrientation::Rear,
                ..Default::default()
            };
            let mut est = MotionEstimator::new(&cfg, Rotation3::identity());
            est.update(Vector3::zeros(), tilted, gravity());
            let m = est.update(Vector3::zeros(), tilted, gravity());
            let mut c = OrientationController::new(&cfg);
            let cmd = c.control(&ControlTarget::PitchRoll { pitch: 0.0, roll: 0.0 }, &m, &LIMITS);
            assert!(cmd.pitch > 1.0, "{law}: {cmd:?}");
        }
    }
}
