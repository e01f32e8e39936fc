use nalgebra::{Rotation3, Vector3};

use crate::config::{FlightConfig, ThrustOrientation};
use crate::math::{acos_deg, asin_deg, safe_normalize};
use super::frame::{Axes, OrientationFrame};

// ---------------------------------------------------------------------------
// Derived quantities
// ---------------------------------------------------------------------------

/// Velocity components along three directions, m/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeedComponents {
    pub forward: f64,
    pub right: f64,
    pub up: f64,
}

/// What the attitude angles are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttitudeReference {
    /// Elevation of the control axes above the horizon.
    Gravity,
    /// Angle between the sensor axes and the direction of travel.
    Heading,
    /// Weightless and not moving: nothing to measure against.
    #[default]
    None,
}

/// Pitch and roll (tilt) in degrees.
///
/// In gravity: `pitch = asin(forward . up_g)`, `roll = asin(right . up_g)`,
/// so a level craft reads 0/0 and nose-up / right-wing-up are positive.
/// Away from gravity: `acos(heading . axis)` in `[0, 180]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttitudeAngles {
    pub pitch: f64,
    pub roll: f64,
    pub reference: AttitudeReference,
}

/// Snapshot of the craft's motion for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    pub position: Vector3<f64>,
    pub previous_position: Option<Vector3<f64>>,
    /// Unit direction of travel; `None` until two samples differ.
    pub heading: Option<Vector3<f64>>,
    pub speed: f64,
    /// Unit vector opposing gravity, `None` when weightless.
    pub gravity: Option<Vector3<f64>>,
    pub gravity_strength: f64, // m/s^2
    pub in_gravity: bool,
    /// True for exactly the one tick on which `in_gravity` flipped.
    pub gravity_transitioned: bool,
    pub frame: OrientationFrame,
    /// Sensor axes remapped for the gravity main-thrust side.
    pub gravity_axes: Axes,
    /// Sensor axes remapped for the space main-thrust side.
    pub space_axes: Axes,
    pub attitude: AttitudeAngles,
    /// Horizontal/vertical components relative to gravity (zero in space).
    pub world_speed: SpeedComponents,
    /// Components along the sensor's own axes.
    pub local_speed: SpeedComponents,
    pub upside_down: bool,
}

impl MotionState {
    /// Motion of a craft that has not been sampled yet.
    pub fn at_rest(frame: OrientationFrame) -> Self {
        Self {
            position: Vector3::zeros(),
            previous_position: None,
            heading: None,
            speed: 0.0,
            gravity: None,
            gravity_strength: 0.0,
            in_gravity: false,
            gravity_transitioned: false,
            frame,
            gravity_axes: frame.axes,
            space_axes: frame.axes,
            attitude: AttitudeAngles::default(),
            world_speed: SpeedComponents::default(),
            local_speed: SpeedComponents::default(),
            upside_down: false,
        }
    }

    /// World velocity vector, zero when the heading is undefined.
    pub fn velocity(&self) -> Vector3<f64> {
        self.heading.map_or_else(Vector3::zeros, |h| h * self.speed)
    }
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Finite-difference motion estimator. No filtering: each tick's state is
/// derived from the latest two position samples and the live orientation.
#[derive(Debug, Clone)]
pub struct MotionEstimator {
    tick_period_ms: f64,
    gravity_thrust: ThrustOrientation,
    space_thrust: ThrustOrientation,
    ship_build: Rotation3<f64>,
    previous_position: Option<Vector3<f64>>,
    previous_in_gravity: Option<bool>,
}

impl MotionEstimator {
    pub fn new(config: &FlightConfig, ship_build: Rotation3<f64>) -> Self {
        Self {
            tick_period_ms: config.tick_period_ms(),
            gravity_thrust: config.gravity_main_thrust,
            space_thrust: config.space_main_thrust,
            ship_build,
            previous_position: None,
            previous_in_gravity: None,
        }
    }

    pub fn update(
        &mut self,
        position: Vector3<f64>,
        world: Rotation3<f64>,
        gravity_sample: Option<Vector3<f64>>,
    ) -> MotionState {
        let previous_position = self.previous_position.replace(position);

        // --- Velocity ---
        let (heading, speed) = match previous_position {
            Some(prev) => {
                let delta = position - prev;
                match safe_normalize(&delta) {
                    Some(unit) => (Some(unit), delta.norm() / self.tick_period_ms * 1000.0),
                    None => (None, 0.0),
                }
            }
            None => (None, 0.0),
        };

        // --- Gravity ---
        let gravity_strength = gravity_sample
            .filter(|g| g.iter().all(|c| c.is_finite()))
            .map_or(0.0, |g| g.norm());
        let gravity = gravity_sample.and_then(|g| safe_normalize(&-g));
        let in_gravity = gravity.is_some();
        let gravity_transitioned = self
            .previous_in_gravity
            .is_some_and(|was| was != in_gravity);
        self.previous_in_gravity = Some(in_gravity);

        // --- Orientation ---
        let frame = OrientationFrame::new(world, self.ship_build);
        let gravity_axes = frame.axes.remapped(self.gravity_thrust);
        let space_axes = frame.axes.remapped(self.space_thrust);

        let local_speed = match heading {
            Some(h) => SpeedComponents {
                forward: h.dot(&frame.forward()) * speed,
                right: h.dot(&frame.right()) * speed,
                up: h.dot(&frame.up()) * speed,
            },
            None => SpeedComponents::default(),
        };

        let (attitude, world_speed, upside_down) = match gravity {
            Some(up_g) => {
                let attitude = AttitudeAngles {
                    pitch: asin_deg(gravity_axes.forward.dot(&up_g)),
                    roll: asin_deg(gravity_axes.right.dot(&up_g)),
                    reference: AttitudeReference::Gravity,
                };
                let world_speed = match heading {
                    Some(h) => {
                        let (h_forward, h_right) = gravity_axes.horizontal(&up_g);
                        SpeedComponents {
                            forward: h.dot(&h_forward) * speed,
                            right: h.dot(&h_right) * speed,
                            up: h.dot(&up_g) * speed,
                        }
                    }
                    None => SpeedComponents::default(),
                };
                (attitude, world_speed, gravity_axes.up.dot(&up_g) < 0.0)
            }
            None => {
                // World components are meaningless without a gravity reference.
                let attitude = match heading {
                    Some(h) => {
                        let behind = if local_speed.forward > 0.0 { 0.0 } else { 180.0 };
                        AttitudeAngles {
                            pitch: acos_deg(h.dot(&frame.forward()), behind),
                            roll: acos_deg(h.dot(&frame.right()), 90.0),
                            reference: AttitudeReference::Heading,
                        }
                    }
                    None => AttitudeAngles::default(),
                };
                (attitude, SpeedComponents::default(), false)
            }
        };

        MotionState {
            position,
            previous_position,
            heading,
            speed,
            gravity,
            gravity_strength,
            in_gravity,
            gravity_transitioned,
            frame,
            gravity_axes,
            space_axes,
            attitude,
            world_speed,
            local_speed,
            upside_down,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const G: f64 = 9.81;

    fn estimator() -> MotionEstimator {
        MotionEstimator::new(&FlightConfig::default(), Rotation3::identity())
    }

    fn down() -> Option<Vector3<f64>> {
        Some(Vector3::new(0.0, -G, 0.0))
    }

    /// Metres travelled per tick at `speed` m/s and 60 Hz.
    fn step(speed: f64) -> f64 {
        speed / 60.0
    }

    #[test]
    fn first_sample_has_no_velocity() {
        let mut est = estimator();
        let m = est.update(Vector3::new(100.0, 5.0, -3.0), Rotation3::identity(), down());
        assert!(m.heading.is_none());
        assert_eq!(m.speed, 0.0);
        assert_eq!(m.local_speed, SpeedComponents::default());
        assert_eq!(m.world_speed, SpeedComponents::default());
    }

    #[test]
    fn stationary_samples_give_exact_zero_components() {
        let mut est = estimator();
        let p = Vector3::new(1.0, 2.0, 3.0);
        for _ in 0..5 {
            let m = est.update(p, Rotation3::identity(), down());
            assert_eq!(m.speed, 0.0);
            for c in [m.local_speed, m.world_speed] {
                assert_eq!(c.forward, 0.0);
                assert_eq!(c.right, 0.0);
                assert_eq!(c.up, 0.0);
            }
        }
    }

    #[test]
    fn level_at_rest_reads_zero_attitude() {
        let mut est = estimator();
        est.update(Vector3::zeros(), Rotation3::identity(), down());
        let m = est.update(Vector3::zeros(), Rotation3::identity(), down());
        assert!(m.in_gravity);
        assert_relative_eq!(m.attitude.pitch, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.attitude.roll, 0.0, epsilon = 1e-9);
        assert!(!m.upside_down);
    }

    #[test]
    fn forward_flight_decomposes_into_world_forward() {
        let mut est = estimator();
        est.update(Vector3::zeros(), Rotation3::identity(), down());
        // Forward is -Z.
        let m = est.update(Vector3::new(0.0, 0.0, -step(10.0)), Rotation3::identity(), down());
        assert_relative_eq!(m.speed, 10.0, epsilon = 1e-9);
        assert_relative_eq!(m.world_speed.forward, 10.0, epsilon = 1e-9);
        assert_relative_eq!(m.world_speed.right, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.world_speed.up, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.local_speed.forward, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn tick_rate_is_configurable() {
        let cfg = FlightConfig { tick_rate_hz: 30.0, ..Default::default() };
        let mut est = MotionEstimator::new(&cfg, Rotation3::identity());
        est.update(Vector3::zeros(), Rotation3::identity(), None);
        let m = est.update(Vector3::new(1.0, 0.0, 0.0), Rotation3::identity(), None);
        assert_relative_eq!(m.speed, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn gravity_transition_flag_lasts_one_tick() {
        let mut est = estimator();
        let samples = [down(), down(), None, None];
        let flags: Vec<bool> = samples
            .iter()
            .map(|g| est.update(Vector3::zeros(), Rotation3::identity(), *g).gravity_transitioned)
            .collect();
        assert_eq!(flags, vec![false, false, true, false]);
    }

    #[test]
    fn entering_gravity_is_also_a_transition() {
        let mut est = estimator();
        let samples = [None, None, down(), down()];
        let flags: Vec<bool> = samples
            .iter()
            .map(|g| est.update(Vector3::zeros(), Rotation3::identity(), *g).gravity_transitioned)
            .collect();
        assert_eq!(flags, vec![false, false, true, false]);
    }

    #[test]
    fn zero_and_nan_gravity_count_as_weightless() {
        let mut est = estimator();
        let m = est.update(Vector3::zeros(), Rotation3::identity(), Some(Vector3::zeros()));
        assert!(!m.in_gravity);
        let m = est.update(
            Vector3::zeros(),
            Rotation3::identity(),
            Some(Vector3::new(f64::NAN, 0.0, 0.0)),
        );
        assert!(!m.in_gravity);
        assert_eq!(m.gravity_strength, 0.0);
    }

    #[test]
    fn weightless_world_components_forced_to_zero() {
        let mut est = estimator();
        est.update(Vector3::zeros(), Rotation3::identity(), None);
        let m = est.update(Vector3::new(0.5, 0.2, -0.3), Rotation3::identity(), None);
        assert_eq!(m.world_speed, SpeedComponents::default());
        assert!(m.local_speed.right > 0.0);
        assert_eq!(m.attitude.reference, AttitudeReference::Heading);
    }

    #[test]
    fn retrograde_in_space_reads_180() {
        let mut est = estimator();
        est.update(Vector3::zeros(), Rotation3::identity(), None);
        // Moving backward (+Z) while facing forward (-Z).
        let m = est.update(Vector3::new(0.0, 0.0, step(50.0)), Rotation3::identity(), None);
        assert_relative_eq!(m.attitude.pitch, 180.0, epsilon = 1e-9);
        assert_relative_eq!(m.attitude.roll, 90.0, epsilon = 1e-9);
        assert!(m.local_speed.forward < 0.0);
    }

    #[test]
    fn nose_up_pitch_is_positive() {
        let mut est = estimator();
        let rot = Rotation3::from_axis_angle(&Vector3::x_axis(), 20f64.to_radians());
        let m = est.update(Vector3::zeros(), rot, down());
        assert_relative_eq!(m.attitude.pitch, 20.0, epsilon = 1e-9);
        assert_relative_eq!(m.attitude.roll, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn inverted_craft_is_upside_down() {
        let mut est = estimator();
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI);
        let m = est.update(Vector3::zeros(), rot, down());
        assert!(m.upside_down);
    }

    #[test]
    fn rear_thrust_held_vertical_reads_level() {
        let cfg = FlightConfig { gravity_main_thrust: ThrustOrientation::Rear, ..Default::default() };
        let mut est = MotionEstimator::new(&cfg, Rotation3::identity());
        let nose_up = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::FRAC_PI_2);
        est.update(Vector3::zeros(), nose_up, down());
        let m = est.update(Vector3::zeros(), nose_up, down());
        assert_relative_eq!(m.attitude.pitch, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.attitude.roll, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.gravity_axes.up, Vector3::y(), epsilon = 1e-12);
        assert!(!m.upside_down);
    }
}
