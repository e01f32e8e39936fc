use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::FlightError;

// ---------------------------------------------------------------------------
// Enumerated tunables
// ---------------------------------------------------------------------------

/// Which side of the craft carries the main thrusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThrustOrientation {
    /// Thrusters push along the craft's up axis (helicopter style).
    #[default]
    Bottom,
    /// Thrusters push along the craft's forward axis (rocket style).
    Rear,
}

/// Attitude control law used for pitch/roll targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ControlLaw {
    /// Rotate the thrust axis about `reference x target` (default).
    #[default]
    AxisAngle,
    /// Independent proportional pitch and roll rates from angle differences.
    AngleDifference,
}

// ---------------------------------------------------------------------------
// Controller configuration
// ---------------------------------------------------------------------------

/// Immutable tuning set handed to the controller at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub sensor_name: String,
    pub display_name: Option<String>,
    pub gyro_count: usize,
    pub gravity_main_thrust: ThrustOrientation,
    pub space_main_thrust: ThrustOrientation,
    pub always_enabled_in_gravity: bool,
    /// Softness of the lean curve. Larger = more gradual angle drop.
    pub responsiveness: f64,
    /// Fraction of actuator authority used by the axis-angle law, in [0, 1].
    pub velocity_scale: f64,
    pub max_pitch: f64,              // deg
    pub max_roll: f64,               // deg
    /// Rates below this magnitude are inert on the actuators.
    pub min_rate: f64,
    pub control_law: ControlLaw,
    pub tick_rate_hz: f64,
    pub screen_redraw_interval: u32, // ticks
    pub brake_speed_threshold: f64,  // m/s
    pub brake_angle_tolerance: f64,  // rad
    pub release_brake_on_alignment: bool,
    pub horizon_height: usize,
    pub horizon_width: usize,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            sensor_name: "FA Remote".into(),
            display_name: Some("FA Screen".into()),
            gyro_count: 1,
            gravity_main_thrust: ThrustOrientation::Bottom,
            space_main_thrust: ThrustOrientation::Rear,
            always_enabled_in_gravity: false,
            responsiveness: 16.0,
            velocity_scale: 1.0,
            max_pitch: 45.0,
            max_roll: 45.0,
            min_rate: 0.015,
            control_law: ControlLaw::AxisAngle,
            tick_rate_hz: 60.0,
            screen_redraw_interval: 5,
            brake_speed_threshold: 0.3,
            brake_angle_tolerance: 0.03,
            release_brake_on_alignment: false,
            horizon_height: 13,
            horizon_width: 27,
        }
    }
}

impl FlightConfig {
    /// Tick period in milliseconds.
    pub fn tick_period_ms(&self) -> f64 {
        1000.0 / self.tick_rate_hz
    }

    /// Tick period in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        let fail = |reason: String| Err(FlightError::InvalidConfig(reason));

        if self.gyro_count == 0 {
            return fail("gyro_count must be at least 1".into());
        }
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return fail(format!("tick_rate_hz must be positive, got {}", self.tick_rate_hz));
        }
        if !(self.responsiveness.is_finite() && self.responsiveness > 0.0) {
            return fail(format!("responsiveness must be positive, got {}", self.responsiveness));
        }
        if !(0.0..=1.0).contains(&self.velocity_scale) {
            return fail(format!("velocity_scale must lie in [0, 1], got {}", self.velocity_scale));
        }
        for (name, angle) in [("max_pitch", self.max_pitch), ("max_roll", self.max_roll)] {
            if !(angle > 0.0 && angle <= 89.0) {
                return fail(format!("{name} must lie in (0, 89] degrees, got {angle}"));
            }
        }
        for (name, value) in [
            ("min_rate", self.min_rate),
            ("brake_speed_threshold", self.brake_speed_threshold),
            ("brake_angle_tolerance", self.brake_angle_tolerance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return fail(format!("{name} must be non-negative, got {value}"));
            }
        }
        if self.screen_redraw_interval == 0 {
            return fail("screen_redraw_interval must be at least 1".into());
        }
        if self.horizon_height < 3 || self.horizon_width < 3 {
            return fail("horizon must be at least 3 x 3".into());
        }
        Ok(())
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, FlightError> {
        let config: FlightConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FlightError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
