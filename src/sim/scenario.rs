use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Rotation3, UnitQuaternion, Vector3};

use super::body::{Body, GravityField, Propulsion};
use super::host::{GyroState, SimWorld};

/// Gyro maximum used by the presets, RPM.
pub const GYRO_MAX_RPM: f64 = 30.0;

/// A command issued at a fixed simulation time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCommand {
    pub time: f64, // s
    pub command: String,
}

// ---------------------------------------------------------------------------
// Scenario definition
// ---------------------------------------------------------------------------

/// Initial world plus a command script.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub field: GravityField,
    pub body: Body,
    pub propulsion: Propulsion,
    pub sensor_build: Rotation3<f64>,
    pub dampeners: bool,
    pub gyros: Vec<GyroState>,
    pub commands: Vec<ScheduledCommand>,
    pub duration: f64, // s
}

impl Scenario {
    /// Level grid at rest on a flat world with three differently mounted gyros.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            field: GravityField::surface(),
            body: Body::default(),
            propulsion: Propulsion::default(),
            sensor_build: Rotation3::identity(),
            dampeners: false,
            gyros: vec![
                GyroState::new(Rotation3::identity(), GYRO_MAX_RPM),
                GyroState::new(Rotation3::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2), GYRO_MAX_RPM),
                GyroState::new(Rotation3::from_axis_angle(&Vector3::z_axis(), PI), GYRO_MAX_RPM),
            ],
            commands: Vec::new(),
            duration: 30.0,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn field(mut self, field: GravityField) -> Self {
        self.field = field;
        self
    }

    pub fn position(mut self, position: Vector3<f64>) -> Self {
        self.body.position = position;
        self
    }

    pub fn velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.body.velocity = velocity;
        self
    }

    pub fn attitude(mut self, attitude: UnitQuaternion<f64>) -> Self {
        self.body.attitude = attitude;
        self
    }

    pub fn propulsion(mut self, propulsion: Propulsion) -> Self {
        self.propulsion = propulsion;
        self
    }

    pub fn sensor_build(mut self, build: Rotation3<f64>) -> Self {
        self.sensor_build = build;
        self
    }

    pub fn dampeners(mut self, engaged: bool) -> Self {
        self.dampeners = engaged;
        self
    }

    pub fn gyros(mut self, gyros: Vec<GyroState>) -> Self {
        self.gyros = gyros;
        self
    }

    pub fn command(mut self, time: f64, command: impl Into<String>) -> Self {
        self.commands.push(ScheduledCommand { time, command: command.into() });
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    /// Fresh world in the scenario's initial state.
    pub fn world(&self) -> SimWorld {
        SimWorld {
            body: self.body.clone(),
            field: self.field,
            propulsion: self.propulsion,
            sensor_build: self.sensor_build,
            dampeners: self.dampeners,
            gyros: self.gyros.clone(),
            screen: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Drifting forward at 20 m/s in gravity; hover assist brings the
    /// grid to a standstill.
    pub fn hover_stop() -> Scenario {
        Scenario::new("hover_stop")
            .description("Hover assist stops a 20 m/s forward drift")
            .position(Vector3::new(0.0, 100.0, 0.0))
            .velocity(Vector3::new(0.0, 0.0, -20.0))
            .command(0.1, "hover toggle")
            .duration(60.0)
    }

    /// From rest, cruise at 10 m/s.
    pub fn cruise() -> Scenario {
        Scenario::new("cruise")
            .description("Hover assist cruise at 10 m/s from rest")
            .position(Vector3::new(0.0, 100.0, 0.0))
            .command(0.1, "hover cruise 10")
            .command(0.2, "hover toggle")
            .duration(90.0)
    }

    /// Weightless at 50 m/s; retrograde brake with dampeners.
    pub fn space_brake() -> Scenario {
        Scenario::new("space_brake")
            .description("Retrograde brake from 50 m/s in space")
            .field(GravityField::Space)
            .velocity(Vector3::new(0.48, 0.36, -0.8) * 50.0)
            .dampeners(true)
            .command(0.5, "vector brake")
            .duration(60.0)
    }

    /// Climbing out of a planet's gravity well while hovering.
    pub fn gravity_exit() -> Scenario {
        Scenario::new("gravity_exit")
            .description("Hover assist releases the gyros when gravity fades")
            .field(GravityField::Planet {
                center: Vector3::zeros(),
                radius: 60_000.0,
                surface_gravity: 9.81,
                limit_altitude: 1_000.0,
            })
            .position(Vector3::new(0.0, 60_900.0, 0.0))
            .velocity(Vector3::new(0.0, 20.0, -5.0))
            .propulsion(Propulsion { vertical_gain: 0.0, ..Default::default() })
            .command(0.1, "hover toggle")
            .duration(20.0)
    }

    pub fn all() -> Vec<Scenario> {
        vec![hover_stop(), cruise(), space_brake(), gravity_exit()]
    }

    pub fn by_name(name: &str) -> Option<Scenario> {
        all().into_iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
