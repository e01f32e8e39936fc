//! In-process implementation of the host contract backed by [`SimWorld`].
//!
//! Handles share the world through `Rc<RefCell<_>>`: the controller owns
//! its boxed handles while the runner keeps stepping the same world.

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Rotation3, Vector3};

use crate::gnc::RateCommand;
use crate::host::{BlockInventory, DisplaySink, Gyro, GyroAxis, Sensor};
use super::body::{Body, GravityField, Propulsion, RPM_TO_RAD_S};
use super::integrator::rk4_step;

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

/// One simulated gyro block.
#[derive(Debug, Clone, PartialEq)]
pub struct GyroState {
    pub mount: Rotation3<f64>, // gyro -> grid
    pub rate: RateCommand,     // RPM, gyro frame
    pub overridden: bool,
    pub max_rate: f64,         // RPM
}

impl GyroState {
    pub fn new(mount: Rotation3<f64>, max_rate: f64) -> Self {
        Self { mount, rate: RateCommand::zero(), overridden: false, max_rate }
    }

    /// Commanded angular velocity in the grid frame, rad/s.
    pub fn grid_angular_velocity(&self) -> Vector3<f64> {
        let clamp = |r: f64| r.clamp(-self.max_rate, self.max_rate);
        let local = RateCommand::new(clamp(self.rate.pitch), clamp(self.rate.yaw), clamp(self.rate.roll));
        self.mount * local.to_angular_velocity() * RPM_TO_RAD_S
    }
}

/// Everything the simulated host knows about the grid.
#[derive(Debug, Clone)]
pub struct SimWorld {
    pub body: Body,
    pub field: GravityField,
    pub propulsion: Propulsion,
    pub sensor_build: Rotation3<f64>, // sensor -> grid
    pub dampeners: bool,
    pub gyros: Vec<GyroState>,
    pub screen: String,
}

pub type SharedWorld = Rc<RefCell<SimWorld>>;

impl SimWorld {
    pub fn shared(self) -> SharedWorld {
        Rc::new(RefCell::new(self))
    }

    pub fn gravity(&self) -> Option<Vector3<f64>> {
        self.field.at(&self.body.position)
    }

    pub fn any_override(&self) -> bool {
        self.gyros.iter().any(|g| g.overridden)
    }

    /// Gyros under override set the grid's rotation to the mean of their
    /// commands; with none overriding the pilot holds the grid still.
    pub fn commanded_rotation(&self) -> Vector3<f64> {
        let active: Vec<_> = self.gyros.iter().filter(|g| g.overridden).collect();
        if active.is_empty() {
            return Vector3::zeros();
        }
        active.iter().map(|g| g.grid_angular_velocity()).sum::<Vector3<f64>>() / active.len() as f64
    }

    /// Advance the world by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        self.body.angular_velocity = self.commanded_rotation();
        self.body = rk4_step(&self.body, &self.field, &self.propulsion, self.dampeners, dt);
    }
}

// ---------------------------------------------------------------------------
// Block handles
// ---------------------------------------------------------------------------

/// Remote-control block at the grid origin.
#[derive(Debug, Clone)]
pub struct SimSensor {
    world: SharedWorld,
}

impl Sensor for SimSensor {
    fn position(&self) -> Vector3<f64> {
        self.world.borrow().body.position
    }

    fn world_orientation(&self) -> Rotation3<f64> {
        let world = self.world.borrow();
        world.body.attitude.to_rotation_matrix() * world.sensor_build
    }

    fn build_orientation(&self) -> Rotation3<f64> {
        self.world.borrow().sensor_build
    }

    fn natural_gravity(&self) -> Option<Vector3<f64>> {
        self.world.borrow().gravity()
    }

    fn dampeners_engaged(&self) -> bool {
        self.world.borrow().dampeners
    }

    fn toggle_dampeners(&mut self) {
        let mut world = self.world.borrow_mut();
        world.dampeners = !world.dampeners;
    }
}

#[derive(Debug, Clone)]
pub struct SimGyro {
    world: SharedWorld,
    index: usize,
}

impl SimGyro {
    fn with<R>(&self, f: impl FnOnce(&GyroState) -> R) -> R {
        f(&self.world.borrow().gyros[self.index])
    }

    fn with_mut(&mut self, f: impl FnOnce(&mut GyroState)) {
        f(&mut self.world.borrow_mut().gyros[self.index])
    }
}

impl Gyro for SimGyro {
    fn set_axis_rate(&mut self, axis: GyroAxis, rate: f64) {
        self.with_mut(|g| match axis {
            GyroAxis::Pitch => g.rate.pitch = rate,
            GyroAxis::Yaw => g.rate.yaw = rate,
            GyroAxis::Roll => g.rate.roll = rate,
        });
    }

    fn axis_rate(&self, axis: GyroAxis) -> f64 {
        self.with(|g| g.rate.axis(axis))
    }

    fn set_override(&mut self, enabled: bool) {
        self.with_mut(|g| g.overridden = enabled);
    }

    fn override_enabled(&self) -> bool {
        self.with(|g| g.overridden)
    }

    fn max_rate(&self, _axis: GyroAxis) -> f64 {
        self.with(|g| g.max_rate)
    }

    fn local_orientation(&self) -> Rotation3<f64> {
        self.with(|g| g.mount)
    }
}

/// Text panel that keeps its contents in the world.
#[derive(Debug, Clone)]
pub struct SimScreen {
    world: SharedWorld,
}

impl DisplaySink for SimScreen {
    fn write_text(&mut self, text: &str, append: bool) {
        let mut world = self.world.borrow_mut();
        if !append {
            world.screen.clear();
        }
        world.screen.push_str(text);
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Block lookup over a [`SimWorld`].
#[derive(Debug, Clone)]
pub struct SimGrid {
    world: SharedWorld,
    sensor_name: String,
    display_name: Option<String>,
}

impl SimGrid {
    pub fn new(world: SharedWorld, sensor_name: impl Into<String>, display_name: Option<String>) -> Self {
        Self { world, sensor_name: sensor_name.into(), display_name }
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }
}

impl BlockInventory for SimGrid {
    fn sensor(&mut self, name: &str) -> Option<Box<dyn Sensor>> {
        (name == self.sensor_name).then(|| Box::new(SimSensor { world: self.world.clone() }) as Box<dyn Sensor>)
    }

    fn gyros(&mut self, count: usize) -> Vec<Box<dyn Gyro>> {
        let available = self.world.borrow().gyros.len();
        (0..count.min(available))
            .map(|index| Box::new(SimGyro { world: self.world.clone(), index }) as Box<dyn Gyro>)
            .collect()
    }

    fn display(&mut self, name: &str) -> Option<Box<dyn DisplaySink>> {
        match &self.display_name {
            Some(own) if own == name => {
                Some(Box::new(SimScreen { world: self.world.clone() }) as Box<dyn DisplaySink>)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn world(gyros: Vec<GyroState>) -> SharedWorld {
        SimWorld {
            body: Body::default(),
            field: GravityField::Space,
            propulsion: Propulsion::default(),
            sensor_build: Rotation3::identity(),
            dampeners: false,
            gyros,
            screen: String::new(),
        }
        .shared()
    }

    #[test]
    fn inventory_matches_names() {
        let mut grid = SimGrid::new(world(vec![]), "FA Remote", Some("FA Screen".into()));
        assert!(grid.sensor("FA Remote").is_some());
        assert!(grid.sensor("Other").is_none());
        assert!(grid.display("FA Screen").is_some());
        assert!(grid.display("Nope").is_none());
    }

    #[test]
    fn gyro_lookup_is_capped_by_available() {
        let w = world(vec![GyroState::new(Rotation3::identity(), 30.0); 2]);
        let mut grid = SimGrid::new(w, "FA Remote", None);
        assert_eq!(grid.gyros(5).len(), 2);
        assert_eq!(grid.gyros(1).len(), 1);
    }

    #[test]
    fn handles_write_through_to_world() {
        let w = world(vec![GyroState::new(Rotation3::identity(), 30.0)]);
        let mut grid = SimGrid::new(w.clone(), "FA Remote", None);
        let mut gyro = grid.gyros(1).remove(0);
        gyro.set_override(true);
        gyro.set_axis_rate(GyroAxis::Yaw, 12.0);
        assert!(w.borrow().gyros[0].overridden);
        assert_eq!(w.borrow().gyros[0].rate.yaw, 12.0);

        let mut sensor = grid.sensor("FA Remote").unwrap();
        sensor.toggle_dampeners();
        assert!(w.borrow().dampeners);
    }

    #[test]
    fn mounted_gyro_turns_grid_in_grid_frame() {
        // Gyro yawed a quarter turn: its pitch axis is the grid's -Z.
        let mount = Rotation3::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let mut g = GyroState::new(mount, 30.0);
        g.overridden = true;
        g.rate = RateCommand::new(6.0, 0.0, 0.0);
        let w = g.grid_angular_velocity();
        assert_relative_eq!(w, mount * Vector3::x() * 6.0 * RPM_TO_RAD_S, epsilon = 1e-12);
    }

    #[test]
    fn rates_clamp_to_gyro_maximum() {
        let mut g = GyroState::new(Rotation3::identity(), 30.0);
        g.rate = RateCommand::new(100.0, 0.0, 0.0);
        assert_relative_eq!(g.grid_angular_velocity().x, 30.0 * RPM_TO_RAD_S);
    }

    #[test]
    fn no_override_means_no_rotation() {
        let w = world(vec![GyroState::new(Rotation3::identity(), 30.0)]);
        w.borrow_mut().gyros[0].rate = RateCommand::new(5.0, 5.0, 5.0);
        w.borrow_mut().step(0.1);
        assert_eq!(w.borrow().body.angular_velocity, Vector3::zeros());
    }
}
