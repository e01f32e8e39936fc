//! Contract with the host environment.
//!
//! The controller never looks blocks up itself beyond [`BlockInventory`];
//! everything it reads or writes goes through these handles.
//!
//! Orientation convention: a `Rotation3` maps block-local coordinates into
//! its parent frame, with local `+X = right`, `+Y = up`, `-Z = forward`.

use nalgebra::{Rotation3, Vector3};
use strum_macros::{Display, EnumIter};

/// Gyro override axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum GyroAxis {
    Pitch,
    Yaw,
    Roll,
}

/// Position/orientation reference of the craft (remote control block).
pub trait Sensor {
    /// World position, m.
    fn position(&self) -> Vector3<f64>;

    /// Sensor-local to world rotation.
    fn world_orientation(&self) -> Rotation3<f64>;

    /// Sensor-local to ship-grid rotation (how the block was placed).
    fn build_orientation(&self) -> Rotation3<f64>;

    /// Natural gravity acceleration in world coordinates, `None` in space.
    fn natural_gravity(&self) -> Option<Vector3<f64>>;

    fn dampeners_engaged(&self) -> bool;

    fn toggle_dampeners(&mut self);
}

/// Gyroscopic torquer with an override mode.
pub trait Gyro {
    fn set_axis_rate(&mut self, axis: GyroAxis, rate: f64);

    fn axis_rate(&self, axis: GyroAxis) -> f64;

    fn set_override(&mut self, enabled: bool);

    fn override_enabled(&self) -> bool;

    fn max_rate(&self, axis: GyroAxis) -> f64;

    /// Gyro-local to ship-grid rotation.
    fn local_orientation(&self) -> Rotation3<f64>;
}

/// Text panel.
pub trait DisplaySink {
    fn write_text(&mut self, text: &str, append: bool);
}

/// Name/type based block lookup owned by the host.
pub trait BlockInventory {
    fn sensor(&mut self, name: &str) -> Option<Box<dyn Sensor>>;

    /// Up to `count` gyros on the same grid, in a stable order.
    fn gyros(&mut self, count: usize) -> Vec<Box<dyn Gyro>>;

    fn display(&mut self, name: &str) -> Option<Box<dyn DisplaySink>>;
}
