pub mod angle_law;
pub mod axis_angle;
pub mod controller;
pub mod guidance;
pub mod rate;

pub use angle_law::{angle_difference_rate, retrograde_angle_rate};
pub use axis_angle::{axis_angle_rate, rotation_angle};
pub use controller::{ControlTarget, Controller, OrientationController};
pub use guidance::{pitch_roll_direction, soft_lean};
pub use rate::{RateCommand, RateLimits};
