use nalgebra::{Rotation3, Vector3};

use crate::host::GyroAxis;

// ---------------------------------------------------------------------------
// Rate command (gyro-native pitch/yaw/roll)
// ---------------------------------------------------------------------------

/// Signed per-axis gyro rates in actuator units.
///
/// Relation to an angular velocity `w` in the same frame:
/// `pitch = w.x`, `yaw = -w.y`, `roll = -w.z`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateCommand {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl RateCommand {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_angular_velocity(w: &Vector3<f64>) -> Self {
        Self { pitch: w.x, yaw: -w.y, roll: -w.z }
    }

    pub fn to_angular_velocity(&self) -> Vector3<f64> {
        Vector3::new(self.pitch, -self.yaw, -self.roll)
    }

    /// Same rotation expressed in the parent frame of `orientation`.
    pub fn rotated(&self, orientation: &Rotation3<f64>) -> Self {
        Self::from_angular_velocity(&(orientation * self.to_angular_velocity()))
    }

    /// Same rotation expressed in the local frame of `orientation`.
    pub fn in_local_frame(&self, orientation: &Rotation3<f64>) -> Self {
        Self::from_angular_velocity(&orientation.inverse_transform_vector(&self.to_angular_velocity()))
    }

    pub fn axis(&self, axis: GyroAxis) -> f64 {
        match axis {
            GyroAxis::Pitch => self.pitch,
            GyroAxis::Yaw => self.yaw,
            GyroAxis::Roll => self.roll,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }

    pub fn magnitude(&self) -> f64 {
        self.to_angular_velocity().norm()
    }
}

/// Per-axis actuator maxima.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimits {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl RateLimits {
    pub fn uniform(max: f64) -> Self {
        Self { pitch: max, yaw: max, roll: max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sign_convention_flips_yaw_and_roll() {
        let cmd = RateCommand::from_angular_velocity(&Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(cmd, RateCommand::new(1.0, -2.0, -3.0));
        assert_eq!(cmd.to_angular_velocity(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn local_then_parent_is_identity() {
        let rot = Rotation3::from_euler_angles(0.3, -1.1, 2.0);
        let cmd = RateCommand::new(0.4, -0.2, 0.7);
        let back = cmd.in_local_frame(&rot).rotated(&rot);
        assert_relative_eq!(back.pitch, cmd.pitch, epsilon = 1e-12);
        assert_relative_eq!(back.yaw, cmd.yaw, epsilon = 1e-12);
        assert_relative_eq!(back.roll, cmd.roll, epsilon = 1e-12);
    }

    #[test]
    fn quarter_turn_mount_moves_pitch_to_roll() {
        // Gyro mounted facing right: its forward (-Z) is the ship's +X.
        let mount = Rotation3::from_axis_angle(&Vector3::y_axis(), -std::f64::consts::FRAC_PI_2);
        let local = RateCommand::new(1.0, 0.0, 0.0).in_local_frame(&mount);
        assert_relative_eq!(local.pitch, 0.0, epsilon = 1e-12);
        assert_relative_eq!(local.yaw, 0.0, epsilon = 1e-12);
        assert_relative_eq!(local.roll.abs(), 1.0, epsilon = 1e-12);
    }
}
