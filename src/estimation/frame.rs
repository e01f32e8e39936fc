use nalgebra::{Rotation3, Vector3};

use crate::config::ThrustOrientation;
use crate::math::{any_perpendicular, safe_normalize};

// ---------------------------------------------------------------------------
// Axis triad
// ---------------------------------------------------------------------------

/// Forward/right/up unit vectors of a frame, expressed in some parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub forward: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl Axes {
    /// Columns of a block rotation: `+X` right, `+Y` up, `-Z` forward.
    pub fn from_rotation(rotation: &Rotation3<f64>) -> Self {
        Self {
            forward: rotation * -Vector3::z(),
            right: rotation * Vector3::x(),
            up: rotation * Vector3::y(),
        }
    }

    /// Axes of a local frame expressed in itself.
    pub fn local() -> Self {
        Self::from_rotation(&Rotation3::identity())
    }

    /// Control frame in which `up` is the direction the main thrusters push.
    ///
    /// Rear-thrust craft are treated as a bottom-thrust craft pitched up a
    /// quarter turn: `up' = forward`, `forward' = -up`, `right' = right`.
    pub fn remapped(&self, thrust: ThrustOrientation) -> Self {
        match thrust {
            ThrustOrientation::Bottom => *self,
            ThrustOrientation::Rear => Self {
                forward: -self.up,
                right: self.right,
                up: self.forward,
            },
        }
    }

    /// Horizontal forward and right directions relative to `up_g`
    /// (unit vector opposing gravity), preserving the craft's heading.
    ///
    /// Forward is the horizontal projection of `forward`; when the nose is
    /// vertical the perpendicular to `right` is used instead.
    pub fn horizontal(&self, up_g: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
        let projected = self.forward - up_g * self.forward.dot(up_g);
        let h_forward = safe_normalize(&projected)
            .or_else(|| safe_normalize(&up_g.cross(&self.right)))
            .unwrap_or_else(|| any_perpendicular(up_g));
        let h_right = h_forward.cross(up_g);
        (h_forward, h_right)
    }
}

// ---------------------------------------------------------------------------
// Orientation frame of the sensor
// ---------------------------------------------------------------------------

/// Live orientation of the sensor plus the fixed build orientation captured
/// at initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationFrame {
    pub world: Rotation3<f64>,
    pub axes: Axes,
    pub ship_build: Rotation3<f64>,
}

impl OrientationFrame {
    pub fn new(world: Rotation3<f64>, ship_build: Rotation3<f64>) -> Self {
        Self { world, axes: Axes::from_rotation(&world), ship_build }
    }

    pub fn forward(&self) -> Vector3<f64> {
        self.axes.forward
    }

    pub fn right(&self) -> Vector3<f64> {
        self.axes.right
    }

    pub fn up(&self) -> Vector3<f64> {
        self.axes.up
    }

    /// World vector in sensor-local coordinates.
    pub fn to_local(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.world.inverse_transform_vector(v)
    }
}

impl Default for OrientationFrame {
    fn default() -> Self {
        Self::new(Rotation3::identity(), Rotation3::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_axes_follow_block_convention() {
        let a = Axes::local();
        assert_relative_eq!(a.forward, -Vector3::z());
        assert_relative_eq!(a.right, Vector3::x());
        assert_relative_eq!(a.up, Vector3::y());
    }

    #[test]
    fn rear_remap_stays_right_handed() {
        let a = Axes::local().remapped(ThrustOrientation::Rear);
        // right x up = backward for any right-handed block frame
        assert_relative_eq!(a.right.cross(&a.up), -a.forward, epsilon = 1e-12);
        assert_relative_eq!(a.up, -Vector3::z());
    }

    #[test]
    fn horizontal_basis_when_level() {
        let a = Axes::local();
        let (hf, hr) = a.horizontal(&Vector3::y());
        assert_relative_eq!(hf, a.forward, epsilon = 1e-12);
        assert_relative_eq!(hr, a.right, epsilon = 1e-12);
    }

    #[test]
    fn horizontal_basis_with_nose_vertical() {
        // Pitched a quarter turn nose-up: forward points along +Y.
        let rot = Rotation3::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        let a = Axes::from_rotation(&rot);
        let (hf, hr) = a.horizontal(&Vector3::y());
        assert!(hf.dot(&Vector3::y()).abs() < 1e-9, "forward must be horizontal");
        assert_relative_eq!(hr, Vector3::x(), epsilon = 1e-9);
    }
}
