use nalgebra::{UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.81;

/// Gyro rates are in revolutions per minute.
pub const RPM_TO_RAD_S: f64 = std::f64::consts::TAU / 60.0;

// ---------------------------------------------------------------------------
// Rigid body state
// ---------------------------------------------------------------------------

/// Translational and rotational state of the simulated grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub time: f64,
    pub position: Vector3<f64>,          // m, world
    pub velocity: Vector3<f64>,          // m/s, world
    pub attitude: UnitQuaternion<f64>,   // grid -> world
    pub angular_velocity: Vector3<f64>,  // rad/s, grid frame
}

impl Default for Body {
    fn default() -> Self {
        Self {
            time: 0.0,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl Body {
    /// Euler step of the translational state, used for RK4 stages.
    pub fn apply(&self, d: &Deriv, dt: f64) -> Body {
        Body {
            time: self.time + dt,
            position: self.position + d.dpos * dt,
            velocity: self.velocity + d.dvel * dt,
            attitude: self.attitude,
            angular_velocity: self.angular_velocity,
        }
    }

    /// Grid-frame direction expressed in the world.
    pub fn to_world(&self, grid: &Vector3<f64>) -> Vector3<f64> {
        self.attitude * grid
    }

    /// Advance attitude by the current angular velocity (grid frame).
    pub fn rotate(&mut self, dt: f64) {
        let increment = UnitQuaternion::from_scaled_axis(self.angular_velocity * dt);
        self.attitude = UnitQuaternion::new_normalize(*(self.attitude * increment).quaternion());
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// Translational state derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deriv {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// Gravity
// ---------------------------------------------------------------------------

/// Natural gravity model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GravityField {
    Space,
    /// Constant acceleration everywhere.
    Uniform(Vector3<f64>),
    /// Inverse-square well that vanishes above `limit_altitude`.
    Planet {
        center: Vector3<f64>,
        radius: f64,
        surface_gravity: f64,
        limit_altitude: f64,
    },
}

impl GravityField {
    /// Downward surface gravity of a flat world.
    pub fn surface() -> Self {
        GravityField::Uniform(Vector3::new(0.0, -G0, 0.0))
    }

    /// Gravity acceleration at `position`, `None` where there is none.
    pub fn at(&self, position: &Vector3<f64>) -> Option<Vector3<f64>> {
        match *self {
            GravityField::Space => None,
            GravityField::Uniform(g) => Some(g),
            GravityField::Planet { center, radius, surface_gravity, limit_altitude } => {
                let offset = position - center;
                let r = offset.norm();
                if r < 1.0 || r - radius > limit_altitude {
                    return None;
                }
                let g = surface_gravity * (radius / r.max(radius)).powi(2);
                Some(-offset / r * g)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Propulsion model
// ---------------------------------------------------------------------------

/// Thruster layout and the pilot's implicit behaviour.
///
/// In gravity the main thrusters hold altitude: thrust along
/// `lift_axis` cancels gravity and damps vertical speed with
/// `vertical_gain`. Away from gravity, engaged dampeners decelerate the grid
/// using `brake_axis`, scaled by how closely it points retrograde.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propulsion {
    pub lift_axis: Vector3<f64>,  // grid frame
    pub brake_axis: Vector3<f64>, // grid frame
    pub max_accel: f64,           // m/s^2
    pub vertical_gain: f64,       // 1/s
    pub dampener_accel: f64,      // m/s^2
}

impl Default for Propulsion {
    fn default() -> Self {
        Self {
            lift_axis: Vector3::y(),
            brake_axis: -Vector3::z(),
            max_accel: 30.0,
            vertical_gain: 0.5,
            dampener_accel: 5.0,
        }
    }
}

/// Below this lift-axis elevation (cosine) the thrusters give up holding
/// altitude.
const MIN_LIFT_COS: f64 = 0.2;

/// Speed under which dampener deceleration fades out linearly, m/s.
const DAMPENER_FADE: f64 = 1.0;

impl Propulsion {
    pub fn thrust(&self, body: &Body, gravity: Option<Vector3<f64>>, dampeners: bool) -> Vector3<f64> {
        match gravity {
            Some(g) => {
                let strength = g.norm();
                if strength <= 0.0 {
                    return Vector3::zeros();
                }
                let up = -g / strength;
                let axis = body.to_world(&self.lift_axis);
                let cos = axis.dot(&up);
                if cos < MIN_LIFT_COS {
                    return Vector3::zeros();
                }
                let vertical = body.velocity.dot(&up);
                let magnitude = ((strength - self.vertical_gain * vertical) / cos).clamp(0.0, self.max_accel);
                axis * magnitude
            }
            None if dampeners => {
                let speed = body.speed();
                if speed <= 0.0 {
                    return Vector3::zeros();
                }
                let retrograde = -body.velocity / speed;
                let alignment = body.to_world(&self.brake_axis).dot(&retrograde).max(0.0);
                retrograde * self.dampener_accel * alignment * (speed / DAMPENER_FADE).min(1.0)
            }
            None => Vector3::zeros(),
        }
    }
}

/// Translational derivative: gravity plus thrust.
pub fn derivatives(body: &Body, field: &GravityField, propulsion: &Propulsion, dampeners: bool) -> Deriv {
    let gravity = field.at(&body.position);
    let accel = gravity.unwrap_or_else(Vector3::zeros) + propulsion.thrust(body, gravity, dampeners);
    Deriv { dpos: body.velocity, dvel: accel }
}
