use super::body::{derivatives, Body, GravityField, Propulsion};

// ---------------------------------------------------------------------------
// RK4 integrator with attitude held over the step
// ---------------------------------------------------------------------------

/// Single RK4 step of the translational state. The angular velocity is
/// set by the gyros for the whole step, so attitude is advanced separately
/// with an exact body-frame increment.
pub fn rk4_step(
    body: &Body,
    field: &GravityField,
    propulsion: &Propulsion,
    dampeners: bool,
    dt: f64,
) -> Body {
    let k1 = derivatives(body, field, propulsion, dampeners);
    let k2 = derivatives(&body.apply(&k1, dt * 0.5), field, propulsion, dampeners);
    let k3 = derivatives(&body.apply(&k2, dt * 0.5), field, propulsion, dampeners);
    let k4 = derivatives(&body.apply(&k3, dt), field, propulsion, dampeners);

    let mut next = Body {
        time: body.time + dt,
        position: body.position + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
        velocity: body.velocity + (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) * (dt / 6.0),
        attitude: body.attitude,
        angular_velocity: body.angular_velocity,
    };
    next.rotate(dt);
    next
}
