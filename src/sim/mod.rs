//! Offline host: a rigid grid under gravity and thrust, wired to the
//! controller through the host traits.

pub mod body;
pub mod event;
pub mod host;
pub mod integrator;
pub mod runner;
pub mod scenario;

pub use integrator::rk4_step;
pub use runner::{simulate, simulate_with, Flight, Telemetry};
pub use scenario::{presets, Scenario};
