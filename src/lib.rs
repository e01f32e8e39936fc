pub mod error;
pub mod config;
pub mod math;
pub mod host;
pub mod estimation;
mod gnc_mod;
pub mod actuator;
pub mod modes;
pub mod display;
pub mod assist;
pub mod sim;
pub mod io;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use assist::FlightAssist;
pub use config::FlightConfig;
pub use error::FlightError;

// Everything a host integration usually needs in one import
pub mod prelude {
    pub use crate::assist::FlightAssist;
    pub use crate::config::{ControlLaw, FlightConfig, ThrustOrientation};
    pub use crate::error::FlightError;
    pub use crate::gnc::{ControlTarget, Controller, RateCommand, RateLimits};
    pub use crate::host::{BlockInventory, DisplaySink, Gyro, GyroAxis, Sensor};
    pub use crate::modes::{FlightMode, HoverPolicy};
}
