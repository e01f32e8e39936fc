pub mod frame;
pub mod motion;

pub use frame::{Axes, OrientationFrame};
pub use motion::{
    AttitudeAngles, AttitudeReference, MotionEstimator, MotionState, SpeedComponents,
};
