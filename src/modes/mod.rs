//! Flight modes: the state machine that decides what the craft should point
//! at on each tick.
//!
//! Exactly one [`FlightMode`] is active at a time. Each assist module
//! implements [`Mode`]; the orchestrator hands every module the current
//! motion snapshot and applies the transitions they return.

pub mod hover;
pub mod vector;

use std::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::estimation::MotionState;
use crate::gnc::ControlTarget;

pub use hover::HoverAssist;
pub use vector::VectorAssist;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Lean policy used while hovering in gravity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum HoverPolicy {
    /// Lean against drift on both axes.
    #[default]
    #[strum(serialize = "hover")]
    Hover,
    /// Hold pitch level, lean against lateral drift only.
    #[strum(serialize = "glide")]
    Glide,
    /// Hold the craft level.
    #[strum(serialize = "freeglide")]
    FreeGlide,
    /// Lean against forward drift, keep the current roll.
    #[strum(serialize = "pitch")]
    PitchOnly,
    /// Lean against lateral drift, keep the current pitch.
    #[strum(serialize = "roll")]
    RollOnly,
    /// Like hover, but hold a forward set-speed instead of zero.
    #[strum(serialize = "cruise")]
    Cruise,
}

/// Active flight mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FlightMode {
    /// Gyros released to the pilot.
    #[default]
    Disabled,
    /// Gravity hover with the given lean policy.
    Hover(HoverPolicy),
    /// Point the space thrusters retrograde until stopped.
    Brake { start_speed: f64 },
    /// Point the space thrusters along the direction of travel.
    Prograde,
    /// Gyros held under override at zero rate, no assist running.
    Manual,
}

impl FlightMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, FlightMode::Disabled)
    }

    /// Modes that only make sense with a gravity reference.
    pub fn needs_gravity(&self) -> bool {
        matches!(self, FlightMode::Hover(_))
    }
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightMode::Disabled => write!(f, "disabled"),
            FlightMode::Hover(policy) => write!(f, "hover/{policy}"),
            FlightMode::Brake { .. } => write!(f, "brake"),
            FlightMode::Prograde => write!(f, "prograde"),
            FlightMode::Manual => write!(f, "manual"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Requested change of mode and/or inertial dampeners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeTransition {
    pub next: Option<FlightMode>,
    /// Desired dampener state; the orchestrator toggles only on mismatch.
    pub dampeners: Option<bool>,
}

impl ModeTransition {
    pub fn stay() -> Self {
        Self::default()
    }

    pub fn to(mode: FlightMode) -> Self {
        Self { next: Some(mode), dampeners: None }
    }

    pub fn with_dampeners(mut self, engaged: bool) -> Self {
        self.dampeners = Some(engaged);
        self
    }

    pub fn is_stay(&self) -> bool {
        self.next.is_none() && self.dampeners.is_none()
    }
}

/// Result of one mode tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeStep {
    pub target: ControlTarget,
    pub transition: ModeTransition,
}

impl ModeStep {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn target(target: ControlTarget) -> Self {
        Self { target, transition: ModeTransition::stay() }
    }

    pub fn transition(transition: ModeTransition) -> Self {
        Self { target: ControlTarget::None, transition }
    }
}

/// Read-only view handed to modes each tick or command.
#[derive(Debug, Clone, Copy)]
pub struct ModeContext<'a> {
    pub motion: &'a MotionState,
    pub active: FlightMode,
    pub dampeners_engaged: bool,
}

// ---------------------------------------------------------------------------
// Mode capability
// ---------------------------------------------------------------------------

/// An assist module owning one or more [`FlightMode`]s.
pub trait Mode {
    /// Module name as shown on the status screen.
    fn name(&self) -> &'static str;

    /// Whether `mode` is one of this module's states.
    fn owns(&self, mode: &FlightMode) -> bool;

    /// Automatic transitions plus, when this module owns the active mode,
    /// the control target for this tick.
    fn tick(&mut self, ctx: &ModeContext<'_>) -> ModeStep;

    /// Apply a subcommand (`args` excludes the module name).
    fn handle_command(&mut self, args: &[&str], ctx: &ModeContext<'_>) -> ModeTransition;

    /// Status page body.
    fn status(&self, ctx: &ModeContext<'_>) -> String;
}
