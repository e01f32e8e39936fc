use std::str::FromStr;

use log::{info, warn};

use crate::config::FlightConfig;
use crate::display::format::{section, zero_pad};
use crate::estimation::MotionState;
use crate::gnc::{soft_lean, ControlTarget};
use super::{FlightMode, HoverPolicy, Mode, ModeContext, ModeStep, ModeTransition};

// ---------------------------------------------------------------------------
// Hover assist
// ---------------------------------------------------------------------------

/// m/s^2 per g on the status page.
const STANDARD_GRAVITY: f64 = 9.81;

/// Gravity hover: leans the craft against its drift so the main thrusters
/// bleed off horizontal speed.
#[derive(Debug, Clone)]
pub struct HoverAssist {
    policy: HoverPolicy,
    set_speed: f64, // m/s, cruise only
    responsiveness: f64,
    max_pitch: f64,
    max_roll: f64,
    always_enabled_in_gravity: bool,
}

impl HoverAssist {
    pub fn new(config: &FlightConfig) -> Self {
        Self {
            policy: HoverPolicy::default(),
            set_speed: 0.0,
            responsiveness: config.responsiveness,
            max_pitch: config.max_pitch,
            max_roll: config.max_roll,
            always_enabled_in_gravity: config.always_enabled_in_gravity,
        }
    }

    /// Policy that `toggle` will engage.
    pub fn policy(&self) -> HoverPolicy {
        self.policy
    }

    pub fn set_speed(&self) -> f64 {
        self.set_speed
    }

    /// Target `(pitch, roll)` in degrees for `policy` given the drift in
    /// `motion`.
    pub fn targets(&self, policy: HoverPolicy, motion: &MotionState) -> (f64, f64) {
        let lean_pitch = |v: f64| soft_lean(v, self.responsiveness, self.max_pitch);
        let lean_roll = |v: f64| soft_lean(v, self.responsiveness, self.max_roll);
        let drift = &motion.world_speed;
        let current = &motion.attitude;

        match policy {
            HoverPolicy::Hover => (lean_pitch(drift.forward), lean_roll(drift.right)),
            HoverPolicy::Glide => (0.0, lean_roll(drift.right)),
            HoverPolicy::FreeGlide => (0.0, 0.0),
            HoverPolicy::PitchOnly => (lean_pitch(drift.forward), current.roll),
            HoverPolicy::RollOnly => (current.pitch, lean_roll(drift.right)),
            HoverPolicy::Cruise => (lean_pitch(drift.forward - self.set_speed), lean_roll(drift.right)),
        }
    }

    /// Switch to `policy`, carrying an active hover along with it.
    fn select(&mut self, policy: HoverPolicy, active: FlightMode) -> ModeTransition {
        self.policy = policy;
        info!("hover policy set to {policy}");
        if self.owns(&active) {
            ModeTransition::to(FlightMode::Hover(policy))
        } else {
            ModeTransition::stay()
        }
    }
}

impl Mode for HoverAssist {
    fn name(&self) -> &'static str {
        "HoverAssist"
    }

    fn owns(&self, mode: &FlightMode) -> bool {
        matches!(mode, FlightMode::Hover(_))
    }

    fn tick(&mut self, ctx: &ModeContext<'_>) -> ModeStep {
        let motion = ctx.motion;
        if !motion.in_gravity {
            return if self.owns(&ctx.active) {
                ModeStep::transition(ModeTransition::to(FlightMode::Disabled))
            } else {
                ModeStep::idle()
            };
        }

        let (active, transition) = match ctx.active {
            FlightMode::Disabled if self.always_enabled_in_gravity => {
                let mode = FlightMode::Hover(self.policy);
                (mode, ModeTransition::to(mode))
            }
            mode => (mode, ModeTransition::stay()),
        };

        match active {
            FlightMode::Hover(policy) => {
                let (pitch, roll) = self.targets(policy, motion);
                ModeStep { target: ControlTarget::PitchRoll { pitch, roll }, transition }
            }
            _ => ModeStep::transition(transition),
        }
    }

    fn handle_command(&mut self, args: &[&str], ctx: &ModeContext<'_>) -> ModeTransition {
        let Some(command) = args.first() else {
            return ModeTransition::stay();
        };
        if !ctx.motion.in_gravity {
            warn!("hover command '{command}' ignored: not in gravity");
            return ModeTransition::stay();
        }

        let command = command.to_ascii_lowercase();
        match command.as_str() {
            "toggle" => {
                if self.owns(&ctx.active) {
                    ModeTransition::to(FlightMode::Disabled)
                } else {
                    ModeTransition::to(FlightMode::Hover(self.policy))
                }
            }
            "cruise" => {
                if let Some(raw) = args.get(1) {
                    match raw.parse::<f64>() {
                        Ok(speed) if speed.is_finite() => self.set_speed = speed,
                        _ => {
                            warn!("cruise speed '{raw}' is not a number");
                            return ModeTransition::stay();
                        }
                    }
                }
                self.select(HoverPolicy::Cruise, ctx.active)
            }
            other => match HoverPolicy::from_str(other) {
                Ok(policy) => self.select(policy, ctx.active),
                Err(_) => {
                    warn!("unrecognized hover command '{other}'");
                    ModeTransition::stay()
                }
            },
        }
    }

    fn status(&self, ctx: &ModeContext<'_>) -> String {
        let motion = ctx.motion;
        let state = if self.owns(&ctx.active) { "ENABLED" } else { "DISABLED" };
        let mut out = section("Status");
        out += &format!("\nHover State: {state}");
        out += &format!("\nHover Mode: {}", self.policy.to_string().to_uppercase());
        if self.policy == HoverPolicy::Cruise {
            out += &format!("\nSet Speed: {} m/s", zero_pad(self.set_speed, 3));
        }
        if motion.in_gravity {
            let w = &motion.world_speed;
            out += &format!("\n\n{}", section("Velocity"));
            out += &format!("\nTotal: {} m/s", zero_pad(motion.speed, 3));
            out += &format!("\n  F/B: {}", zero_pad(w.forward, 3));
            out += &format!("\n  R/L: {}", zero_pad(w.right, 3));
            out += &format!("\n  U/D: {}", zero_pad(w.up, 3));
            out += &format!("\n\n{}", section("Orientation"));
            out += &format!(
                "\nPitch: {}° | Roll: {}°",
                zero_pad(motion.attitude.pitch, 2),
                zero_pad(motion.attitude.roll, 2)
            );
            out += &format!("\nGravity: {:.2} g", motion.gravity_strength / STANDARD_GRAVITY);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
