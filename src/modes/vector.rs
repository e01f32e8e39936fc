use log::{info, warn};

use crate::config::FlightConfig;
use crate::display::Horizon;
use crate::gnc::ControlTarget;
use crate::math::angle_between;
use super::{FlightMode, Mode, ModeContext, ModeStep, ModeTransition};

// ---------------------------------------------------------------------------
// Vector assist
// ---------------------------------------------------------------------------

/// Weightless vector flight: retrograde braking and prograde hold, both
/// using the space main thrusters.
#[derive(Debug, Clone)]
pub struct VectorAssist {
    speed_threshold: f64,  // m/s
    angle_tolerance: f64,  // rad
    release_on_alignment: bool,
    horizon: Horizon,
}

impl VectorAssist {
    pub fn new(config: &FlightConfig) -> Self {
        Self {
            speed_threshold: config.brake_speed_threshold,
            angle_tolerance: config.brake_angle_tolerance,
            release_on_alignment: config.release_brake_on_alignment,
            horizon: Horizon::new(config.horizon_height, config.horizon_width),
        }
    }

    fn brake_step(&self, ctx: &ModeContext<'_>) -> ModeStep {
        let motion = ctx.motion;
        if motion.speed < self.speed_threshold {
            info!("brake complete at {:.2} m/s", motion.speed);
            return ModeStep::transition(ModeTransition::to(FlightMode::Disabled));
        }
        let Some(heading) = motion.heading else {
            return ModeStep::idle();
        };

        let retrograde = -heading;
        let error = angle_between(&motion.space_axes.up, &retrograde);
        let mut step = ModeStep::target(ControlTarget::Direction(retrograde));
        if error < self.angle_tolerance {
            if !ctx.dampeners_engaged {
                step.transition = step.transition.with_dampeners(true);
            } else if self.release_on_alignment {
                info!("retrograde reached with dampeners engaged, releasing gyros");
                return ModeStep::transition(ModeTransition::to(FlightMode::Disabled));
            }
        }
        step
    }
}

impl Mode for VectorAssist {
    fn name(&self) -> &'static str {
        "VectorAssist"
    }

    fn owns(&self, mode: &FlightMode) -> bool {
        matches!(mode, FlightMode::Brake { .. } | FlightMode::Prograde)
    }

    fn tick(&mut self, ctx: &ModeContext<'_>) -> ModeStep {
        if !self.owns(&ctx.active) {
            return ModeStep::idle();
        }
        if ctx.motion.in_gravity {
            return ModeStep::transition(ModeTransition::to(FlightMode::Disabled));
        }
        match ctx.active {
            FlightMode::Brake { .. } => self.brake_step(ctx),
            FlightMode::Prograde => match ctx.motion.heading {
                Some(heading) => ModeStep::target(ControlTarget::Direction(heading)),
                None => ModeStep::idle(),
            },
            _ => ModeStep::idle(),
        }
    }

    fn handle_command(&mut self, args: &[&str], ctx: &ModeContext<'_>) -> ModeTransition {
        let Some(command) = args.first() else {
            return ModeTransition::stay();
        };
        if ctx.motion.in_gravity {
            warn!("vector command '{command}' ignored: in gravity");
            return ModeTransition::stay();
        }

        match command.to_ascii_lowercase().as_str() {
            "brake" => match ctx.active {
                FlightMode::Brake { .. } => ModeTransition::to(FlightMode::Disabled),
                _ => {
                    let start_speed = ctx.motion.speed;
                    info!("braking from {start_speed:.1} m/s");
                    let t = ModeTransition::to(FlightMode::Brake { start_speed });
                    // Dampeners fight the turn; they come back on once aligned.
                    if ctx.dampeners_engaged {
                        t.with_dampeners(false)
                    } else {
                        t
                    }
                }
            },
            "prograde" => match ctx.active {
                FlightMode::Prograde => ModeTransition::to(FlightMode::Disabled),
                _ => ModeTransition::to(FlightMode::Prograde),
            },
            other => {
                warn!("unrecognized vector command '{other}'");
                ModeTransition::stay()
            }
        }
    }

    fn status(&self, ctx: &ModeContext<'_>) -> String {
        let start_speed = match ctx.active {
            FlightMode::Brake { start_speed } => Some(start_speed),
            _ => None,
        };
        self.horizon.render(ctx.motion, start_speed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
