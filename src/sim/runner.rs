use log::info;
use serde::Serialize;

use crate::assist::FlightAssist;
use crate::config::FlightConfig;
use crate::error::FlightError;
use crate::gnc::{Controller, OrientationController};
use crate::modes::FlightMode;
use super::event::{default_detectors, EventKind, SimEvent};
use super::host::{SimGrid, SimWorld};
use super::scenario::Scenario;

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// One row per control tick: what the controller saw and what it commanded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Telemetry {
    pub tick: u64,
    pub time: f64,
    pub position: [f64; 3],
    /// Estimated speed, m/s.
    pub speed: f64,
    /// Speed of the simulated body, m/s.
    pub true_speed: f64,
    pub world_forward: f64,
    pub world_right: f64,
    pub world_up: f64,
    pub local_forward: f64,
    pub local_right: f64,
    pub local_up: f64,
    pub pitch: f64,
    pub roll: f64,
    pub in_gravity: bool,
    pub mode: String,
    pub dampeners: bool,
    pub gyro_override: bool,
    pub rate_pitch: f64,
    pub rate_yaw: f64,
    pub rate_roll: f64,
}

impl Telemetry {
    fn sample(tick: u64, time: f64, fa: &FlightAssist, world: &SimWorld) -> Self {
        let motion = fa.motion();
        let command = fa.last_command();
        let p = world.body.position;
        Self {
            tick,
            time,
            position: [p.x, p.y, p.z],
            speed: motion.speed,
            true_speed: world.body.speed(),
            world_forward: motion.world_speed.forward,
            world_right: motion.world_speed.right,
            world_up: motion.world_speed.up,
            local_forward: motion.local_speed.forward,
            local_right: motion.local_speed.right,
            local_up: motion.local_speed.up,
            pitch: motion.attitude.pitch,
            roll: motion.attitude.roll,
            in_gravity: world.gravity().is_some(),
            mode: fa.mode().to_string(),
            dampeners: world.dampeners,
            gyro_override: world.any_override(),
            rate_pitch: command.pitch,
            rate_yaw: command.yaw,
            rate_roll: command.roll,
        }
    }
}

/// Outcome of a simulated flight.
#[derive(Debug, Clone)]
pub struct Flight {
    pub scenario: String,
    pub telemetry: Vec<Telemetry>,
    pub events: Vec<SimEvent>,
    /// Text panel contents at the end of the flight.
    pub screen: String,
    pub final_mode: FlightMode,
}

impl Flight {
    pub fn last(&self) -> Option<&Telemetry> {
        self.telemetry.last()
    }

    /// First event matching `predicate`.
    pub fn find_event(&self, predicate: impl Fn(&EventKind) -> bool) -> Option<&SimEvent> {
        self.events.iter().find(|e| predicate(&e.kind))
    }
}

// ---------------------------------------------------------------------------
// Full flight simulation
// ---------------------------------------------------------------------------

/// Fly `scenario` with a custom attitude controller.
///
/// Each tick runs due commands, one controller tick, then one physics step.
pub fn simulate_with(
    scenario: &Scenario,
    config: &FlightConfig,
    controller: Box<dyn Controller>,
) -> Result<Flight, FlightError> {
    let world = scenario.world().shared();
    let mut grid = SimGrid::new(world.clone(), config.sensor_name.clone(), config.display_name.clone());
    let mut fa = FlightAssist::initialize(config.clone(), &mut grid)?.with_controller(controller);

    let dt = config.dt();
    let total_ticks = (scenario.duration * config.tick_rate_hz).round() as u64;

    let mut schedule: Vec<(u64, &str)> = scenario
        .commands
        .iter()
        .map(|c| (((c.time * config.tick_rate_hz).round() as u64).max(1), c.command.as_str()))
        .collect();
    schedule.sort_by_key(|(tick, _)| *tick);
    let mut pending = schedule.into_iter().peekable();

    let mut detectors = default_detectors();
    let mut telemetry = Vec::with_capacity(total_ticks as usize + 1);
    let mut events = Vec::new();

    let mut prev = Telemetry::sample(0, 0.0, &fa, &world.borrow());
    telemetry.push(prev.clone());

    for tick in 1..=total_ticks {
        while let Some((_, command)) = pending.next_if(|(at, _)| *at <= tick) {
            info!("[{}] t={:.2}s > {}", scenario.name, tick as f64 * dt, command);
            fa.run(command);
        }

        fa.run("");
        world.borrow_mut().step(dt);

        let time = tick as f64 * dt;
        let current = Telemetry::sample(tick, time, &fa, &world.borrow());
        for detector in detectors.iter_mut() {
            if let Some(kind) = detector.check(&prev, &current) {
                events.push(SimEvent { tick, time, kind });
            }
        }
        telemetry.push(current.clone());
        prev = current;
    }

    let screen = world.borrow().screen.clone();
    Ok(Flight {
        scenario: scenario.name.clone(),
        telemetry,
        events,
        screen,
        final_mode: fa.mode(),
    })
}

/// Fly `scenario` with the default [`OrientationController`].
pub fn simulate(scenario: &Scenario, config: &FlightConfig) -> Result<Flight, FlightError> {
    simulate_with(scenario, config, Box::new(OrientationController::new(config)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
