use std::str::FromStr;

use log::{debug, info, warn};
use strum_macros::{Display, EnumString};

use crate::actuator::ActuatorDriver;
use crate::config::FlightConfig;
use crate::display::{transpose_status, Page, Printer};
use crate::error::FlightError;
use crate::estimation::{MotionEstimator, MotionState, OrientationFrame};
use crate::gnc::{ControlTarget, Controller, OrientationController, RateCommand};
use crate::host::{BlockInventory, Sensor};
use crate::modes::{FlightMode, HoverAssist, Mode, ModeContext, ModeTransition, VectorAssist};

// ---------------------------------------------------------------------------
// Command routing
// ---------------------------------------------------------------------------

/// First word of a command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Module {
    #[strum(to_string = "transpose")]
    TransPose,
    #[strum(to_string = "hoverassist", serialize = "hover")]
    HoverAssist,
    #[strum(to_string = "vectorassist", serialize = "vector")]
    VectorAssist,
    #[strum(to_string = "printer", serialize = "screen")]
    Printer,
}

// ---------------------------------------------------------------------------
// Flight assist
// ---------------------------------------------------------------------------

/// The whole controller: one instance per craft, driven by [`run`](Self::run)
/// once per host tick.
///
/// Each tick runs estimator, modes, controller, actuators and printer in
/// that order; later stages only ever see this tick's motion snapshot.
pub struct FlightAssist {
    config: FlightConfig,
    sensor: Box<dyn Sensor>,
    estimator: MotionEstimator,
    controller: Box<dyn Controller>,
    driver: ActuatorDriver,
    hover: HoverAssist,
    vector: VectorAssist,
    printer: Printer,
    mode: FlightMode,
    motion: MotionState,
    target: ControlTarget,
    command: RateCommand, // ship-grid frame
    ticks: u64,
}

impl FlightAssist {
    /// Bind to the host blocks named in `config`.
    ///
    /// Fails when the sensor or enough gyros are missing; a missing display
    /// only disables status output.
    pub fn initialize(
        config: FlightConfig,
        inventory: &mut dyn BlockInventory,
    ) -> Result<Self, FlightError> {
        config.validate()?;

        let sensor = inventory
            .sensor(&config.sensor_name)
            .ok_or_else(|| FlightError::MissingSensor { name: config.sensor_name.clone() })?;

        let mut gyros = inventory.gyros(config.gyro_count);
        if gyros.len() < config.gyro_count {
            return Err(FlightError::MissingGyros {
                expected: config.gyro_count,
                found: gyros.len(),
            });
        }
        gyros.truncate(config.gyro_count);

        let display = match &config.display_name {
            Some(name) => {
                let display = inventory.display(name);
                if display.is_none() {
                    warn!("text panel '{name}' not found; status output disabled");
                }
                display
            }
            None => None,
        };

        let ship_build = sensor.build_orientation();
        let mut driver = ActuatorDriver::new(gyros);
        driver.set_enabled(false);

        let controller = OrientationController::new(&config);
        info!(
            "flight assist bound to '{}' with {} gyro(s), {} law",
            config.sensor_name,
            driver.len(),
            controller.name()
        );

        Ok(Self {
            estimator: MotionEstimator::new(&config, ship_build),
            controller: Box::new(controller),
            hover: HoverAssist::new(&config),
            vector: VectorAssist::new(&config),
            printer: Printer::new(display, config.screen_redraw_interval),
            mode: FlightMode::Disabled,
            motion: MotionState::at_rest(OrientationFrame::new(sensor.world_orientation(), ship_build)),
            target: ControlTarget::None,
            command: RateCommand::zero(),
            ticks: 0,
            sensor,
            driver,
            config,
        })
    }

    /// Replace the attitude controller.
    pub fn with_controller(mut self, controller: Box<dyn Controller>) -> Self {
        info!("controller set to {}", controller.name());
        self.controller = controller;
        self
    }

    // --- Accessors ---

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn mode(&self) -> FlightMode {
        self.mode
    }

    /// Motion snapshot of the latest tick.
    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn target(&self) -> ControlTarget {
        self.target
    }

    /// Rate written to the gyros on the latest tick, ship-grid frame.
    pub fn last_command(&self) -> RateCommand {
        self.command
    }

    pub fn driver(&self) -> &ActuatorDriver {
        &self.driver
    }

    pub fn hover(&self) -> &HoverAssist {
        &self.hover
    }

    pub fn page(&self) -> Page {
        self.printer.page()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn controller_name(&self) -> &str {
        self.controller.name()
    }

    // --- Entry point ---

    /// Empty `arguments` run one control tick; anything else is a command
    /// `<module> <subcommand> [args...]` that takes effect from the next tick.
    pub fn run(&mut self, arguments: &str) {
        let mut words = arguments.split_whitespace();
        let Some(first) = words.next() else {
            self.tick();
            return;
        };
        let args: Vec<&str> = words.collect();

        let module = match Module::from_str(first) {
            Ok(module) => module,
            Err(_) => {
                warn!("unknown module '{first}'");
                return;
            }
        };
        debug!("command {module} {args:?}");

        let ctx = mode_context(&self.motion, self.mode, self.sensor.as_ref());
        let transition = match module {
            Module::HoverAssist => self.hover.handle_command(&args, &ctx),
            Module::VectorAssist => self.vector.handle_command(&args, &ctx),
            Module::Printer => {
                if !self.printer.handle_command(&args) {
                    warn!("unrecognized printer command {args:?}");
                }
                ModeTransition::stay()
            }
            Module::TransPose => self.transpose_command(&args),
        };
        self.apply(transition);
    }

    /// One control tick.
    pub fn tick(&mut self) {
        self.ticks += 1;

        // --- Estimate ---
        let gravity = self.sensor.natural_gravity();
        self.motion = self.estimator.update(
            self.sensor.position(),
            self.sensor.world_orientation(),
            gravity,
        );
        if self.motion.gravity_transitioned {
            debug!(
                "{} gravity at tick {}",
                if self.motion.in_gravity { "entered" } else { "left" },
                self.ticks
            );
        }

        // --- Modes ---
        let ctx = mode_context(&self.motion, self.mode, self.sensor.as_ref());
        let hover_step = self.hover.tick(&ctx);
        self.apply(hover_step.transition);
        let ctx = mode_context(&self.motion, self.mode, self.sensor.as_ref());
        let vector_step = self.vector.tick(&ctx);
        self.apply(vector_step.transition);

        self.target = if self.hover.owns(&self.mode) {
            hover_step.target
        } else if self.vector.owns(&self.mode) {
            vector_step.target
        } else {
            ControlTarget::None
        };

        // --- Control ---
        self.command = if self.driver.is_enabled() {
            let limits = self.driver.limits();
            let local = self.controller.control(&self.target, &self.motion, &limits);
            local.rotated(&self.motion.frame.ship_build)
        } else {
            RateCommand::zero()
        };

        // --- Actuate ---
        self.driver.apply(&self.command);

        // --- Print ---
        let ctx = mode_context(&self.motion, self.mode, self.sensor.as_ref());
        let (hover, vector) = (&self.hover, &self.vector);
        self.printer.tick(|page| match page {
            Page::TransPose => transpose_status(ctx.motion),
            Page::HoverAssist => hover.status(&ctx),
            Page::VectorAssist => vector.status(&ctx),
        });
    }

    /// `transpose togglegyros`: take the gyros under override at zero rate,
    /// or release them whatever mode holds them.
    fn transpose_command(&self, args: &[&str]) -> ModeTransition {
        match args.first() {
            Some(command) if command.eq_ignore_ascii_case("togglegyros") => {
                if self.mode.is_enabled() {
                    ModeTransition::to(FlightMode::Disabled)
                } else {
                    ModeTransition::to(FlightMode::Manual)
                }
            }
            other => {
                warn!("unrecognized transpose command {other:?}");
                ModeTransition::stay()
            }
        }
    }

    fn apply(&mut self, transition: ModeTransition) {
        if let Some(next) = transition.next {
            self.set_mode(next);
        }
        if let Some(engaged) = transition.dampeners {
            if self.sensor.dampeners_engaged() != engaged {
                self.sensor.toggle_dampeners();
                debug!("dampeners {}", if engaged { "engaged" } else { "released" });
            }
        }
    }

    fn set_mode(&mut self, next: FlightMode) {
        if next == self.mode {
            return;
        }
        info!("mode {} -> {}", self.mode, next);
        if next.is_enabled() != self.mode.is_enabled() {
            self.driver.set_enabled(next.is_enabled());
        }
        self.mode = next;
    }
}

fn mode_context<'a>(motion: &'a MotionState, active: FlightMode, sensor: &dyn Sensor) -> ModeContext<'a> {
    ModeContext { motion, active, dampeners_engaged: sensor.dampeners_engaged() }
}

impl std::fmt::Debug for FlightAssist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightAssist")
            .field("mode", &self.mode)
            .field("ticks", &self.ticks)
            .field("controller", &self.controller.name())
            .field("driver", &self.driver)
            .field("printer", &self.printer)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnc::RateLimits;
    use crate::modes::HoverPolicy;
    use crate::sim::body::{Body, GravityField, Propulsion};
    use crate::sim::host::{GyroState, SharedWorld, SimGrid, SimWorld};
    use nalgebra::{Rotation3, Vector3};

    fn world(field: GravityField, velocity: Vector3<f64>, gyros: usize) -> SharedWorld {
        SimWorld {
            body: Body { velocity, ..Default::default() },
            field,
            propulsion: Propulsion::default(),
            sensor_build: Rotation3::identity(),
            dampeners: false,
            gyros: vec![GyroState::new(Rotation3::identity(), 30.0); gyros],
            screen: String::new(),
        }
        .shared()
    }

    fn assist(world: &SharedWorld) -> FlightAssist {
        let mut grid = SimGrid::new(world.clone(), "FA Remote", Some("FA Screen".into()));
        FlightAssist::initialize(FlightConfig::default(), &mut grid).unwrap()
    }

    /// Tick the controller and then the world.
    fn advance(fa: &mut FlightAssist, world: &SharedWorld, ticks: usize) {
        let dt = fa.config().dt();
        for _ in 0..ticks {
            fa.run("");
            world.borrow_mut().step(dt);
        }
    }

    #[test]
    fn missing_sensor_is_fatal() {
        let mut grid = SimGrid::new(world(GravityField::Space, Vector3::zeros(), 1), "Other", None);
        let err = FlightAssist::initialize(FlightConfig::default(), &mut grid).unwrap_err();
        assert!(matches!(err, FlightError::MissingSensor { ref name } if name == "FA Remote"));
    }

    #[test]
    fn too_few_gyros_is_fatal() {
        let mut grid = SimGrid::new(world(GravityField::Space, Vector3::zeros(), 1), "FA Remote", None);
        let cfg = FlightConfig { gyro_count: 3, ..Default::default() };
        let err = FlightAssist::initialize(cfg, &mut grid).unwrap_err();
        assert!(matches!(err, FlightError::MissingGyros { expected: 3, found: 1 }));
    }

    #[test]
    fn invalid_config_is_rejected_before_binding() {
        let mut grid = SimGrid::new(world(GravityField::Space, Vector3::zeros(), 1), "FA Remote", None);
        let cfg = FlightConfig { tick_rate_hz: 0.0, ..Default::default() };
        assert!(matches!(
            FlightAssist::initialize(cfg, &mut grid),
            Err(FlightError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_display_is_not_fatal() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut grid = SimGrid::new(w.clone(), "FA Remote", None);
        let mut fa = FlightAssist::initialize(FlightConfig::default(), &mut grid).unwrap();
        advance(&mut fa, &w, 10);
        assert!(w.borrow().screen.is_empty());
    }

    #[test]
    fn gyros_start_released() {
        let w = world(GravityField::surface(), Vector3::zeros(), 2);
        let mut fa = assist(&w);
        advance(&mut fa, &w, 3);
        assert!(!w.borrow().any_override());
        assert_eq!(fa.mode(), FlightMode::Disabled);
    }

    #[test]
    fn commands_do_not_tick() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut fa = assist(&w);
        advance(&mut fa, &w, 2);
        fa.run("hover toggle");
        assert_eq!(fa.ticks(), 2);
        assert_eq!(fa.mode(), FlightMode::Hover(HoverPolicy::Hover));
        assert!(w.borrow().gyros[0].overridden);
    }

    #[test]
    fn module_names_are_case_insensitive_with_aliases() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut fa = assist(&w);
        advance(&mut fa, &w, 2);
        fa.run("HoverAssist TOGGLE");
        assert!(fa.mode().is_enabled());
        fa.run("hover toggle");
        assert!(!fa.mode().is_enabled());
        fa.run("screen next");
        assert_eq!(fa.page(), Page::HoverAssist);
        fa.run("autopilot engage");
        assert_eq!(fa.mode(), FlightMode::Disabled);
    }

    #[test]
    fn level_hover_at_rest_is_quiet() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut fa = assist(&w);
        advance(&mut fa, &w, 2);
        fa.run("hover toggle");
        advance(&mut fa, &w, 5);
        assert_eq!(fa.motion().attitude.pitch, 0.0);
        assert_eq!(fa.motion().attitude.roll, 0.0);
        assert!(fa.last_command().magnitude() < 1e-9, "{:?}", fa.last_command());
    }

    #[test]
    fn leaving_gravity_releases_gyros() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut fa = assist(&w);
        advance(&mut fa, &w, 2);
        fa.run("hover toggle");
        advance(&mut fa, &w, 2);
        w.borrow_mut().field = GravityField::Space;
        advance(&mut fa, &w, 1);
        assert_eq!(fa.mode(), FlightMode::Disabled);
        assert!(!w.borrow().any_override());
        assert_eq!(w.borrow().gyros[0].rate, RateCommand::zero());
    }

    #[test]
    fn printer_draws_selected_page() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut fa = assist(&w);
        fa.run("printer next");
        advance(&mut fa, &w, 5);
        let screen = w.borrow().screen.clone();
        assert!(screen.starts_with("Flight Assist - Module [HoverAssist]"), "{screen}");
        assert!(screen.contains("Hover State: DISABLED"));
    }

    struct Frozen;

    impl Controller for Frozen {
        fn control(&mut self, _: &ControlTarget, _: &MotionState, _: &RateLimits) -> RateCommand {
            RateCommand::new(1.0, 2.0, 3.0)
        }

        fn name(&self) -> &str {
            "Frozen"
        }
    }

    #[test]
    fn custom_controller_drives_gyros() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut fa = assist(&w).with_controller(Box::new(Frozen));
        assert_eq!(fa.controller_name(), "Frozen");
        advance(&mut fa, &w, 1);
        fa.run("hover toggle");
        fa.run("");
        assert_eq!(w.borrow().gyros[0].rate, RateCommand::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn togglegyros_holds_gyros_at_zero_rate() {
        let w = world(GravityField::Space, Vector3::new(3.0, 0.0, -5.0), 2);
        let mut fa = assist(&w);
        advance(&mut fa, &w, 2);
        fa.run("transpose togglegyros");
        assert_eq!(fa.mode(), FlightMode::Manual);
        advance(&mut fa, &w, 3);
        assert!(w.borrow().gyros.iter().all(|g| g.overridden));
        assert_eq!(w.borrow().gyros[0].rate, RateCommand::zero());

        fa.run("TransPose TOGGLEGYROS");
        assert_eq!(fa.mode(), FlightMode::Disabled);
        assert!(!w.borrow().any_override());
    }

    #[test]
    fn togglegyros_releases_an_active_assist() {
        let w = world(GravityField::surface(), Vector3::zeros(), 1);
        let mut fa = assist(&w);
        advance(&mut fa, &w, 2);
        fa.run("hover toggle");
        fa.run("transpose togglegyros");
        assert_eq!(fa.mode(), FlightMode::Disabled);
        assert!(!w.borrow().any_override());
    }

    #[test]
    fn unknown_transpose_command_keeps_mode() {
        let w = world(GravityField::Space, Vector3::zeros(), 1);
        let mut fa = assist(&w);
        fa.run("transpose spin");
        assert_eq!(fa.mode(), FlightMode::Disabled);
    }
}
