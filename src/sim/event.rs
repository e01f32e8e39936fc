use serde::Serialize;

use super::runner::Telemetry;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    ModeChange { from: String, to: String },
    GravityTransition { entered: bool },
    DampenersEngaged,
    DampenersReleased,
    Custom { label: String },
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimEvent {
    pub tick: u64,
    pub time: f64,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive telemetry records and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &Telemetry, current: &Telemetry) -> Option<EventKind>;
}

/// Reports every flight-mode change.
pub struct ModeChangeDetector;

impl EventDetector for ModeChangeDetector {
    fn check(&mut self, prev: &Telemetry, current: &Telemetry) -> Option<EventKind> {
        (prev.mode != current.mode).then(|| EventKind::ModeChange {
            from: prev.mode.clone(),
            to: current.mode.clone(),
        })
    }
}

/// Reports entering or leaving natural gravity.
pub struct GravityTransitionDetector;

impl EventDetector for GravityTransitionDetector {
    fn check(&mut self, prev: &Telemetry, current: &Telemetry) -> Option<EventKind> {
        (prev.in_gravity != current.in_gravity)
            .then_some(EventKind::GravityTransition { entered: current.in_gravity })
    }
}

/// Reports dampener toggles.
pub struct DampenerDetector;

impl EventDetector for DampenerDetector {
    fn check(&mut self, prev: &Telemetry, current: &Telemetry) -> Option<EventKind> {
        match (prev.dampeners, current.dampeners) {
            (false, true) => Some(EventKind::DampenersEngaged),
            (true, false) => Some(EventKind::DampenersReleased),
            _ => None,
        }
    }
}

/// Fires once when speed first drops below a threshold.
pub struct SpeedDetector {
    pub threshold: f64,
    fired: bool,
}

impl SpeedDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, fired: false }
    }
}

impl EventDetector for SpeedDetector {
    fn check(&mut self, prev: &Telemetry, current: &Telemetry) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if prev.speed >= self.threshold && current.speed < self.threshold {
            self.fired = true;
            Some(EventKind::Custom { label: format!("Speed below {:.1} m/s", self.threshold) })
        } else {
            None
        }
    }
}

/// Detectors installed by [`super::simulate`].
pub fn default_detectors() -> Vec<Box<dyn EventDetector>> {
    vec![
        Box::new(ModeChangeDetector),
        Box::new(GravityTransitionDetector),
        Box::new(DampenerDetector),
        Box::new(SpeedDetector::new(1.0)),
    ]
}
