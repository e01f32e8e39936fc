use log::error;
use strum::IntoEnumIterator;

use crate::gnc::{RateCommand, RateLimits};
use crate::host::{Gyro, GyroAxis};

// ---------------------------------------------------------------------------
// Actuator driver: the only writer of gyro state
// ---------------------------------------------------------------------------

/// Fans one ship-frame rate command out to every gyro in its own frame.
pub struct ActuatorDriver {
    gyros: Vec<Box<dyn Gyro>>,
    enabled: bool,
}

impl ActuatorDriver {
    pub fn new(gyros: Vec<Box<dyn Gyro>>) -> Self {
        Self { gyros, enabled: false }
    }

    pub fn gyros(&self) -> &[Box<dyn Gyro>] {
        &self.gyros
    }

    pub fn len(&self) -> usize {
        self.gyros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gyros.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Maxima reported by the first gyro.
    pub fn limits(&self) -> RateLimits {
        match self.gyros.first() {
            Some(g) => RateLimits {
                pitch: g.max_rate(GyroAxis::Pitch),
                yaw: g.max_rate(GyroAxis::Yaw),
                roll: g.max_rate(GyroAxis::Roll),
            },
            None => RateLimits::uniform(0.0),
        }
    }

    /// Broadcast override on or off. Rates are zeroed first so a later
    /// re-enable never resumes a stale spin.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for gyro in &mut self.gyros {
            for axis in GyroAxis::iter() {
                gyro.set_axis_rate(axis, 0.0);
            }
            gyro.set_override(enabled);
        }
    }

    /// Write `command` (ship-grid frame) to every gyro. No-op while disabled.
    pub fn apply(&mut self, command: &RateCommand) {
        if !self.enabled {
            return;
        }
        let command = if command.is_finite() {
            *command
        } else {
            error!("non-finite rate command {command:?} intercepted; holding zero rates");
            RateCommand::zero()
        };

        for gyro in &mut self.gyros {
            let local = command.in_local_frame(&gyro.local_orientation());
            for axis in GyroAxis::iter() {
                gyro.set_axis_rate(axis, local.axis(axis));
            }
        }
    }

    /// Rate each gyro is currently commanded with, rotated back into the
    /// ship-grid frame.
    pub fn readback(&self) -> Vec<RateCommand> {
        self.gyros
            .iter()
            .map(|g| {
                RateCommand::new(
                    g.axis_rate(GyroAxis::Pitch),
                    g.axis_rate(GyroAxis::Yaw),
                    g.axis_rate(GyroAxis::Roll),
                )
                .rotated(&g.local_orientation())
            })
            .collect()
    }
}

impl std::fmt::Debug for ActuatorDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorDriver")
            .field("gyros", &self.gyros.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}
