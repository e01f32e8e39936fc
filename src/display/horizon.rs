use crate::estimation::MotionState;
use crate::math::{acos_deg, asin_deg, equal_with_margin};

// ---------------------------------------------------------------------------
// Artificial horizon
// ---------------------------------------------------------------------------

/// Left margin of every horizon row.
const MARGIN: &str = "       ";

/// Roll (deg) below which the horizon is drawn flat.
const FLAT_ROLL: f64 = 0.01;

/// Fixed-size ASCII horizon.
///
/// In gravity the horizon row follows the nose angle above the horizon and
/// slopes with roll; a `.!` tick on the top row marks lateral drift. Away
/// from gravity there is no horizon and a `+` (or `~` when moving backwards)
/// marks the direction of travel relative to the nose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub height: usize,
    pub width: usize,
}

/// Marker position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    row: i64,
    col: i64,
}

impl Horizon {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Render the grid, followed by a braking bar when `brake_start_speed`
    /// is set.
    pub fn render(&self, motion: &MotionState, brake_start_speed: Option<f64>) -> String {
        let height = self.height as i64;
        let width = self.width as i64;
        let y_center = height / 2;
        let x_center = width / 2;

        let frame = &motion.frame;
        let local = &motion.local_speed;

        // Nose row (gravity) or velocity marker (space).
        let (pitch_row, marker) = match motion.gravity {
            Some(up_g) => {
                let nose = acos_deg(frame.forward().dot(&up_g), 90.0);
                let row = height - (nose / 180.0 * height as f64).floor() as i64 - 1;
                // Drift is undefined at rest.
                let marker = motion.heading.map(|h| {
                    let drift = frame.right().dot(&h);
                    let mut col = (drift * x_center as f64).floor() as i64 + x_center;
                    if local.forward < 0.0 {
                        col = width - col;
                    }
                    Cell { row: 0, col }
                });
                (row, marker)
            }
            None if motion.speed > 0.0 => {
                let row = -((local.up / motion.speed) * y_center as f64).floor() as i64 + y_center;
                let col = ((local.right / motion.speed) * x_center as f64).floor() as i64 + x_center;
                (row, Some(Cell { row, col }))
            }
            None => (y_center, None),
        };

        let (roll, upside_down) = match motion.gravity {
            Some(up_g) => (asin_deg(up_g.dot(&frame.right())), frame.up().dot(&up_g) < 0.0),
            None => (0.0, false),
        };
        let slope = (height as f64 * 2.0 * roll / 90.0).floor();
        let in_gravity = motion.gravity.is_some();
        let travel = if local.forward < 0.0 { "~" } else { "+" };

        let mut out = String::new();
        for y in 0..height {
            out.push_str(MARGIN);
            out.push('|');
            for x in 0..width {
                let horizon_row = if equal_with_margin(roll, 0.0, FLAT_ROLL) {
                    pitch_row as f64
                } else {
                    let row = slope * (x - x_center) as f64 / (width / 2) as f64 + pitch_row as f64;
                    if upside_down {
                        height as f64 - row
                    } else {
                        row
                    }
                };
                let at_marker = marker.is_some_and(|m| m.row == y && m.col == x);

                let glyph = if in_gravity && at_marker {
                    ".!"
                } else if !in_gravity && at_marker {
                    travel
                } else if x == x_center && y == y_center {
                    "  "
                } else if x == x_center - 1 && y == y_center {
                    "<"
                } else if x == x_center + 1 && y == y_center {
                    ">"
                } else if in_gravity && !upside_down && (y as f64) > horizon_row {
                    "="
                } else if in_gravity && upside_down && (y as f64) < horizon_row {
                    "="
                } else {
                    ". "
                };
                out.push_str(glyph);
            }
            out.push_str("|\n");
        }

        if let Some(start) = brake_start_speed {
            out.push_str(&self.braking_bar(motion.speed, start));
        }
        out
    }

    /// Progress bar of the speed shed since braking started.
    pub fn braking_bar(&self, speed: f64, start_speed: f64) -> String {
        let done = if start_speed > 0.0 {
            (1.0 - speed / start_speed).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let filled = (self.width as f64 * done).ceil() as usize;
        let bar: String = (0..self.width).map(|i| if i < filled { '=' } else { '~' }).collect();
        let label = "  Braking In Progress";
        format!(
            "{MARGIN}|{bar}|\n{MARGIN}|{label:<width$}|",
            width = self.width
        )
    }
}
