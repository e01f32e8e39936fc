use log::debug;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::estimation::MotionState;
use crate::host::DisplaySink;
use super::format::{section, zero_pad};

// ---------------------------------------------------------------------------
// Printer: paged status output
// ---------------------------------------------------------------------------

/// Status pages in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum Page {
    #[default]
    TransPose,
    HoverAssist,
    VectorAssist,
}

impl Page {
    fn index(self) -> usize {
        Page::iter().position(|p| p == self).unwrap_or(0)
    }

    fn from_index(index: usize) -> Self {
        Page::iter().nth(index).unwrap_or_default()
    }
}

/// Writes one page to the display every `redraw_interval` ticks. Without a
/// sink every call is a no-op.
pub struct Printer {
    sink: Option<Box<dyn DisplaySink>>,
    page: Page,
    ticks: u64,
    redraw_interval: u32,
}

impl Printer {
    pub fn new(sink: Option<Box<dyn DisplaySink>>, redraw_interval: u32) -> Self {
        Self { sink, page: Page::default(), ticks: 0, redraw_interval: redraw_interval.max(1) }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// `next` / `previous`, wrapping. Returns false for anything else.
    pub fn handle_command(&mut self, args: &[&str]) -> bool {
        let count = Page::iter().count();
        let index = self.page.index();
        let next = match args.first().map(|a| a.to_ascii_lowercase()).as_deref() {
            Some("next") => (index + 1) % count,
            Some("previous") => (index + count - 1) % count,
            _ => return false,
        };
        self.page = Page::from_index(next);
        debug!("printer showing {}", self.page);
        true
    }

    /// Count a tick and redraw when due. `body` renders the current page
    /// and is only called on redraw ticks.
    pub fn tick(&mut self, body: impl FnOnce(Page) -> String) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        self.ticks += 1;
        if self.ticks % u64::from(self.redraw_interval) != 0 {
            return false;
        }
        let text = body(self.page);
        sink.write_text(&format!("Flight Assist - Module [{}]", self.page), false);
        sink.write_text(&format!("\n{text}"), true);
        true
    }
}

impl std::fmt::Debug for Printer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Printer")
            .field("sink", &self.sink.is_some())
            .field("page", &self.page)
            .field("ticks", &self.ticks)
            .field("redraw_interval", &self.redraw_interval)
            .finish()
    }
}

/// Body of the TransPose page: raw motion in the sensor frame.
pub fn transpose_status(motion: &MotionState) -> String {
    let local = &motion.local_speed;
    let mut out = section("Velocity");
    out += &format!("\nTotal: {} m/s", zero_pad(motion.speed, 3));
    out += &format!("\n  F/B: {}", zero_pad(local.forward, 3));
    out += &format!("\n  R/L: {}", zero_pad(local.right, 3));
    out += &format!("\n  U/D: {}", zero_pad(local.up, 3));
    out += &format!("\n\n{}", section("Orientation"));
    out += &format!(
        "\nPitch: {}° | Tilt: {}°",
        zero_pad(motion.attitude.pitch, 2),
        zero_pad(motion.attitude.roll, 2)
    );
    out
}
