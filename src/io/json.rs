use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::event::SimEvent;
use crate::sim::{Flight, Telemetry};

/// Summary statistics computed from a simulated flight.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub scenario: String,
    pub flight_time_s: f64,
    pub ticks: u64,
    pub final_mode: String,
    pub initial_speed_ms: f64,
    pub final_speed_ms: f64,
    pub max_speed_ms: f64,
    pub max_abs_pitch_deg: f64,
    pub max_abs_roll_deg: f64,
    /// Largest commanded rate on any axis, RPM.
    pub max_rate_rpm: f64,
    /// Share of ticks with the gyros under override.
    pub override_fraction: f64,
    pub events: Vec<SimEvent>,
}

impl FlightSummary {
    /// Compute summary from a flight.
    pub fn from_flight(flight: &Flight) -> Self {
        let rows = &flight.telemetry;

        let overridden = rows.iter().filter(|t| t.gyro_override).count();
        let last = rows.last();

        FlightSummary {
            scenario: flight.scenario.clone(),
            flight_time_s: last.map_or(0.0, |t| t.time),
            ticks: last.map_or(0, |t| t.tick),
            final_mode: flight.final_mode.to_string(),
            initial_speed_ms: rows.first().map_or(0.0, |t| t.true_speed),
            final_speed_ms: last.map_or(0.0, |t| t.true_speed),
            max_speed_ms: peak(rows, |t| t.true_speed),
            max_abs_pitch_deg: peak(rows, |t| t.pitch.abs()),
            max_abs_roll_deg: peak(rows, |t| t.roll.abs()),
            max_rate_rpm: peak(rows, |t| t.rate_pitch.abs().max(t.rate_yaw.abs()).max(t.rate_roll.abs())),
            override_fraction: if rows.is_empty() { 0.0 } else { overridden as f64 / rows.len() as f64 },
            events: flight.events.clone(),
        }
    }
}

fn peak(rows: &[Telemetry], f: impl Fn(&Telemetry) -> f64) -> f64 {
    rows.iter().map(f).fold(0.0_f64, f64::max)
}

/// Write flight summary as JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
