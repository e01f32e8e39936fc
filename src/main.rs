use std::path::PathBuf;

use env_logger::Env;
use log::error;

use flight_assist::io::{write_summary_file, write_telemetry_file, FlightSummary};
use flight_assist::sim::{presets, simulate, Flight, Scenario};
use flight_assist::{FlightConfig, FlightError};

/// Usage: flight-assist [scenario|all] [config.json] [--out DIR]
struct Args {
    scenario: String,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl Args {
    fn parse() -> Result<Self, FlightError> {
        let mut positional = Vec::new();
        let mut out = None;
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            if arg == "--out" {
                let dir = args
                    .next()
                    .ok_or_else(|| FlightError::InvalidConfig("--out needs a directory".into()))?;
                out = Some(PathBuf::from(dir));
            } else {
                positional.push(arg);
            }
        }
        let mut positional = positional.into_iter();
        Ok(Self {
            scenario: positional.next().unwrap_or_else(|| "all".into()),
            config: positional.next().map(PathBuf::from),
            out,
        })
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), FlightError> {
    let args = Args::parse()?;

    let config = match &args.config {
        Some(path) => FlightConfig::from_json_file(path)?,
        None => FlightConfig { gyro_count: 3, ..Default::default() },
    };

    let scenarios: Vec<Scenario> = if args.scenario.eq_ignore_ascii_case("all") {
        presets::all()
    } else {
        let scenario = presets::by_name(&args.scenario).ok_or_else(|| {
            let known: Vec<String> = presets::all().into_iter().map(|s| s.name).collect();
            FlightError::InvalidConfig(format!(
                "unknown scenario '{}' (known: {})",
                args.scenario,
                known.join(", ")
            ))
        })?;
        vec![scenario]
    };

    for scenario in &scenarios {
        let flight = simulate(scenario, &config)?;
        report(scenario, &config, &flight);

        if let Some(dir) = &args.out {
            std::fs::create_dir_all(dir)?;
            write_telemetry_file(dir.join(format!("{}.csv", flight.scenario)), &flight.telemetry)?;
            write_summary_file(
                dir.join(format!("{}.json", flight.scenario)),
                &FlightSummary::from_flight(&flight),
            )?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

fn report(scenario: &Scenario, config: &FlightConfig, flight: &Flight) {
    let summary = FlightSummary::from_flight(flight);

    println!();
    println!("====================================================================");
    println!("  FLIGHT ASSIST SIMULATION - {}", scenario.name);
    println!("====================================================================");
    if !scenario.description.is_empty() {
        println!("  {}", scenario.description);
    }
    println!();

    println!("  Controller");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Law:           {:>16}    Tick rate:    {:>6.0} Hz",
        config.control_law, config.tick_rate_hz
    );
    println!(
        "  Gyros:         {:>16}    Max lean:     {:>6.1} deg",
        config.gyro_count, config.max_pitch
    );
    println!(
        "  Thrust:   {:>10} / {:<8}  Responsive:   {:>6.1}",
        config.gravity_main_thrust, config.space_main_thrust, config.responsiveness
    );
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    if flight.events.is_empty() {
        println!("  (none)");
    }
    for event in &flight.events {
        println!("  t={:>6.2}s  tick {:>5}  {:?}", event.time, event.tick, event.kind);
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Speed:         {:>8.2} -> {:>8.2} m/s   (max {:.2})",
        summary.initial_speed_ms, summary.final_speed_ms, summary.max_speed_ms
    );
    println!(
        "  Max |pitch|:   {:>8.1} deg   Max |roll|:  {:>8.1} deg",
        summary.max_abs_pitch_deg, summary.max_abs_roll_deg
    );
    println!(
        "  Max rate:      {:>8.2} RPM   Override:    {:>7.0} %",
        summary.max_rate_rpm,
        summary.override_fraction * 100.0
    );
    println!("  Final mode:    {:>8}", summary.final_mode);
    println!();

    // -----------------------------------------------------------------------
    // Telemetry table (sampled)
    // -----------------------------------------------------------------------
    println!("  Telemetry");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>8}  {:>8}  {:>8}  {:>14}",
        "t (s)", "v (m/s)", "pitch", "roll", "rate", "mode"
    );
    println!("  {}", "─".repeat(62));

    let sample_interval = (flight.telemetry.len() / 30).max(1);
    for (i, t) in flight.telemetry.iter().enumerate() {
        if i % sample_interval != 0 && i != flight.telemetry.len() - 1 {
            continue;
        }
        let rate = t.rate_pitch.abs().max(t.rate_yaw.abs()).max(t.rate_roll.abs());
        println!(
            "  {:>7.2}  {:>8.2}  {:>8.2}  {:>8.2}  {:>8.3}  {:>14}",
            t.time, t.true_speed, t.pitch, t.roll, rate, t.mode
        );
    }
    println!();

    if !flight.screen.is_empty() {
        println!("  Screen");
        println!("  ──────────────────────────────────────────────────────────────────");
        for line in flight.screen.lines() {
            println!("  {line}");
        }
        println!();
    }

    println!("  Simulation: {} ticks, dt={:.4} s", summary.ticks, config.dt());
    println!("====================================================================");
    println!();
}
