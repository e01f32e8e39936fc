use eframe::egui;
use egui_plot::{Legend, Line, Plot};

use flight_assist::sim::{presets, simulate, Flight, Telemetry};
use flight_assist::FlightConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "hover_stop".into());
    let scenario = presets::by_name(&name).unwrap_or_else(presets::hover_stop);
    let config = FlightConfig { gyro_count: 3, ..Default::default() };
    let flight = match simulate(&scenario, &config) {
        Ok(flight) => flight,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let app = FlightViz { flight };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Flight Assist", options, Box::new(|_| Ok(Box::new(app))))
}

struct FlightViz {
    flight: Flight,
}

fn series(rows: &[&Telemetry], f: impl Fn(&Telemetry) -> f64) -> Vec<[f64; 2]> {
    rows.iter().map(|t| [t.time, f(*t)]).collect()
}

impl eframe::App for FlightViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let telemetry = &self.flight.telemetry;
        let step = (telemetry.len() / 2000).max(1);
        let sampled: Vec<&Telemetry> = telemetry.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Scenario: {}", self.flight.scenario));
            let max_v = telemetry.iter().map(|t| t.true_speed).fold(0.0_f64, f64::max);
            ui.label(format!(
                "Max speed: {:.1} m/s  |  Final speed: {:.2} m/s  |  Final mode: {}  |  Events: {}  |  Flight: {:.0} s",
                max_v,
                telemetry.last().map_or(0.0, |t| t.true_speed),
                self.flight.final_mode,
                self.flight.events.len(),
                telemetry.last().map_or(0.0, |t| t.time),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Speed vs Time
                ui.vertical(|ui| {
                    ui.label("Speed (m/s)");
                    Plot::new("speed")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("True", series(&sampled, |t| t.true_speed)));
                            plot_ui.line(Line::new("Estimated", series(&sampled, |t| t.speed)));
                        });
                });

                // Pitch angle vs Time
                ui.vertical(|ui| {
                    ui.label("Pitch (deg)");
                    Plot::new("pitch")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Pitch", series(&sampled, |t| t.pitch)));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Roll angle vs Time
                ui.vertical(|ui| {
                    ui.label("Roll (deg)");
                    Plot::new("roll")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Roll", series(&sampled, |t| t.roll)));
                        });
                });

                // Commanded rates vs Time
                ui.vertical(|ui| {
                    ui.label("Commanded rate (RPM)");
                    Plot::new("rates")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Pitch", series(&sampled, |t| t.rate_pitch)));
                            plot_ui.line(Line::new("Yaw", series(&sampled, |t| t.rate_yaw)));
                            plot_ui.line(Line::new("Roll", series(&sampled, |t| t.rate_roll)));
                        });
                });
            });
        });
    }
}
