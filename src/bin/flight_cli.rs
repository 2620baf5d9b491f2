use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;

use golf_flight_engine::constants::{DEFAULT_EMPIRICAL_TOLERANCE_YD, DEFAULT_PHYSICS_TOLERANCE_PCT};
use golf_flight_engine::dataset::write_csv;
use golf_flight_engine::{
    correction_factors, fit_model, load_labeled_shots, load_measurements, load_reference_shots,
    predict_flight, predict_total, reference_flights, validate_empirical, validate_physics,
    ColumnLayout, FitOptions, FitReport, ModelConfig, Regime, RegimeFit, ShotMeasurement,
    ValidationReport, DEFAULT_CONFIG,
};

#[derive(Parser)]
#[command(name = "flight-cli")]
#[command(author = "Golf Flight Engine Team")]
#[command(version)]
#[command(about = "Golf ball-flight prediction from launch-monitor data", long_about = None)]
struct Cli {
    /// Model configuration (JSON); built-in defaults when omitted
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a shot and calibrate its carry
    Simulate {
        /// Ball speed (mph)
        #[arg(short = 's', long, required_unless_present = "input")]
        speed: Option<f64>,

        /// Vertical launch angle (degrees)
        #[arg(short = 'v', long, required_unless_present = "input")]
        vla: Option<f64>,

        /// Horizontal launch angle (degrees, left negative)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        hla: f64,

        /// Total spin (rpm)
        #[arg(short = 'r', long, required_unless_present = "input")]
        spin: Option<f64>,

        /// Spin axis (degrees, 0 = pure backspin)
        #[arg(short = 'a', long, default_value = "0.0", allow_hyphen_values = true)]
        axis: f64,

        /// CSV of measurements (ball_speed,vla,hla,total_spin,spin_axis)
        #[arg(short = 'i', long, conflicts_with_all = ["speed", "vla", "spin"])]
        input: Option<PathBuf>,

        /// Integration time step (seconds, at most 0.001)
        #[arg(long)]
        time_step: Option<f64>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Predict total distance with the empirical regime model
    Predict {
        /// Ball speed (mph)
        #[arg(short = 's', long)]
        speed: f64,

        /// Vertical launch angle (degrees)
        #[arg(short = 'v', long, allow_hyphen_values = true)]
        vla: f64,

        /// Total spin (rpm)
        #[arg(short = 'r', long)]
        spin: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Fit regime coefficients from a launch-monitor export
    Fit {
        /// Labelled shot CSV
        #[arg(short = 'd', long)]
        data: PathBuf,

        /// Write the fitted model configuration here
        #[arg(long)]
        out: Option<PathBuf>,

        /// Regimes with fewer shots keep their current coefficients
        #[arg(long, default_value = "1")]
        min_samples: usize,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Measure model accuracy against known distances
    Validate {
        /// Prediction path to check
        #[arg(short = 'm', long, default_value = "empirical")]
        mode: ValidationMode,

        /// Labelled shot CSV (empirical) or reference CSV with a carry column (physics)
        #[arg(short = 'd', long)]
        data: Option<PathBuf>,

        /// Pass threshold: yards for empirical, percent for physics
        #[arg(short = 't', long)]
        tolerance: Option<f64>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Display model information
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValidationMode {
    Empirical,
    Physics,
}

// Flat so the same row serializes to JSON and CSV
#[derive(Debug, Serialize)]
struct SimulationRow {
    ball_speed_mph: f64,
    vla_deg: f64,
    hla_deg: f64,
    total_spin_rpm: f64,
    spin_axis_deg: f64,
    raw_carry_yd: f64,
    correction: f64,
    calibrated_carry_yd: f64,
    lateral_yd: f64,
    apex_m: f64,
    flight_time_s: f64,
}

#[derive(Debug, Serialize)]
struct PredictionRow {
    regime: Regime,
    speed_mph: f64,
    vla_deg: f64,
    spin_rpm: f64,
    predicted_total_yd: f64,
}

#[derive(Debug, Serialize)]
struct FitRow {
    regime: Regime,
    status: &'static str,
    samples: usize,
    mae_yd: Option<f64>,
    avg_speed: f64,
    avg_vla: f64,
    avg_spin: f64,
    avg_total: f64,
    speed_coeff: f64,
    vla_coeff: f64,
    spin_coeff: f64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {

    let config = match &cli.config {
        Some(path) => ModelConfig::load_json(path)?,
        None => DEFAULT_CONFIG.clone(),
    };

    match cli.command {
        Commands::Simulate {
            speed, vla, hla, spin, axis, input, time_step, output
        } => {
            let mut config = config;
            if let Some(step) = time_step {
                config.simulator.time_step_s = step;
                config.simulator.validate()?;
            }

            let shots = match input {
                Some(path) => load_measurements(path)?,
                None => match (speed, vla, spin) {
                    (Some(speed), Some(vla), Some(spin)) => {
                        vec![ShotMeasurement::new(speed, vla, hla, spin, axis)]
                    }
                    _ => return Err("speed, vla and spin are required without --input".into()),
                },
            };

            let mut rows = Vec::with_capacity(shots.len());
            for shot in shots {
                let result = predict_flight(&config, &shot)?;
                let correction =
                    correction_factors(&config.calibration, &config.corrections, &shot).total();
                rows.push(SimulationRow {
                    ball_speed_mph: shot.ball_speed_mph,
                    vla_deg: shot.vla_deg,
                    hla_deg: shot.hla_deg,
                    total_spin_rpm: shot.total_spin_rpm,
                    spin_axis_deg: shot.spin_axis_deg,
                    raw_carry_yd: result.raw_carry_yd,
                    correction,
                    calibrated_carry_yd: result.calibrated_carry_yd,
                    lateral_yd: result.lateral_yd,
                    apex_m: result.apex_m,
                    flight_time_s: result.flight_time_s,
                });
            }
            display_simulations(&rows, output)?;
        }
        Commands::Predict { speed, vla, spin, output } => {
            let prediction = predict_total(&config.regimes, speed, vla, spin)?;
            let row = PredictionRow {
                regime: prediction.regime,
                speed_mph: speed,
                vla_deg: vla,
                spin_rpm: spin,
                predicted_total_yd: prediction.predicted_total_yd,
            };
            display_prediction(&row, output)?;
        }
        Commands::Fit { data, out, min_samples, output } => {
            let (shots, stats) = load_labeled_shots(&data, &ColumnLayout::default())?;
            if shots.is_empty() {
                return Err(format!("no usable shots in {} ({} rows)", data.display(), stats.rows).into());
            }
            let options = FitOptions {
                min_samples,
                ..FitOptions::default()
            };
            let report = fit_model(&config, &shots, &options)?;
            if let Some(path) = &out {
                report.config.save_json(path)?;
                log::info!("wrote model v{} to {}", report.config.version, path.display());
            }
            display_fit(&report, output)?;
        }
        Commands::Validate { mode, data, tolerance, output } => {
            let report = match mode {
                ValidationMode::Empirical => {
                    let path = data.ok_or("--data is required for empirical validation")?;
                    let (shots, _) = load_labeled_shots(&path, &ColumnLayout::default())?;
                    validate_empirical(
                        &config,
                        &shots,
                        tolerance.unwrap_or(DEFAULT_EMPIRICAL_TOLERANCE_YD),
                    )?
                }
                ValidationMode::Physics => {
                    let shots = match data {
                        Some(path) => load_reference_shots(path)?,
                        None => reference_flights(),
                    };
                    validate_physics(
                        &config,
                        &shots,
                        tolerance.unwrap_or(DEFAULT_PHYSICS_TOLERANCE_PCT),
                    )?
                }
            };
            display_validation(&report, mode, output)?;
        }
        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║      GOLF FLIGHT ENGINE v{:<14}║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Model version:     {:>8}            ║", config.version);
            println!("║ Time step:         {:>8.4} s          ║", config.simulator.time_step_s);
            println!("║ Drag coefficient:  {:>8.3}            ║", config.simulator.drag_coefficient);
            println!("║ Lift factor:       {:>8.3}            ║", config.simulator.lift_factor);
            println!("║ Calibration points:{:>8}            ║", config.calibration.points().len());
            println!("╠════════════════════════════════════════╣");
            println!("║ REGIME          AVG SPEED   AVG TOTAL  ║");
            for regime in Regime::ALL {
                let c = config.regimes.get(regime);
                println!(
                    "║ {:<15} {:>6.1} mph {:>6.1} yd  ║",
                    regime.name(),
                    c.avg_speed,
                    c.avg_total
                );
            }
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

fn display_simulations(rows: &[SimulationRow], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Csv => {
            write_csv(io::stdout().lock(), rows)?;
        }
        OutputFormat::Table => {
            for row in rows {
                println!("╔════════════════════════════════════════╗");
                println!("║           FLIGHT SIMULATION            ║");
                println!("╠════════════════════════════════════════╣");
                println!("║ Ball speed:        {:>8.1} mph        ║", row.ball_speed_mph);
                println!("║ Launch (V/H):      {:>6.1}/{:<6.1} deg   ║", row.vla_deg, row.hla_deg);
                println!("║ Spin / axis:       {:>6.0}/{:<6.1}       ║", row.total_spin_rpm, row.spin_axis_deg);
                println!("╠════════════════════════════════════════╣");
                println!("║ Raw carry:         {:>8.1} yd         ║", row.raw_carry_yd);
                println!("║ Correction:        {:>8.3} x          ║", row.correction);
                println!("║ Carry:             {:>8.1} yd         ║", row.calibrated_carry_yd);
                println!("║ Lateral:           {:>8.1} yd         ║", row.lateral_yd);
                println!("║ Apex:              {:>8.1} m          ║", row.apex_m);
                println!("║ Flight time:       {:>8.2} s          ║", row.flight_time_s);
                println!("╚════════════════════════════════════════╝");
            }
        }
    }
    Ok(())
}

fn display_prediction(row: &PredictionRow, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(row)?);
        }
        OutputFormat::Csv => {
            write_csv(io::stdout().lock(), std::slice::from_ref(row))?;
        }
        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║          EMPIRICAL PREDICTION          ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Regime:            {:<16}    ║", row.regime.name());
            println!("║ Total distance:    {:>8.1} yd         ║", row.predicted_total_yd);
            println!("╚════════════════════════════════════════╝");
        }
    }
    Ok(())
}

fn display_fit(report: &FitReport, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let rows: Vec<FitRow> = report
        .regimes
        .iter()
        .map(|fit| {
            let c = fit.coefficients();
            FitRow {
                regime: fit.regime(),
                status: match fit {
                    RegimeFit::Fitted { .. } => "fitted",
                    RegimeFit::Insufficient { .. } => "fallback",
                },
                samples: fit.samples(),
                mae_yd: fit.mae_yd(),
                avg_speed: c.avg_speed,
                avg_vla: c.avg_vla,
                avg_spin: c.avg_spin,
                avg_total: c.avg_total,
                speed_coeff: c.speed_coeff,
                vla_coeff: c.vla_coeff,
                spin_coeff: c.spin_coeff,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Csv => {
            write_csv(io::stdout().lock(), &rows)?;
        }
        OutputFormat::Table => {
            println!("Fitted model v{}", report.config.version);
            println!(
                "{:<16} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10}",
                "REGIME", "SHOTS", "MAE", "TOTAL", "SPEED", "VLA", "SPIN"
            );
            for row in &rows {
                let mae = row
                    .mae_yd
                    .map(|m| format!("{m:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<16} {:>8} {:>8} {:>8.1} {:>8.2} {:>8.2} {:>10.4}",
                    row.regime.name(),
                    row.samples,
                    mae,
                    row.avg_total,
                    row.speed_coeff,
                    row.vla_coeff,
                    row.spin_coeff
                );
            }
            if !report.boundary_shots.is_empty() {
                println!("{} shots near a regime boundary", report.boundary_shots.len());
            }
        }
    }
    Ok(())
}

fn display_validation(
    report: &ValidationReport,
    mode: ValidationMode,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Csv => {
            write_csv(io::stdout().lock(), &report.shots)?;
        }
        OutputFormat::Table => {
            let label = match mode {
                ValidationMode::Empirical => "total",
                ValidationMode::Physics => "carry",
            };
            println!("{:<16} {:>8} {:>8} {:>8} {:>10}", "REGIME", "SHOTS", "PASSED", "RATE", "MAE (yd)");
            for r in &report.per_regime {
                println!(
                    "{:<16} {:>8} {:>8} {:>7.0}% {:>10.2}",
                    r.regime.name(),
                    r.stats.shots,
                    r.stats.passed,
                    r.stats.pass_rate * 100.0,
                    r.stats.mae_yd
                );
            }
            let o = &report.overall;
            println!(
                "{:<16} {:>8} {:>8} {:>7.0}% {:>10.2}",
                "OVERALL",
                o.shots,
                o.passed,
                o.pass_rate * 100.0,
                o.mae_yd
            );
            for shot in report.failures() {
                println!(
                    "FAIL {:>6.1} mph {:>5.1} deg: {label} {:.1} yd, predicted {:.1} yd ({:+.1}%)",
                    shot.speed_mph, shot.vla_deg, shot.actual_yd, shot.predicted_yd, shot.error_pct
                );
            }
        }
    }
    Ok(())
}
