//! Command-line entry point for the golf flight engine

use golf_flight_engine::{predict_flight, ShotMeasurement, DEFAULT_CONFIG};

fn main() {
    println!("Golf Flight Engine v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Ball-flight prediction from launch-monitor measurements.");
    println!("The library is designed to be used as a Rust crate; the");
    println!("`flight-cli` binary exposes simulate, predict, fit and validate.");
    println!();

    // 150 mph driver, 12 deg launch, fading right
    let shot = ShotMeasurement::new(150.0, 12.0, -6.0, 2700.0, 12.0);
    match predict_flight(&DEFAULT_CONFIG, &shot) {
        Ok(result) => println!(
            "Example: {:.0} mph at {:.0} deg carries {:.1} yd ({:.1} yd offline)",
            shot.ball_speed_mph, shot.vla_deg, result.calibrated_carry_yd, result.lateral_yd
        ),
        Err(e) => eprintln!("Example shot failed: {e}"),
    }
    println!();
    println!("Run `flight-cli --help` for usage.");
}
