use crate::calibration::apply_calibration;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::shot::{FlightResult, ShotMeasurement};
use crate::trajectory_solver::simulate;

/// Physics path: integrate the flight, then calibrate the raw carry.
///
/// A non-positive ball speed yields [`FlightResult::zero`].
pub fn predict_flight(config: &ModelConfig, shot: &ShotMeasurement) -> Result<FlightResult> {
    shot.validate()?;
    if shot.ball_speed_mph <= 0.0 {
        return Ok(FlightResult::zero());
    }

    let raw = simulate(shot, &config.simulator)?;
    let calibrated = apply_calibration(raw.carry_yd, &config.calibration, &config.corrections, shot);

    log::debug!(
        "raw carry {:.1} yd -> calibrated {:.1} yd (lateral {:.1} yd)",
        raw.carry_yd,
        calibrated,
        raw.lateral_yd
    );

    Ok(FlightResult {
        raw_carry_yd: raw.carry_yd,
        calibrated_carry_yd: calibrated,
        lateral_yd: raw.lateral_yd,
        apex_m: raw.apex_m,
        flight_time_s: raw.flight_time_s,
    })
}
