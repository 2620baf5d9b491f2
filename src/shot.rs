//! Shot records flowing in and out of the engine.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, FlightError, Result};

/// One launch-monitor measurement taken at the moment of impact.
///
/// Angles are in degrees. Horizontal launch angle is signed (left negative,
/// right positive); a spin axis of zero is pure backspin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotMeasurement {
    #[serde(rename = "ball_speed")]
    pub ball_speed_mph: f64,
    #[serde(rename = "vla")]
    pub vla_deg: f64,
    #[serde(rename = "hla")]
    pub hla_deg: f64,
    #[serde(rename = "total_spin")]
    pub total_spin_rpm: f64,
    #[serde(rename = "spin_axis")]
    pub spin_axis_deg: f64,
}

impl ShotMeasurement {
    pub fn new(
        ball_speed_mph: f64,
        vla_deg: f64,
        hla_deg: f64,
        total_spin_rpm: f64,
        spin_axis_deg: f64,
    ) -> Self {
        Self {
            ball_speed_mph,
            vla_deg,
            hla_deg,
            total_spin_rpm,
            spin_axis_deg,
        }
    }

    /// Check every field is finite and spin is non-negative.
    ///
    /// Speed is only required to be finite here; the simulator maps a
    /// non-positive speed to a zero-distance flight.
    pub fn validate(&self) -> Result<()> {
        ensure_finite("ball_speed", self.ball_speed_mph)?;
        ensure_finite("vla", self.vla_deg)?;
        ensure_finite("hla", self.hla_deg)?;
        ensure_finite("spin_axis", self.spin_axis_deg)?;
        let spin = ensure_finite("total_spin", self.total_spin_rpm)?;
        if spin < 0.0 {
            return Err(FlightError::InvalidMeasurement {
                field: "total_spin",
                value: spin,
            });
        }
        Ok(())
    }
}

/// A historical shot with its observed total distance (carry + roll).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledShot {
    pub speed_mph: f64,
    pub vla_deg: f64,
    pub spin_rpm: f64,
    /// Ground truth, yards
    pub total_yd: f64,
}

impl LabeledShot {
    pub fn new(speed_mph: f64, vla_deg: f64, spin_rpm: f64, total_yd: f64) -> Self {
        Self {
            speed_mph,
            vla_deg,
            spin_rpm,
            total_yd,
        }
    }
}

/// Result of the simulate-then-calibrate pipeline. Distances in yards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightResult {
    pub raw_carry_yd: f64,
    pub calibrated_carry_yd: f64,
    pub lateral_yd: f64,
    pub apex_m: f64,
    pub flight_time_s: f64,
}

impl FlightResult {
    /// The result for a ball that never left the tee.
    pub fn zero() -> Self {
        Self {
            raw_carry_yd: 0.0,
            calibrated_carry_yd: 0.0,
            lateral_yd: 0.0,
            apex_m: 0.0,
            flight_time_s: 0.0,
        }
    }
}
