//! Empirical multi-regime distance model.
//!
//! Each regime stores the centroid of its calibration shots and three
//! first-order sensitivities. A prediction is the regime's mean total plus
//! the linear correction for how far the shot sits from that centroid. The
//! expansion is only trusted near the centroid, which is why the speed range
//! is split into regimes rather than fitted with one global line.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, FlightError, Result};
use crate::regime::Regime;
use crate::shot::ShotMeasurement;

/// Centroid and sensitivities for one regime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeCoefficients {
    pub avg_speed: f64,
    pub avg_vla: f64,
    pub avg_spin: f64,
    pub avg_total: f64,
    /// yards per mph
    pub speed_coeff: f64,
    /// yards per degree
    pub vla_coeff: f64,
    /// yards per rpm
    pub spin_coeff: f64,
}

impl RegimeCoefficients {
    pub fn predict(&self, speed_mph: f64, vla_deg: f64, spin_rpm: f64) -> f64 {
        self.avg_total
            + self.speed_coeff * (speed_mph - self.avg_speed)
            + self.vla_coeff * (vla_deg - self.avg_vla)
            + self.spin_coeff * (spin_rpm - self.avg_spin)
    }

    pub fn is_finite(&self) -> bool {
        [
            self.avg_speed,
            self.avg_vla,
            self.avg_spin,
            self.avg_total,
            self.speed_coeff,
            self.vla_coeff,
            self.spin_coeff,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Coefficients for every regime; one entry per variant by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RegimeTable {
    pub wedge: RegimeCoefficients,
    pub iron: RegimeCoefficients,
    pub power: RegimeCoefficients,
    pub driver_low_vla: RegimeCoefficients,
    pub driver: RegimeCoefficients,
}

impl RegimeTable {
    pub fn get(&self, regime: Regime) -> &RegimeCoefficients {
        match regime {
            Regime::Wedge => &self.wedge,
            Regime::Iron => &self.iron,
            Regime::Power => &self.power,
            Regime::DriverLowVla => &self.driver_low_vla,
            Regime::Driver => &self.driver,
        }
    }

    /// Copy of this table with one regime replaced
    pub fn with(&self, regime: Regime, coefficients: RegimeCoefficients) -> Self {
        let mut table = self.clone();
        let slot = match regime {
            Regime::Wedge => &mut table.wedge,
            Regime::Iron => &mut table.iron,
            Regime::Power => &mut table.power,
            Regime::DriverLowVla => &mut table.driver_low_vla,
            Regime::Driver => &mut table.driver,
        };
        *slot = coefficients;
        table
    }

    pub fn validate(&self) -> Result<()> {
        for regime in Regime::ALL {
            if !self.get(regime).is_finite() {
                return Err(FlightError::invalid_config(format!(
                    "non-finite coefficients for {regime}"
                )));
            }
        }
        Ok(())
    }

    /// Hand-tuned coefficients fitted on 160 combined launch-monitor shots
    pub fn reference() -> Self {
        Self {
            wedge: RegimeCoefficients {
                avg_speed: 53.408,
                avg_vla: 28.524,
                avg_spin: 8091.1,
                avg_total: 64.37,
                speed_coeff: 2.286,
                vla_coeff: 0.352,
                spin_coeff: 0.001092,
            },
            iron: RegimeCoefficients {
                avg_speed: 83.771,
                avg_vla: 19.893,
                avg_spin: 5568.3,
                avg_total: 130.64,
                speed_coeff: 2.668,
                vla_coeff: 1.326,
                spin_coeff: 0.005048,
            },
            power: RegimeCoefficients {
                avg_speed: 121.453,
                avg_vla: 15.437,
                avg_spin: 4568.3,
                avg_total: 214.59,
                speed_coeff: 2.388,
                vla_coeff: 1.761,
                spin_coeff: 0.010370,
            },
            // low-trajectory drivers are strongly VLA sensitive
            driver_low_vla: RegimeCoefficients {
                avg_speed: 156.090,
                avg_vla: 10.175,
                avg_spin: 2784.2,
                avg_total: 256.84,
                speed_coeff: 2.165,
                vla_coeff: 5.044,
                spin_coeff: 0.026762,
            },
            driver: RegimeCoefficients {
                avg_speed: 156.090,
                avg_vla: 15.718,
                avg_spin: 2784.2,
                avg_total: 276.13,
                speed_coeff: 1.985,
                vla_coeff: 2.303,
                spin_coeff: 0.017888,
            },
        }
    }
}

impl Default for RegimeTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Output of the empirical path
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmpiricalPrediction {
    pub regime: Regime,
    pub predicted_total_yd: f64,
}

/// Predict total distance (carry + roll) without simulating the flight
pub fn predict_total(
    table: &RegimeTable,
    speed_mph: f64,
    vla_deg: f64,
    spin_rpm: f64,
) -> Result<EmpiricalPrediction> {
    let speed = ensure_finite("ball_speed", speed_mph)?;
    let vla = ensure_finite("vla", vla_deg)?;
    let spin = ensure_finite("total_spin", spin_rpm)?;
    if speed <= 0.0 {
        return Err(FlightError::InvalidMeasurement {
            field: "ball_speed",
            value: speed,
        });
    }
    if spin < 0.0 {
        return Err(FlightError::InvalidMeasurement {
            field: "total_spin",
            value: spin,
        });
    }

    let regime = Regime::classify(speed, vla);
    let predicted_total_yd = table.get(regime).predict(speed, vla, spin);
    log::debug!("{regime}: {speed:.1} mph, {vla:.1} deg, {spin:.0} rpm -> {predicted_total_yd:.1} yd");

    Ok(EmpiricalPrediction {
        regime,
        predicted_total_yd,
    })
}

/// Empirical prediction for a full launch-monitor measurement
pub fn predict_shot(table: &RegimeTable, shot: &ShotMeasurement) -> Result<EmpiricalPrediction> {
    predict_total(table, shot.ball_speed_mph, shot.vla_deg, shot.total_spin_rpm)
}
