//! Multiplicative calibration of the simulator's raw carry.
//!
//! The flight model uses one constant drag coefficient, which is not
//! accurate across the whole speed range. A speed-keyed multiplier table
//! plus a few shape corrections pull the raw carry onto measured data.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{FlightError, Result};
use crate::shot::ShotMeasurement;

/// Speed breakpoints (mph) with their carry multipliers.
///
/// Invariant: at least one entry, speeds finite and strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct CalibrationTable {
    points: Vec<(f64, f64)>,
}

impl CalibrationTable {
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self> {
        if points.is_empty() {
            return Err(FlightError::invalid_config("calibration table is empty"));
        }
        for &(speed, multiplier) in &points {
            if !speed.is_finite() || !multiplier.is_finite() {
                return Err(FlightError::invalid_config(format!(
                    "calibration entry ({speed}, {multiplier}) is not finite"
                )));
            }
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(FlightError::invalid_config(format!(
                "calibration speeds must be strictly increasing ({} then {})",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self { points })
    }

    /// Speed table the reference flights were tuned against
    pub fn reference() -> Self {
        Self {
            points: vec![
                (60.3, 0.794),
                (70.0, 0.721),
                (100.0, 0.847),
                (150.0, 1.191),
                (212.0, 1.305),
            ],
        }
    }

    /// Table re-tuned for FlightScope wedge data (58-70 mph band)
    pub fn wedge_tuned() -> Self {
        Self {
            points: vec![
                (58.0, 1.05),
                (60.0, 1.05),
                (65.0, 1.02),
                (70.0, 0.98),
                (100.0, 0.847),
                (150.0, 1.191),
                (212.0, 1.305),
            ],
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Piecewise-linear multiplier lookup, clamped at both ends
    pub fn multiplier(&self, speed_mph: f64) -> f64 {
        let n = self.points.len();
        let (first_speed, first_mult) = self.points[0];
        let (last_speed, last_mult) = self.points[n - 1];

        if speed_mph <= first_speed {
            return first_mult;
        }
        if speed_mph >= last_speed {
            return last_mult;
        }

        // first breakpoint strictly above speed; 1 <= idx <= n - 1 here
        let idx = self.points.partition_point(|&(s, _)| s <= speed_mph);
        let (x0, y0) = self.points[idx - 1];
        let (x1, y1) = self.points[idx];

        if (x1 - x0).abs() < MIN_DIVISION_THRESHOLD {
            return y0;
        }

        let t = (speed_mph - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }
}

impl TryFrom<Vec<(f64, f64)>> for CalibrationTable {
    type Error = FlightError;

    fn try_from(points: Vec<(f64, f64)>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<CalibrationTable> for Vec<(f64, f64)> {
    fn from(table: CalibrationTable) -> Self {
        table.points
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Carry reduction for very high spin rates on straight-ish shots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighSpinPenalty {
    pub threshold_rpm: f64,
    pub span_rpm: f64,
    pub cap: f64,
    pub hla_limit_deg: f64,
}

impl Default for HighSpinPenalty {
    fn default() -> Self {
        Self {
            threshold_rpm: HIGH_SPIN_THRESHOLD_RPM,
            span_rpm: HIGH_SPIN_PENALTY_SPAN_RPM,
            cap: HIGH_SPIN_PENALTY_CAP,
            hla_limit_deg: HIGH_SPIN_HLA_LIMIT_DEG,
        }
    }
}

/// Tuned constants for the shape corrections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConstants {
    pub low_angle_threshold_deg: f64,
    pub low_angle_boost_per_deg: f64,
    pub spin_axis_threshold_deg: f64,
    pub spin_axis_span_deg: f64,
    pub spin_axis_cap: f64,
    pub hla_boost_per_deg: f64,
    /// Disabled unless configured
    pub high_spin: Option<HighSpinPenalty>,
}

impl Default for CorrectionConstants {
    fn default() -> Self {
        Self {
            low_angle_threshold_deg: LOW_ANGLE_THRESHOLD_DEG,
            low_angle_boost_per_deg: LOW_ANGLE_BOOST_PER_DEG,
            spin_axis_threshold_deg: SPIN_AXIS_THRESHOLD_DEG,
            spin_axis_span_deg: SPIN_AXIS_PENALTY_SPAN_DEG,
            spin_axis_cap: SPIN_AXIS_PENALTY_CAP,
            hla_boost_per_deg: HLA_BOOST_PER_DEG,
            high_spin: None,
        }
    }
}

/// Individual correction factors for one shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrectionBreakdown {
    pub speed: f64,
    pub low_angle: f64,
    pub spin_axis: f64,
    pub lateral: f64,
    pub high_spin: f64,
}

impl CorrectionBreakdown {
    pub fn total(&self) -> f64 {
        self.speed * self.low_angle * self.spin_axis * self.lateral * self.high_spin
    }
}

/// Compute every correction factor from the uncorrected measurement
pub fn correction_factors(
    table: &CalibrationTable,
    constants: &CorrectionConstants,
    shot: &ShotMeasurement,
) -> CorrectionBreakdown {
    let speed = table.multiplier(shot.ball_speed_mph);

    let low_angle = if shot.vla_deg < constants.low_angle_threshold_deg {
        1.0 + (constants.low_angle_threshold_deg - shot.vla_deg) * constants.low_angle_boost_per_deg
    } else {
        1.0
    };

    let abs_axis = shot.spin_axis_deg.abs();
    let spin_axis = if abs_axis > constants.spin_axis_threshold_deg {
        let reduction = (abs_axis - constants.spin_axis_threshold_deg) / constants.spin_axis_span_deg
            * constants.spin_axis_cap;
        1.0 - reduction.min(constants.spin_axis_cap)
    } else {
        1.0
    };

    let abs_hla = shot.hla_deg.abs();
    let lateral = 1.0 + abs_hla * constants.hla_boost_per_deg;

    let high_spin = match constants.high_spin {
        Some(p) if shot.total_spin_rpm > p.threshold_rpm && abs_hla < p.hla_limit_deg => {
            let reduction = (shot.total_spin_rpm - p.threshold_rpm) / p.span_rpm * p.cap;
            1.0 - reduction.min(p.cap)
        }
        _ => 1.0,
    };

    CorrectionBreakdown {
        speed,
        low_angle,
        spin_axis,
        lateral,
        high_spin,
    }
}

/// Scale a raw carry (yards) by the full correction chain
pub fn apply_calibration(
    raw_carry_yd: f64,
    table: &CalibrationTable,
    constants: &CorrectionConstants,
    shot: &ShotMeasurement,
) -> f64 {
    raw_carry_yd * correction_factors(table, constants, shot).total()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(speed: f64, vla: f64, hla: f64, spin: f64, axis: f64) -> ShotMeasurement {
        ShotMeasurement::new(speed, vla, hla, spin, axis)
    }

    #[test]
    fn test_multiplier_exact_at_breakpoints() {
        let table = CalibrationTable::reference();
        for &(speed, mult) in table.points() {
            assert_eq!(table.multiplier(speed), mult);
        }
    }

    #[test]
    fn test_multiplier_clamps_outside_range() {
        let table = CalibrationTable::reference();
        assert_eq!(table.multiplier(10.0), 0.794);
        assert_eq!(table.multiplier(-5.0), 0.794);
        assert_eq!(table.multiplier(300.0), 1.305);
    }

    #[test]
    fn test_multiplier_interpolates() {
        let table = CalibrationTable::reference();
        // halfway between (100, 0.847) and (150, 1.191)
        let mid = table.multiplier(125.0);
        assert!((mid - (0.847 + 1.191) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_is_continuous() {
        let table = CalibrationTable::wedge_tuned();
        let eps = 1e-7;
        for &(speed, mult) in table.points() {
            assert!((table.multiplier(speed - eps) - mult).abs() < 1e-6);
            assert!((table.multiplier(speed + eps) - mult).abs() < 1e-6);
        }
    }

    #[test]
    fn test_single_entry_table() {
        let table = CalibrationTable::new(vec![(100.0, 0.9)]).unwrap();
        assert_eq!(table.multiplier(50.0), 0.9);
        assert_eq!(table.multiplier(100.0), 0.9);
        assert_eq!(table.multiplier(150.0), 0.9);
    }

    #[test]
    fn test_table_validation() {
        assert!(CalibrationTable::new(vec![]).is_err());
        assert!(CalibrationTable::new(vec![(100.0, 1.0), (100.0, 1.1)]).is_err());
        assert!(CalibrationTable::new(vec![(100.0, 1.0), (90.0, 1.1)]).is_err());
        assert!(CalibrationTable::new(vec![(f64::NAN, 1.0)]).is_err());
    }

    #[test]
    fn test_table_deserialization_enforces_invariant() {
        let table: CalibrationTable = serde_json::from_str("[[60.0, 1.0], [100.0, 0.9]]").unwrap();
        assert_eq!(table.points().len(), 2);
        assert!(serde_json::from_str::<CalibrationTable>("[]").is_err());
        assert!(serde_json::from_str::<CalibrationTable>("[[100.0, 1.0], [60.0, 0.9]]").is_err());
    }

    #[test]
    fn test_low_angle_boost() {
        let c = CorrectionConstants::default();
        let t = CalibrationTable::reference();
        let f = correction_factors(&t, &c, &shot(74.0, 8.0, 0.0, 1300.0, 0.0));
        assert!((f.low_angle - (1.0 + 2.0 * 0.155)).abs() < 1e-12);

        let f = correction_factors(&t, &c, &shot(74.0, 10.0, 0.0, 1300.0, 0.0));
        assert_eq!(f.low_angle, 1.0);
    }

    #[test]
    fn test_spin_axis_penalty_is_capped() {
        let c = CorrectionConstants::default();
        let t = CalibrationTable::reference();

        let f = correction_factors(&t, &c, &shot(100.0, 20.0, 0.0, 3000.0, 25.0));
        assert_eq!(f.spin_axis, 1.0);

        // halfway into the span: half the cap
        let f = correction_factors(&t, &c, &shot(100.0, 20.0, 0.0, 3000.0, -28.75));
        assert!((f.spin_axis - (1.0 - 0.065)).abs() < 1e-12);

        let f = correction_factors(&t, &c, &shot(100.0, 20.0, 0.0, 3000.0, 60.0));
        assert!((f.spin_axis - 0.87).abs() < 1e-12);
    }

    #[test]
    fn test_lateral_boost_is_symmetric() {
        let c = CorrectionConstants::default();
        let t = CalibrationTable::reference();
        let left = correction_factors(&t, &c, &shot(100.0, 20.0, -6.0, 3000.0, 0.0));
        let right = correction_factors(&t, &c, &shot(100.0, 20.0, 6.0, 3000.0, 0.0));
        assert_eq!(left.lateral, right.lateral);
        assert!((left.lateral - 1.06).abs() < 1e-12);
    }

    #[test]
    fn test_high_spin_penalty_only_when_enabled() {
        let t = CalibrationTable::reference();
        let s = shot(90.0, 25.0, 3.0, 4000.0, 0.0);

        let f = correction_factors(&t, &CorrectionConstants::default(), &s);
        assert_eq!(f.high_spin, 1.0);

        let c = CorrectionConstants {
            high_spin: Some(HighSpinPenalty::default()),
            ..Default::default()
        };
        let f = correction_factors(&t, &c, &s);
        assert!((f.high_spin - 0.94).abs() < 1e-12);

        // wide shots are exempt
        let f = correction_factors(&t, &c, &shot(90.0, 25.0, 20.0, 4000.0, 0.0));
        assert_eq!(f.high_spin, 1.0);
    }

    #[test]
    fn test_apply_calibration_multiplies_all_factors() {
        let c = CorrectionConstants::default();
        let t = CalibrationTable::reference();
        let s = shot(150.0, 8.0, -6.0, 2700.0, 30.0);
        let f = correction_factors(&t, &c, &s);
        let expected = 200.0 * 1.191 * f.low_angle * f.spin_axis * 1.06;
        assert!((apply_calibration(200.0, &t, &c, &s) - expected).abs() < 1e-9);
    }
}
