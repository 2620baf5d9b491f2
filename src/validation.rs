//! Accuracy reports for both prediction paths against labelled data.

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::constants::MIN_DIVISION_THRESHOLD;
use crate::empirical::predict_total;
use crate::error::Result;
use crate::pipeline::predict_flight;
use crate::regime::Regime;
use crate::shot::{LabeledShot, ShotMeasurement};

/// A measured shot with its known carry, for checking the physics path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceShot {
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
    #[serde(rename = "carry")]
    pub expected_carry_yd: f64,
}

impl ReferenceShot {
    pub fn new(shot: ShotMeasurement, expected_carry_yd: f64) -> Self {
        Self {
            ball_speed_mph: shot.ball_speed_mph,
            vla_deg: shot.vla_deg,
            hla_deg: shot.hla_deg,
            total_spin_rpm: shot.total_spin_rpm,
            spin_axis_deg: shot.spin_axis_deg,
            expected_carry_yd,
        }
    }

    pub fn measurement(&self) -> ShotMeasurement {
        ShotMeasurement::new(
            self.ball_speed_mph,
            self.vla_deg,
            self.hla_deg,
            self.total_spin_rpm,
            self.spin_axis_deg,
        )
    }
}

/// Launch-monitor flights with their observed carries: a partial wedge
/// and a driver fading right.
pub fn reference_flights() -> Vec<ReferenceShot> {
    vec![
        ReferenceShot::new(ShotMeasurement::new(60.3, 31.0, 0.6, 4487.0, 2.5), 63.8),
        ReferenceShot::new(ShotMeasurement::new(150.0, 12.0, -6.0, 2700.0, 12.0), 271.2),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShotOutcome {
    pub regime: Regime,
    pub speed_mph: f64,
    pub vla_deg: f64,
    pub spin_rpm: f64,
    pub actual_yd: f64,
    pub predicted_yd: f64,
    /// predicted minus actual
    pub error_yd: f64,
    pub error_pct: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AccuracyStats {
    pub shots: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub mae_yd: f64,
}

impl AccuracyStats {
    fn from_outcomes<'a>(outcomes: impl Iterator<Item = &'a ShotOutcome>) -> Self {
        let (shots, passed, abs_error) = outcomes.fold((0usize, 0usize, 0.0f64), |(n, p, e), o| {
            (n + 1, p + usize::from(o.passed), e + o.error_yd.abs())
        });
        if shots == 0 {
            return Self::default();
        }
        Self {
            shots,
            passed,
            pass_rate: passed as f64 / shots as f64,
            mae_yd: abs_error / shots as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeStats {
    pub regime: Regime,
    #[serde(flatten)]
    pub stats: AccuracyStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Regimes that received at least one shot, in [`Regime::ALL`] order
    pub per_regime: Vec<RegimeStats>,
    pub overall: AccuracyStats,
    pub shots: Vec<ShotOutcome>,
}

impl ValidationReport {
    fn from_outcomes(shots: Vec<ShotOutcome>) -> Self {
        let per_regime = Regime::ALL
            .iter()
            .filter_map(|&regime| {
                let stats = AccuracyStats::from_outcomes(shots.iter().filter(|o| o.regime == regime));
                (stats.shots > 0).then_some(RegimeStats { regime, stats })
            })
            .collect();
        let overall = AccuracyStats::from_outcomes(shots.iter());
        Self {
            per_regime,
            overall,
            shots,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ShotOutcome> {
        self.shots.iter().filter(|o| !o.passed)
    }
}

fn percent_error(error_yd: f64, actual_yd: f64) -> f64 {
    if actual_yd.abs() < MIN_DIVISION_THRESHOLD {
        if error_yd == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        error_yd / actual_yd * 100.0
    }
}

/// Score the empirical model's total-distance predictions.
/// A shot passes when its absolute error is at most `tolerance_yd`.
pub fn validate_empirical(
    config: &ModelConfig,
    shots: &[LabeledShot],
    tolerance_yd: f64,
) -> Result<ValidationReport> {
    let outcomes = shots
        .iter()
        .map(|shot| -> Result<ShotOutcome> {
            let prediction = predict_total(&config.regimes, shot.speed_mph, shot.vla_deg, shot.spin_rpm)?;
            let error_yd = prediction.predicted_total_yd - shot.total_yd;
            Ok(ShotOutcome {
                regime: prediction.regime,
                speed_mph: shot.speed_mph,
                vla_deg: shot.vla_deg,
                spin_rpm: shot.spin_rpm,
                actual_yd: shot.total_yd,
                predicted_yd: prediction.predicted_total_yd,
                error_yd,
                error_pct: percent_error(error_yd, shot.total_yd),
                passed: error_yd.abs() <= tolerance_yd,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let report = ValidationReport::from_outcomes(outcomes);
    log::info!(
        "empirical: {}/{} within {tolerance_yd} yd, MAE {:.2} yd",
        report.overall.passed,
        report.overall.shots,
        report.overall.mae_yd
    );
    Ok(report)
}

/// Score the simulate-then-calibrate carry against known carries.
/// A shot passes when its relative error is at most `tolerance_pct` percent.
pub fn validate_physics(
    config: &ModelConfig,
    reference_shots: &[ReferenceShot],
    tolerance_pct: f64,
) -> Result<ValidationReport> {
    let outcomes = reference_shots
        .iter()
        .map(|reference| -> Result<ShotOutcome> {
            let shot = reference.measurement();
            let flight = predict_flight(config, &shot)?;
            let error_yd = flight.calibrated_carry_yd - reference.expected_carry_yd;
            let error_pct = percent_error(error_yd, reference.expected_carry_yd);
            Ok(ShotOutcome {
                regime: Regime::classify(shot.ball_speed_mph, shot.vla_deg),
                speed_mph: shot.ball_speed_mph,
                vla_deg: shot.vla_deg,
                spin_rpm: shot.total_spin_rpm,
                actual_yd: reference.expected_carry_yd,
                predicted_yd: flight.calibrated_carry_yd,
                error_yd,
                error_pct,
                passed: error_pct.abs() <= tolerance_pct,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let report = ValidationReport::from_outcomes(outcomes);
    log::info!(
        "physics: {}/{} within {tolerance_pct}%, MAE {:.2} yd",
        report.overall.passed,
        report.overall.shots,
        report.overall.mae_yd
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_EMPIRICAL_TOLERANCE_YD, DEFAULT_PHYSICS_TOLERANCE_PCT};
    use crate::error::FlightError;

    #[test]
    fn test_empirical_centroids_all_pass() {
        let config = ModelConfig::default();
        let shots: Vec<LabeledShot> = Regime::ALL
            .iter()
            .map(|&r| {
                let c = config.regimes.get(r);
                LabeledShot::new(c.avg_speed, c.avg_vla, c.avg_spin, c.avg_total)
            })
            .collect();
        let report = validate_empirical(&config, &shots, DEFAULT_EMPIRICAL_TOLERANCE_YD).unwrap();
        assert_eq!(report.overall.shots, 5);
        assert_eq!(report.overall.passed, 5);
        assert_eq!(report.overall.mae_yd, 0.0);
        assert_eq!(report.per_regime.len(), 5);
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_empirical_stats() {
        let config = ModelConfig::default();
        let iron = config.regimes.iron;
        let shots = vec![
            LabeledShot::new(iron.avg_speed, iron.avg_vla, iron.avg_spin, iron.avg_total + 5.0),
            LabeledShot::new(iron.avg_speed, iron.avg_vla, iron.avg_spin, iron.avg_total - 10.0),
        ];
        let report = validate_empirical(&config, &shots, 7.5).unwrap();
        assert_eq!(report.per_regime.len(), 1);
        assert_eq!(report.per_regime[0].regime, Regime::Iron);
        assert_eq!(report.overall.passed, 1);
        assert_eq!(report.overall.pass_rate, 0.5);
        assert!((report.overall.mae_yd - 7.5).abs() < 1e-9);
        assert!((report.shots[0].error_yd + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_empirical_propagates_bad_input() {
        let shots = vec![LabeledShot::new(0.0, 12.0, 3000.0, 100.0)];
        assert!(matches!(
            validate_empirical(&ModelConfig::default(), &shots, 7.5),
            Err(FlightError::InvalidMeasurement { .. })
        ));
    }

    #[test]
    fn test_physics_reference_flights_pass() {
        let report = validate_physics(
            &ModelConfig::default(),
            &reference_flights(),
            DEFAULT_PHYSICS_TOLERANCE_PCT,
        )
        .unwrap();
        assert_eq!(report.overall.shots, 2);
        assert_eq!(report.overall.passed, 2, "{:?}", report.shots);
    }

    #[test]
    fn test_empty_input_gives_empty_report() {
        let report = validate_empirical(&ModelConfig::default(), &[], 7.5).unwrap();
        assert_eq!(report.overall, AccuracyStats::default());
        assert!(report.per_regime.is_empty());
    }

    #[test]
    fn test_percent_error() {
        assert_eq!(percent_error(5.0, 50.0), 10.0);
        assert_eq!(percent_error(0.0, 0.0), 0.0);
        assert!(percent_error(1.0, 0.0).is_infinite());
    }
}
