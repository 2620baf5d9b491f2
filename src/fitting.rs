//! Offline coefficient fitting for the empirical model.
//!
//! Shots are partitioned by regime, each regime's centroid is taken from its
//! own data, and the three sensitivities are chosen by exhaustive grid
//! search minimising mean absolute error. Regimes are independent and are
//! fitted in parallel; the search inside one regime is sequential so that
//! ties always resolve to the first candidate in speed, vla, spin order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::constants::{MAX_GRID_CANDIDATES, MAX_GRID_POINTS};
use crate::empirical::RegimeCoefficients;
use crate::error::{ensure_finite, FlightError, Result};
use crate::regime::{near_boundary, Regime};
use crate::shot::LabeledShot;

/// Inclusive grid `min, min + step, ...` up to `max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl CoefficientRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(FlightError::invalid_config(format!("{name} range is not finite")));
        }
        if self.step <= 0.0 {
            return Err(FlightError::invalid_config(format!(
                "{name} step must be positive, got {}",
                self.step
            )));
        }
        if self.min > self.max {
            return Err(FlightError::invalid_config(format!(
                "{name} range is empty ({} > {})",
                self.min, self.max
            )));
        }
        if self.point_count().is_none() {
            return Err(FlightError::invalid_config(format!(
                "{name} grid exceeds {MAX_GRID_POINTS} points (step {})",
                self.step
            )));
        }
        Ok(())
    }

    /// Number of grid points, or `None` when the range is malformed or
    /// holds more than [`MAX_GRID_POINTS`].
    pub fn point_count(&self) -> Option<usize> {
        if !(self.step > 0.0 && self.min <= self.max) {
            return None;
        }
        // tolerance keeps `max` in the grid when (max - min) / step is integral
        let intervals = ((self.max - self.min) / self.step + 1e-9).floor();
        if !intervals.is_finite() || intervals >= MAX_GRID_POINTS as f64 {
            return None;
        }
        Some(intervals as usize + 1)
    }

    /// Grid values. Computed as `min + i * step` so rounding does not
    /// accumulate along the range. Empty when the range does not validate.
    pub fn values(&self) -> Vec<f64> {
        let count = self.point_count().unwrap_or(0);
        (0..count).map(|i| self.min + i as f64 * self.step).collect()
    }
}

/// Candidate sensitivities explored by the fitter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub speed: CoefficientRange,
    pub vla: CoefficientRange,
    pub spin: CoefficientRange,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            speed: CoefficientRange::new(-2.0, 3.0, 0.5),
            vla: CoefficientRange::new(-5.0, 15.0, 1.0),
            spin: CoefficientRange::new(-0.02, 0.02, 0.001),
        }
    }
}

impl SearchSpace {
    pub fn validate(&self) -> Result<()> {
        self.speed.validate("speed")?;
        self.vla.validate("vla")?;
        self.spin.validate("spin")?;

        let candidates = [self.speed, self.vla, self.spin]
            .iter()
            .filter_map(CoefficientRange::point_count)
            .try_fold(1usize, usize::checked_mul);
        match candidates {
            Some(n) if n <= MAX_GRID_CANDIDATES => Ok(()),
            _ => Err(FlightError::invalid_config(format!(
                "search space exceeds {MAX_GRID_CANDIDATES} candidates"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub search: SearchSpace,
    /// Regimes with fewer shots keep their fallback coefficients
    pub min_samples: usize,
    pub boundary_speed_tol_mph: f64,
    pub boundary_vla_tol_deg: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            search: SearchSpace::default(),
            min_samples: 1,
            boundary_speed_tol_mph: 2.0,
            boundary_vla_tol_deg: 1.0,
        }
    }
}

/// Outcome for one regime
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegimeFit {
    Fitted {
        regime: Regime,
        samples: usize,
        mae_yd: f64,
        coefficients: RegimeCoefficients,
    },
    Insufficient {
        regime: Regime,
        samples: usize,
        required: usize,
        fallback: RegimeCoefficients,
    },
}

impl RegimeFit {
    pub fn regime(&self) -> Regime {
        match self {
            RegimeFit::Fitted { regime, .. } | RegimeFit::Insufficient { regime, .. } => *regime,
        }
    }

    pub fn samples(&self) -> usize {
        match self {
            RegimeFit::Fitted { samples, .. } | RegimeFit::Insufficient { samples, .. } => *samples,
        }
    }

    /// Coefficients that end up in the output table
    pub fn coefficients(&self) -> &RegimeCoefficients {
        match self {
            RegimeFit::Fitted { coefficients, .. } => coefficients,
            RegimeFit::Insufficient { fallback, .. } => fallback,
        }
    }

    pub fn mae_yd(&self) -> Option<f64> {
        match self {
            RegimeFit::Fitted { mae_yd, .. } => Some(*mae_yd),
            RegimeFit::Insufficient { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    /// One entry per regime, in [`Regime::ALL`] order
    pub regimes: Vec<RegimeFit>,
    /// Shots close enough to a classification edge to deserve review
    pub boundary_shots: Vec<LabeledShot>,
    pub config: ModelConfig,
}

/// Fit a single regime's coefficients. Returns the coefficients and their MAE.
pub fn fit_regime(
    regime: Regime,
    shots: &[LabeledShot],
    search: &SearchSpace,
) -> Result<(RegimeCoefficients, f64)> {
    if shots.is_empty() {
        return Err(FlightError::InsufficientData {
            regime,
            samples: 0,
            required: 1,
        });
    }
    search.validate()?;

    let n = shots.len() as f64;
    let avg_speed = shots.iter().map(|s| s.speed_mph).sum::<f64>() / n;
    let avg_vla = shots.iter().map(|s| s.vla_deg).sum::<f64>() / n;
    let avg_spin = shots.iter().map(|s| s.spin_rpm).sum::<f64>() / n;
    let avg_total = shots.iter().map(|s| s.total_yd).sum::<f64>() / n;

    // (speed delta, vla delta, spin delta, residual at the centroid)
    let deltas: Vec<(f64, f64, f64, f64)> = shots
        .iter()
        .map(|s| {
            (
                s.speed_mph - avg_speed,
                s.vla_deg - avg_vla,
                s.spin_rpm - avg_spin,
                avg_total - s.total_yd,
            )
        })
        .collect();

    let speed_values = search.speed.values();
    let vla_values = search.vla.values();
    let spin_values = search.spin.values();

    let mut best = (speed_values[0], vla_values[0], spin_values[0]);
    let mut best_mae = f64::INFINITY;

    for &sc in &speed_values {
        for &vc in &vla_values {
            for &pc in &spin_values {
                let total_error: f64 = deltas
                    .iter()
                    .map(|&(ds, dv, dp, base)| (base + sc * ds + vc * dv + pc * dp).abs())
                    .sum();
                let mae = total_error / n;
                if mae < best_mae {
                    best_mae = mae;
                    best = (sc, vc, pc);
                }
            }
        }
    }

    log::debug!(
        "{regime}: speed {:.3}, vla {:.3}, spin {:.5} -> MAE {best_mae:.2} yd",
        best.0,
        best.1,
        best.2
    );

    Ok((
        RegimeCoefficients {
            avg_speed,
            avg_vla,
            avg_spin,
            avg_total,
            speed_coeff: best.0,
            vla_coeff: best.1,
            spin_coeff: best.2,
        },
        best_mae,
    ))
}

fn check_shot(shot: &LabeledShot) -> Result<()> {
    ensure_finite("speed", shot.speed_mph)?;
    ensure_finite("vla", shot.vla_deg)?;
    ensure_finite("spin", shot.spin_rpm)?;
    ensure_finite("total", shot.total_yd)?;
    Ok(())
}

/// Fit every regime against `shots` and return a new configuration.
///
/// `base` supplies the fallback coefficients for regimes without enough data
/// and every non-regime setting of the output config.
pub fn fit_model(base: &ModelConfig, shots: &[LabeledShot], options: &FitOptions) -> Result<FitReport> {
    options.search.validate()?;
    for shot in shots {
        check_shot(shot)?;
    }

    let mut buckets: Vec<Vec<LabeledShot>> = vec![Vec::new(); Regime::ALL.len()];
    for shot in shots {
        buckets[Regime::classify(shot.speed_mph, shot.vla_deg).index()].push(*shot);
    }

    log::info!("fitting {} shots across {} regimes", shots.len(), Regime::ALL.len());

    let required = options.min_samples.max(1);
    let regimes: Vec<RegimeFit> = Regime::ALL
        .par_iter()
        .map(|&regime| -> Result<RegimeFit> {
            let bucket = &buckets[regime.index()];
            let fallback = *base.regimes.get(regime);
            if bucket.len() < required {
                let err = FlightError::InsufficientData {
                    regime,
                    samples: bucket.len(),
                    required,
                };
                log::warn!("{err}; keeping fallback coefficients");
                return Ok(RegimeFit::Insufficient {
                    regime,
                    samples: bucket.len(),
                    required,
                    fallback,
                });
            }
            let (coefficients, mae_yd) = fit_regime(regime, bucket, &options.search)?;
            log::info!("{regime}: {} shots, MAE {mae_yd:.2} yd", bucket.len());
            Ok(RegimeFit::Fitted {
                regime,
                samples: bucket.len(),
                mae_yd,
                coefficients,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let table = regimes
        .iter()
        .fold(base.regimes.clone(), |table, fit| table.with(fit.regime(), *fit.coefficients()));

    let boundary_shots: Vec<LabeledShot> = shots
        .iter()
        .filter(|s| {
            near_boundary(
                s.speed_mph,
                s.vla_deg,
                options.boundary_speed_tol_mph,
                options.boundary_vla_tol_deg,
            )
        })
        .copied()
        .collect();
    if !boundary_shots.is_empty() {
        log::warn!(
            "{} shots lie within {} mph / {} deg of a regime boundary",
            boundary_shots.len(),
            options.boundary_speed_tol_mph,
            options.boundary_vla_tol_deg
        );
    }

    Ok(FitReport {
        regimes,
        boundary_shots,
        config: base.with_regimes(table),
    })
}
