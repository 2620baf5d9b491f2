//! # Golf Flight Engine
//!
//! Ball-flight prediction from launch-monitor measurements. Two paths are
//! offered: a physics simulation whose raw carry is calibrated against
//! measured data, and a regime-based empirical model predicting total
//! distance directly. Coefficients for the empirical model are fitted
//! offline from labelled shots.

// Re-export the main types and functions
pub use calibration::{
    apply_calibration, correction_factors, CalibrationTable, CorrectionBreakdown,
    CorrectionConstants, HighSpinPenalty,
};
pub use config::{ModelConfig, DEFAULT_CONFIG};
pub use dataset::{load_labeled_shots, load_measurements, load_reference_shots, ColumnLayout, LoadStats};
pub use empirical::{predict_shot, predict_total, EmpiricalPrediction, RegimeCoefficients, RegimeTable};
pub use error::{FlightError, Result};
pub use fitting::{fit_model, fit_regime, CoefficientRange, FitOptions, FitReport, RegimeFit, SearchSpace};
pub use pipeline::predict_flight;
pub use regime::{near_boundary, Regime};
pub use shot::{FlightResult, LabeledShot, ShotMeasurement};
pub use spin::{decompose_spin, SpinComponents};
pub use trajectory_solver::{simulate, RawFlight, SimulatorSettings, TrajectorySolver};
pub use validation::{
    reference_flights, validate_empirical, validate_physics, AccuracyStats, ReferenceShot,
    RegimeStats, ShotOutcome, ValidationReport,
};

// Module declarations
pub mod calibration;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod empirical;
mod error;
pub mod fitting;
mod pipeline;
pub mod regime;
mod shot;
mod spin;
pub mod trajectory_solver;
pub mod validation;
