use thiserror::Error;

use crate::regime::Regime;

/// Errors produced by the flight model, the fitter and the data edges.
#[derive(Debug, Error)]
pub enum FlightError {
    #[error("invalid measurement: {field} = {value}")]
    InvalidMeasurement { field: &'static str, value: f64 },

    #[error("simulation did not converge after {steps} steps (height {height_m:.2} m)")]
    NotConverged { steps: usize, height_m: f64 },

    #[error("insufficient data for {regime}: {samples} shots, need {required}")]
    InsufficientData {
        regime: Regime,
        samples: usize,
        required: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlightError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Reject NaN and infinities before they reach the arithmetic.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FlightError::InvalidMeasurement { field, value })
    }
}

pub type Result<T> = std::result::Result<T, FlightError>;
