//! Versioned model configuration.
//!
//! A `ModelConfig` bundles everything either prediction path needs. It is
//! passed by reference into every prediction call and never mutated; the
//! fitter produces a new value with the version bumped.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationTable, CorrectionConstants};
use crate::empirical::RegimeTable;
use crate::error::{FlightError, Result};
use crate::trajectory_solver::SimulatorSettings;

/// Built-in configuration, constructed on first use
pub static DEFAULT_CONFIG: Lazy<ModelConfig> = Lazy::new(ModelConfig::default);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "initial_version")]
    pub version: u32,
    #[serde(default)]
    pub calibration: CalibrationTable,
    #[serde(default)]
    pub corrections: CorrectionConstants,
    #[serde(default)]
    pub simulator: SimulatorSettings,
    #[serde(default)]
    pub regimes: RegimeTable,
}

fn initial_version() -> u32 {
    1
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            version: initial_version(),
            calibration: CalibrationTable::default(),
            corrections: CorrectionConstants::default(),
            simulator: SimulatorSettings::default(),
            regimes: RegimeTable::default(),
        }
    }
}

impl ModelConfig {
    /// Parse and validate a JSON document. Missing sections take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::debug!(
            "loaded model config v{} from {}",
            config.version,
            path.as_ref().display()
        );
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.simulator.validate()?;
        self.regimes.validate()?;

        let c = &self.corrections;
        if !(c.spin_axis_span_deg > 0.0) {
            return Err(FlightError::invalid_config("spin_axis_span_deg must be positive"));
        }
        if let Some(p) = c.high_spin {
            if !(p.span_rpm > 0.0) {
                return Err(FlightError::invalid_config("high_spin.span_rpm must be positive"));
            }
        }
        Ok(())
    }

    /// New configuration carrying the given regime table, version bumped
    pub fn with_regimes(&self, regimes: RegimeTable) -> Self {
        Self {
            version: self.version.saturating_add(1),
            regimes,
            ..self.clone()
        }
    }
}
