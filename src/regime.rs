use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DRIVER_LOW_VLA_MAX_DEG, IRON_MAX_SPEED_MPH, POWER_MAX_SPEED_MPH, WEDGE_MAX_SPEED_MPH,
};

/// Flight regime classification based on ball speed and launch angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    Wedge,
    Iron,
    Power,
    DriverLowVla,
    Driver,
}

impl Regime {
    /// All regimes, in classification priority order
    pub const ALL: [Regime; 5] = [
        Regime::Wedge,
        Regime::Iron,
        Regime::Power,
        Regime::DriverLowVla,
        Regime::Driver,
    ];

    /// Classify a shot. First match wins; each speed boundary belongs to the
    /// faster regime (lower bound inclusive, upper bound exclusive).
    pub fn classify(speed_mph: f64, vla_deg: f64) -> Regime {
        if speed_mph < WEDGE_MAX_SPEED_MPH {
            Regime::Wedge
        } else if speed_mph < IRON_MAX_SPEED_MPH {
            Regime::Iron
        } else if speed_mph < POWER_MAX_SPEED_MPH {
            Regime::Power
        } else if vla_deg < DRIVER_LOW_VLA_MAX_DEG {
            Regime::DriverLowVla
        } else {
            Regime::Driver
        }
    }

    /// Canonical upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            Regime::Wedge => "WEDGE",
            Regime::Iron => "IRON",
            Regime::Power => "POWER",
            Regime::DriverLowVla => "DRIVER_LOW_VLA",
            Regime::Driver => "DRIVER",
        }
    }

    /// Position in [`Regime::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Regime::Wedge => 0,
            Regime::Iron => 1,
            Regime::Power => 2,
            Regime::DriverLowVla => 3,
            Regime::Driver => 4,
        }
    }
}

/// True when a shot sits within tolerance of a classification edge, where a
/// small measurement error would move it to a neighbouring regime.
pub fn near_boundary(speed_mph: f64, vla_deg: f64, speed_tol_mph: f64, vla_tol_deg: f64) -> bool {
    let speed_edges = [WEDGE_MAX_SPEED_MPH, IRON_MAX_SPEED_MPH, POWER_MAX_SPEED_MPH];
    if speed_edges
        .iter()
        .any(|edge| (speed_mph - edge).abs() <= speed_tol_mph)
    {
        return true;
    }
    speed_mph >= POWER_MAX_SPEED_MPH - speed_tol_mph
        && (vla_deg - DRIVER_LOW_VLA_MAX_DEG).abs() <= vla_tol_deg
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "WEDGE" => Ok(Regime::Wedge),
            "IRON" => Ok(Regime::Iron),
            "POWER" => Ok(Regime::Power),
            "DRIVER_LOW_VLA" => Ok(Regime::DriverLowVla),
            "DRIVER" => Ok(Regime::Driver),
            _ => Err(format!("unknown regime: {s}")),
        }
    }
}
