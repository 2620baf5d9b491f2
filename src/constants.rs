/// Physical constants and unit conversions used by the flight model

/// Gravitational acceleration in m/s²
///
/// The flight model uses the rounded value the calibration tables were
/// tuned against, not the ISO standard 9.80665.
pub const G_ACCEL_MPS2: f64 = 9.81;

/// Standard air density at sea level (kg/m³)
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225;

/// Regulation golf ball mass (kg), 1.62 oz
pub const BALL_MASS_KG: f64 = 0.0459;

/// Regulation golf ball radius (m), 1.68 in diameter
pub const BALL_RADIUS_M: f64 = 0.02135;

/// Conversion factor: miles per hour to meters per second
pub const MPH_TO_MPS: f64 = 0.44704;

/// Conversion factor: yards to meters
pub const YARDS_TO_METERS: f64 = 0.9144;

/// Conversion factor: revolutions per minute to radians per second
pub const RPM_TO_RAD_S: f64 = 2.0 * std::f64::consts::PI / 60.0;

/// Drag coefficient of the simplified flight model
///
/// Deliberately small: the speed calibration table absorbs the error of a
/// constant Cd across the full speed range.
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 0.06;

/// Lift coefficient per unit spin ratio (CL = k * S, S = r*omega/v)
pub const DEFAULT_LIFT_FACTOR: f64 = 0.35;

/// Fixed integration step (s)
pub const DEFAULT_TIME_STEP_S: f64 = 0.001;

/// Largest time step the integrator accepts (s)
pub const MAX_TIME_STEP_S: f64 = 0.001;

/// Below this speed (m/s) only gravity is applied
///
/// Keeps the spin ratio r*omega/v finite near the apex of a vertical shot.
pub const MIN_AERO_VELOCITY_MPS: f64 = 0.1;

/// Depth (m, negative) at which a trajectory is declared runaway
pub const GROUND_SAFETY_DEPTH_M: f64 = -10.0;

/// Step bound for a single flight: 1000 s of flight at 1 ms
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

// Calibration correction constants

/// Launch angle (deg) below which the low-angle boost applies
pub const LOW_ANGLE_THRESHOLD_DEG: f64 = 10.0;

/// Boost per degree below the low-angle threshold
pub const LOW_ANGLE_BOOST_PER_DEG: f64 = 0.155;

/// Spin axis magnitude (deg) above which the curved-shot penalty applies
pub const SPIN_AXIS_THRESHOLD_DEG: f64 = 25.0;

/// Degrees of spin axis over the threshold that reach the full penalty
pub const SPIN_AXIS_PENALTY_SPAN_DEG: f64 = 7.5;

/// Maximum fractional carry reduction for strongly curved shots
pub const SPIN_AXIS_PENALTY_CAP: f64 = 0.13;

/// Carry boost per degree of horizontal launch angle
pub const HLA_BOOST_PER_DEG: f64 = 0.01;

/// High-spin penalty: total spin (rpm) above which carry is reduced
pub const HIGH_SPIN_THRESHOLD_RPM: f64 = 3800.0;

/// High-spin penalty: rpm over the threshold that reach the full penalty
pub const HIGH_SPIN_PENALTY_SPAN_RPM: f64 = 400.0;

/// High-spin penalty: maximum fractional reduction
pub const HIGH_SPIN_PENALTY_CAP: f64 = 0.12;

/// High-spin penalty only applies while |HLA| stays below this (deg)
pub const HIGH_SPIN_HLA_LIMIT_DEG: f64 = 15.0;

// Regime boundaries (mph / deg)

pub const WEDGE_MAX_SPEED_MPH: f64 = 65.0;
pub const IRON_MAX_SPEED_MPH: f64 = 100.0;
pub const POWER_MAX_SPEED_MPH: f64 = 140.0;
pub const DRIVER_LOW_VLA_MAX_DEG: f64 = 13.0;

// Coefficient search limits

/// Largest number of candidates on a single coefficient axis
pub const MAX_GRID_POINTS: usize = 10_000;

/// Largest number of (speed, vla, spin) candidates per regime
pub const MAX_GRID_CANDIDATES: usize = 10_000_000;

// Validation pass thresholds

pub const DEFAULT_EMPIRICAL_TOLERANCE_YD: f64 = 7.5;
pub const DEFAULT_PHYSICS_TOLERANCE_PCT: f64 = 10.0;

/// Minimum threshold for preventing division by zero in interpolation
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

/// Convert a distance in meters to yards
#[inline]
pub fn meters_to_yards(meters: f64) -> f64 {
    meters / YARDS_TO_METERS
}
