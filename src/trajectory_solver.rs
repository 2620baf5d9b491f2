//! Fixed-step flight integrator for a spinning golf ball.
//!
//! Frame: x lateral (right positive), y vertical, z forward, all in meters.
//! Forces are gravity, quadratic drag opposing velocity, and Magnus lift
//! from backspin (vertical) and sidespin (lateral).

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{FlightError, Result};
use crate::shot::ShotMeasurement;
use crate::spin::decompose_spin;

/// Aerodynamic and numerical settings for the integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    pub time_step_s: f64,
    pub drag_coefficient: f64,
    pub lift_factor: f64,
    pub air_density: f64,
    pub ball_mass_kg: f64,
    pub ball_radius_m: f64,
    pub max_steps: usize,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            time_step_s: DEFAULT_TIME_STEP_S,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            lift_factor: DEFAULT_LIFT_FACTOR,
            air_density: AIR_DENSITY_SEA_LEVEL,
            ball_mass_kg: BALL_MASS_KG,
            ball_radius_m: BALL_RADIUS_M,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl SimulatorSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_step_s > 0.0 && self.time_step_s <= MAX_TIME_STEP_S) {
            return Err(FlightError::invalid_config(format!(
                "time step must be in (0, {MAX_TIME_STEP_S}] s, got {}",
                self.time_step_s
            )));
        }
        if !(self.ball_mass_kg > 0.0 && self.ball_radius_m > 0.0) {
            return Err(FlightError::invalid_config("ball mass and radius must be positive"));
        }
        let aero = [self.drag_coefficient, self.lift_factor, self.air_density];
        if aero.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(FlightError::invalid_config(
                "drag, lift and air density must be finite and non-negative",
            ));
        }
        if self.max_steps == 0 {
            return Err(FlightError::invalid_config("max_steps must be positive"));
        }
        Ok(())
    }

    fn cross_section_m2(&self) -> f64 {
        std::f64::consts::PI * self.ball_radius_m * self.ball_radius_m
    }
}

/// Ball state during integration
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySample {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub time_s: f64,
}

impl TrajectorySample {
    /// State at the tee for the given launch conditions
    pub fn launch(shot: &ShotMeasurement) -> Self {
        let speed_mps = shot.ball_speed_mph * MPH_TO_MPS;
        let vla = shot.vla_deg.to_radians();
        let hla = shot.hla_deg.to_radians();
        let horizontal = speed_mps * vla.cos();

        Self {
            position: Vector3::zeros(),
            velocity: Vector3::new(
                horizontal * hla.sin(),  // lateral
                speed_mps * vla.sin(),   // vertical
                horizontal * hla.cos(),  // forward
            ),
            time_s: 0.0,
        }
    }
}

/// Uncalibrated flight outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawFlight {
    pub carry_yd: f64,
    pub lateral_yd: f64,
    /// Signed landing offset, right positive
    pub lateral_offset_m: f64,
    pub apex_m: f64,
    pub flight_time_s: f64,
    pub steps: usize,
}

impl RawFlight {
    fn grounded() -> Self {
        Self {
            carry_yd: 0.0,
            lateral_yd: 0.0,
            lateral_offset_m: 0.0,
            apex_m: 0.0,
            flight_time_s: 0.0,
            steps: 0,
        }
    }
}

// Trajectory solver
pub struct TrajectorySolver {
    shot: ShotMeasurement,
    settings: SimulatorSettings,
}

impl TrajectorySolver {
    pub fn new(shot: ShotMeasurement, settings: SimulatorSettings) -> Self {
        Self { shot, settings }
    }

    pub fn set_time_step(&mut self, step: f64) {
        self.settings.time_step_s = step;
    }

    pub fn set_max_steps(&mut self, steps: usize) {
        self.settings.max_steps = steps;
    }

    /// Integrate from the tee until the ball returns to launch height
    pub fn solve(&self) -> Result<RawFlight> {
        self.shot.validate()?;
        self.settings.validate()?;

        if self.shot.ball_speed_mph <= 0.0 {
            return Ok(RawFlight::grounded());
        }

        let spin = decompose_spin(self.shot.total_spin_rpm, self.shot.spin_axis_deg);
        let backspin = spin.backspin_rad_s();
        let sidespin = spin.sidespin_rad_s();
        let dt = self.settings.time_step_s;

        let mut state = TrajectorySample::launch(&self.shot);
        let mut apex = 0.0_f64;
        let mut steps = 0usize;

        while state.position.y >= 0.0 {
            if steps >= self.settings.max_steps {
                log::warn!("flight still airborne after {steps} steps: {:?}", self.shot);
                return Err(FlightError::NotConverged {
                    steps,
                    height_m: state.position.y,
                });
            }

            let acceleration = self.calculate_acceleration(&state.velocity, backspin, sidespin);

            // Semi-implicit Euler: position advances with the updated velocity
            state.velocity += acceleration * dt;
            state.position += state.velocity * dt;
            state.time_s += dt;
            steps += 1;

            apex = apex.max(state.position.y);

            if state.position.y < GROUND_SAFETY_DEPTH_M {
                log::warn!("flight fell through the depth guard: {:?}", self.shot);
                return Err(FlightError::NotConverged {
                    steps,
                    height_m: state.position.y,
                });
            }
        }

        let carry_m = state.position.x.hypot(state.position.z);
        let flight = RawFlight {
            carry_yd: meters_to_yards(carry_m),
            lateral_yd: meters_to_yards(state.position.x.abs()),
            lateral_offset_m: state.position.x,
            apex_m: apex,
            flight_time_s: state.time_s,
            steps,
        };

        log::debug!(
            "raw flight: {:.1} yd carry, {:.1} yd lateral, apex {:.1} m, {:.2} s",
            flight.carry_yd,
            flight.lateral_yd,
            flight.apex_m,
            flight.flight_time_s
        );

        Ok(flight)
    }

    fn calculate_acceleration(
        &self,
        velocity: &Vector3<f64>,
        backspin_rad_s: f64,
        sidespin_rad_s: f64,
    ) -> Vector3<f64> {
        let gravity = Vector3::new(0.0, -G_ACCEL_MPS2, 0.0);

        let speed = velocity.norm();
        if speed <= MIN_AERO_VELOCITY_MPS {
            return gravity;
        }

        let s = &self.settings;
        // dynamic pressure * area / mass
        let q_per_mass = 0.5 * s.air_density * speed * speed * s.cross_section_m2() / s.ball_mass_kg;

        // Drag acts opposite to velocity
        let drag = -velocity.normalize() * (s.drag_coefficient * q_per_mass);

        let lift_coeff = s.lift_factor * (s.ball_radius_m * backspin_rad_s / speed);
        let side_coeff = s.lift_factor * (s.ball_radius_m * sidespin_rad_s / speed);
        let magnus = Vector3::new(side_coeff * q_per_mass, lift_coeff * q_per_mass, 0.0);

        drag + magnus + gravity
    }
}

/// Simulate a shot with the given settings
pub fn simulate(shot: &ShotMeasurement, settings: &SimulatorSettings) -> Result<RawFlight> {
    TrajectorySolver::new(*shot, *settings).solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(speed: f64, vla: f64, hla: f64, spin: f64, axis: f64) -> ShotMeasurement {
        ShotMeasurement::new(speed, vla, hla, spin, axis)
    }

    #[test]
    fn test_non_positive_speed_returns_zero_without_integrating() {
        for speed in [0.0, -0.0, -25.0] {
            let flight = simulate(&shot(speed, 20.0, 0.0, 3000.0, 0.0), &SimulatorSettings::default()).unwrap();
            assert_eq!(flight.carry_yd, 0.0);
            assert_eq!(flight.lateral_yd, 0.0);
            assert_eq!(flight.steps, 0);
        }
    }

    #[test]
    fn test_nan_input_is_rejected() {
        let result = simulate(&shot(f64::NAN, 20.0, 0.0, 3000.0, 0.0), &SimulatorSettings::default());
        assert!(matches!(result, Err(FlightError::InvalidMeasurement { field: "ball_speed", .. })));

        let result = simulate(&shot(100.0, 20.0, 0.0, 3000.0, f64::INFINITY), &SimulatorSettings::default());
        assert!(matches!(result, Err(FlightError::InvalidMeasurement { field: "spin_axis", .. })));
    }

    #[test]
    fn test_launch_velocity_components() {
        let state = TrajectorySample::launch(&shot(100.0, 30.0, 10.0, 0.0, 0.0));
        let v = 100.0 * MPH_TO_MPS;
        assert!((state.velocity.norm() - v).abs() < 1e-9);
        assert!((state.velocity.y - v * 0.5).abs() < 1e-9);
        assert!(state.velocity.x > 0.0);
        assert!(state.velocity.z > state.velocity.x);
    }

    #[test]
    fn test_reference_driver_raw_carry() {
        let flight = simulate(&shot(150.0, 12.0, -6.0, 2700.0, 12.0), &SimulatorSettings::default()).unwrap();
        assert!((flight.carry_yd - 227.8).abs() < 1.0, "carry {}", flight.carry_yd);
        assert!((flight.lateral_yd - 20.5).abs() < 1.0, "lateral {}", flight.lateral_yd);
        assert!(flight.apex_m > 0.0);
        assert!((flight.flight_time_s - flight.steps as f64 * 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let s = shot(112.3, 17.1, 2.2, 4200.0, -7.5);
        let a = simulate(&s, &SimulatorSettings::default()).unwrap();
        let b = simulate(&s, &SimulatorSettings::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_backspin_adds_carry() {
        let settings = SimulatorSettings::default();
        let no_spin = simulate(&shot(120.0, 14.0, 0.0, 0.0, 0.0), &settings).unwrap();
        let spin = simulate(&shot(120.0, 14.0, 0.0, 3000.0, 0.0), &settings).unwrap();
        assert!(spin.carry_yd > no_spin.carry_yd);
        assert!(spin.apex_m > no_spin.apex_m);
    }

    #[test]
    fn test_sidespin_direction() {
        let settings = SimulatorSettings::default();
        let fade = simulate(&shot(120.0, 14.0, 0.0, 3000.0, 15.0), &settings).unwrap();
        let draw = simulate(&shot(120.0, 14.0, 0.0, 3000.0, -15.0), &settings).unwrap();
        assert!(fade.lateral_offset_m > 0.0);
        assert!(draw.lateral_offset_m < 0.0);
        assert!((fade.lateral_offset_m + draw.lateral_offset_m).abs() < 1e-9);
        assert!((fade.carry_yd - draw.carry_yd).abs() < 1e-9);
    }

    #[test]
    fn test_negative_launch_angle_lands_immediately() {
        let flight = simulate(&shot(80.0, -5.0, 0.0, 2000.0, 0.0), &SimulatorSettings::default()).unwrap();
        assert_eq!(flight.steps, 1);
        assert!(flight.carry_yd < 0.1);
    }

    #[test]
    fn test_step_bound_reports_not_converged() {
        let mut solver = TrajectorySolver::new(shot(150.0, 12.0, 0.0, 2700.0, 0.0), SimulatorSettings::default());
        solver.set_max_steps(100);
        match solver.solve() {
            Err(FlightError::NotConverged { steps, height_m }) => {
                assert_eq!(steps, 100);
                assert!(height_m > 0.0);
            }
            other => panic!("expected NotConverged, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_guard_reports_not_converged() {
        // ~13.4 km/s straight down in vacuum: the first step ends below the guard
        let settings = SimulatorSettings {
            air_density: 0.0,
            ..Default::default()
        };
        match simulate(&shot(30_000.0, -90.0, 0.0, 0.0, 0.0), &settings) {
            Err(FlightError::NotConverged { steps, height_m }) => {
                assert_eq!(steps, 1);
                assert!(height_m < GROUND_SAFETY_DEPTH_M);
            }
            other => panic!("expected NotConverged, got {other:?}"),
        }

        // the same shot a little slower stops above the guard and lands
        let flight = simulate(&shot(20_000.0, -90.0, 0.0, 0.0, 0.0), &settings).unwrap();
        assert_eq!(flight.steps, 1);
    }

    #[test]
    fn test_time_step_validation() {
        let mut solver = TrajectorySolver::new(shot(100.0, 20.0, 0.0, 3000.0, 0.0), SimulatorSettings::default());
        solver.set_time_step(0.01);
        assert!(matches!(solver.solve(), Err(FlightError::InvalidConfig(_))));
        solver.set_time_step(0.0);
        assert!(matches!(solver.solve(), Err(FlightError::InvalidConfig(_))));
        solver.set_time_step(0.0005);
        assert!(solver.solve().is_ok());
    }

    #[test]
    fn test_finer_step_converges() {
        let s = shot(100.0, 18.0, 4.0, 5500.0, 8.0);
        let coarse = simulate(&s, &SimulatorSettings::default()).unwrap();
        let fine = simulate(&s, &SimulatorSettings { time_step_s: 0.0001, ..Default::default() }).unwrap();
        assert!((coarse.carry_yd - fine.carry_yd).abs() / fine.carry_yd < 0.01);
    }
}
