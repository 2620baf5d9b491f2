use crate::constants::RPM_TO_RAD_S;

/// Spin split into the component about the horizontal axis (backspin,
/// lifts the ball) and about the vertical axis (sidespin, curves it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinComponents {
    pub backspin_rpm: f64,
    pub sidespin_rpm: f64,
}

impl SpinComponents {
    pub fn backspin_rad_s(&self) -> f64 {
        self.backspin_rpm * RPM_TO_RAD_S
    }

    pub fn sidespin_rad_s(&self) -> f64 {
        self.sidespin_rpm * RPM_TO_RAD_S
    }
}

/// Project total spin onto the backspin/sidespin axes.
///
/// Positive axis tilts right, giving positive sidespin. Any angle is
/// accepted; launch monitors report within [-90, 90].
pub fn decompose_spin(total_spin_rpm: f64, spin_axis_deg: f64) -> SpinComponents {
    let axis_rad = spin_axis_deg.to_radians();
    SpinComponents {
        backspin_rpm: total_spin_rpm * axis_rad.cos(),
        sidespin_rpm: total_spin_rpm * axis_rad.sin(),
    }
}
