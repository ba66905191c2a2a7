//! The four-component isochromat state.

use num_complex::Complex64;

/// Magnetization of one isochromat in homogeneous coordinates.
///
/// `(x, y, z)` is the magnetization vector; `m0` is the equilibrium
/// magnitude, carried as a fourth component so that relaxation towards
/// equilibrium is a linear operator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Magnetization {
    /// Transverse component along x.
    pub x: f64,
    /// Transverse component along y.
    pub y: f64,
    /// Longitudinal component.
    pub z: f64,
    /// Equilibrium magnitude.
    pub m0: f64,
}

impl Magnetization {
    /// Thermal equilibrium `(0, 0, 1, 1)`.
    pub const EQUILIBRIUM: Magnetization = Magnetization {
        x: 0.0,
        y: 0.0,
        z: 1.0,
        m0: 1.0,
    };

    /// All-zero state.
    pub const ZERO: Magnetization = Magnetization {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        m0: 0.0,
    };

    /// Build from `[x, y, z, m0]`.
    pub fn from_array(v: [f64; 4]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
            m0: v[3],
        }
    }

    /// The components as `[x, y, z, m0]`.
    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.m0]
    }

    /// Complex transverse signal `x + i·y`.
    pub fn transverse(&self) -> Complex64 {
        Complex64::new(self.x, self.y)
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.m0.is_finite()
    }
}

impl Default for Magnetization {
    fn default() -> Self {
        Self::EQUILIBRIUM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equilibrium_has_no_transverse_signal() {
        let m = Magnetization::EQUILIBRIUM;
        assert_eq!(m.transverse(), Complex64::new(0.0, 0.0));
        assert_eq!(m.to_array(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn array_conversion_preserves_order() {
        let m = Magnetization::from_array([0.1, 0.2, 0.3, 1.0]);
        assert_eq!(m.transverse(), Complex64::new(0.1, 0.2));
        assert_eq!(m.z, 0.3);
    }

    #[test]
    fn nan_component_is_not_finite() {
        let m = Magnetization {
            y: f64::NAN,
            ..Magnetization::EQUILIBRIUM
        };
        assert!(!m.is_finite());
        assert!(Magnetization::EQUILIBRIUM.is_finite());
    }
}
