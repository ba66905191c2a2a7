//! Homogeneous Bloch operators.
//!
//! An [`Operator`] is a 4×4 matrix acting on `(x, y, z, m0)`. Rotations
//! leave `m0` untouched; relaxation uses it to pull `z` back towards
//! equilibrium, which keeps every step of free evolution linear.

use std::ops::Mul;

use mrsim_core::{Magnetization, Species, GAMMA};

/// A 4×4 operator on homogeneous magnetization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Operator {
    m: [[f64; 4]; 4],
}

impl Operator {
    /// The identity operator.
    pub const IDENTITY: Operator = Operator {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build from row-major entries.
    pub fn from_rows(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Row-major entries.
    pub fn rows(&self) -> &[[f64; 4]; 4] {
        &self.m
    }

    /// Right-handed rotation about x.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation about z.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// RF pulse of flip `angle` about the transverse axis at `phase`.
    ///
    /// Computed as `Rz(phase) · Rx(angle) · Rz(-phase)`.
    pub fn pulse(angle: f64, phase: f64) -> Self {
        Self::rotation_z(phase) * Self::rotation_x(angle) * Self::rotation_z(-phase)
    }

    /// Relaxation over `duration` seconds, without precession.
    pub fn relaxation(species: &Species, duration: f64) -> Self {
        let (e1, e2) = species.decay(duration);
        Self::from_rows([
            [e2, 0.0, 0.0, 0.0],
            [0.0, e2, 0.0, 0.0],
            [0.0, 0.0, e1, 1.0 - e1],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Free evolution over `duration` at `position` under `gradient`.
    ///
    /// Relaxation composed with the precession `Rz(γ·G·x·τ)`. A positive
    /// gradient at a positive position advances the transverse phase.
    pub fn time_interval(species: &Species, duration: f64, gradient: f64, position: f64) -> Self {
        let angle = GAMMA * gradient * position * duration;
        Self::relaxation(species, duration) * Self::rotation_z(angle)
    }

    /// `next` applied after `self`.
    pub fn then(&self, next: &Operator) -> Operator {
        *next * *self
    }

    /// Apply to one isochromat state.
    pub fn apply(&self, state: &Magnetization) -> Magnetization {
        let v = state.to_array();
        let mut out = [0.0; 4];
        for (row, o) in self.m.iter().zip(out.iter_mut()) {
            *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + row[3] * v[3];
        }
        Magnetization::from_array(out)
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Operator {
    type Output = Operator;

    fn mul(self, rhs: Operator) -> Operator {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Operator { m }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pulses_preserve_vector_norm(
            angle in -6.3f64..6.3,
            phase in -6.3f64..6.3,
            x in -1.0f64..1.0,
            y in -1.0f64..1.0,
            z in -1.0f64..1.0,
        ) {
            let m = Magnetization::from_array([x, y, z, 1.0]);
            let out = Operator::pulse(angle, phase).apply(&m);
            let before = (x * x + y * y + z * z).sqrt();
            let after = (out.x * out.x + out.y * out.y + out.z * out.z).sqrt();
            prop_assert!((before - after).abs() < 1e-12);
            prop_assert_eq!(out.m0, 1.0);
        }
    }
}
