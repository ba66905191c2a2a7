//! Extended-phase-graph (EPG) state.
//!
//! A [`PhaseGraph`] stores the spin ensemble of a voxel as a dense table of
//! coherence orders `0..=K`. Order `k` holds `(F⁺ₖ, F⁻ₖ, Zₖ)`; the
//! transverse magnetization at position `x` is
//!
//! ```text
//! M⁺(x) = Σ_{k≥0} F⁺ₖ·e^{ik·b·x} + Σ_{k≥1} conj(F⁻ₖ)·e^{-ik·b·x}
//! ```
//!
//! where `b` is the bin width, the gradient moment of one order. Negative
//! orders are never stored: `F⁺₋ₖ = conj(F⁻ₖ)`. At order 0 the two
//! transverse entries are conjugates of each other.
//!
//! The graph can be driven imperatively with [`PhaseGraph::apply_pulse`]
//! and [`PhaseGraph::apply_time_interval`], or functionally by folding
//! [`PhaseGraphEvent`]s through [`PhaseGraph::evolve`].

use mrsim_core::{Complex64, PhaseGraphError, Species, GAMMA};

/// Relative tolerance for deciding that a gradient moment is a whole
/// number of bins.
const COMMENSURABILITY_TOLERANCE: f64 = 1e-6;

/// The three coherences of one order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrderState {
    /// Dephasing transverse coherence `F⁺ₖ`.
    pub f_plus: Complex64,
    /// Rephasing transverse coherence `F⁻ₖ`.
    pub f_minus: Complex64,
    /// Longitudinal coherence `Zₖ`.
    pub z: Complex64,
}

impl OrderState {
    /// All-zero order.
    pub const ZERO: OrderState = OrderState {
        f_plus: Complex64::new(0.0, 0.0),
        f_minus: Complex64::new(0.0, 0.0),
        z: Complex64::new(0.0, 0.0),
    };

    fn is_negligible(&self, threshold: f64) -> bool {
        self.f_plus.norm() <= threshold
            && self.f_minus.norm() <= threshold
            && self.z.norm() <= threshold
    }
}

/// One step of phase-graph evolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhaseGraphEvent {
    /// Instantaneous RF pulse.
    Pulse {
        /// Flip angle, in radians.
        angle: f64,
        /// Pulse phase, in radians.
        phase: f64,
    },
    /// Relaxation followed by a gradient-induced order shift.
    TimeInterval {
        /// Interval length, in seconds.
        duration: f64,
        /// Gradient amplitude, in T/m.
        gradient: f64,
    },
}

/// Discrete phase-graph state of one voxel.
#[derive(Clone, Debug)]
pub struct PhaseGraph {
    species: Species,
    states: Vec<OrderState>,
    bin_width: f64,
    threshold: f64,
}

impl PhaseGraph {
    /// Equilibrium state for `species`: `Z₀ = 1`, everything else zero.
    pub fn new(species: Species) -> Self {
        Self {
            species,
            states: vec![OrderState {
                z: Complex64::new(1.0, 0.0),
                ..OrderState::ZERO
            }],
            bin_width: 0.0,
            threshold: 0.0,
        }
    }

    /// Prune orders whose coherences all fall at or below `threshold`.
    ///
    /// Pruned orders above 0 are zeroed and trailing empty orders are
    /// dropped after every time interval. With the default of 0 only
    /// exactly-empty trailing orders are dropped.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    /// The relaxation times driving this graph.
    pub fn species(&self) -> &Species {
        &self.species
    }

    /// Pruning threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Apply an instantaneous RF pulse to every order.
    pub fn apply_pulse(&mut self, angle: f64, phase: f64) {
        let half = 0.5 * angle;
        let cos2 = half.cos().powi(2);
        let sin2 = half.sin().powi(2);
        let (sin_a, cos_a) = angle.sin_cos();
        let e = Complex64::from_polar(1.0, phase);
        let e2 = e * e;
        let i = Complex64::i();

        for s in &mut self.states {
            let OrderState { f_plus, f_minus, z } = *s;
            s.f_plus = f_plus * cos2 + e2 * f_minus * sin2 - i * e * z * sin_a;
            s.f_minus = f_plus * sin2 * e2.conj() + f_minus * cos2 + i * e.conj() * z * sin_a;
            s.z = -i * 0.5 * sin_a * e.conj() * f_plus + i * 0.5 * sin_a * e * f_minus + z * cos_a;
        }
    }

    /// Relax for `duration` seconds, then shift by the moment of
    /// `gradient` over the same duration.
    ///
    /// The first non-zero moment fixes the bin width; later moments must
    /// be whole multiples of it.
    pub fn apply_time_interval(
        &mut self,
        duration: f64,
        gradient: f64,
    ) -> Result<(), PhaseGraphError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(PhaseGraphError::InvalidDuration { value: duration });
        }
        let shift = self.shift_for_moment(GAMMA * gradient * duration)?;

        self.relax(duration);
        for _ in 0..shift.unsigned_abs() {
            if shift > 0 {
                self.shift_up();
            } else {
                self.shift_down();
            }
        }
        self.prune();
        Ok(())
    }

    /// Apply one event, consuming and returning the state.
    pub fn evolve(mut self, event: &PhaseGraphEvent) -> Result<Self, PhaseGraphError> {
        match *event {
            PhaseGraphEvent::Pulse { angle, phase } => self.apply_pulse(angle, phase),
            PhaseGraphEvent::TimeInterval { duration, gradient } => {
                self.apply_time_interval(duration, gradient)?
            }
        }
        Ok(self)
    }

    /// The echo coherence `F⁺₀`: the voxel-averaged transverse signal.
    pub fn echo(&self) -> Complex64 {
        self.states[0].f_plus
    }

    /// Stored orders `0..=K`.
    pub fn states(&self) -> &[OrderState] {
        &self.states
    }

    /// Physical order values `k·bin_width`, in rad/m, parallel to
    /// [`states`](Self::states).
    pub fn orders(&self) -> Vec<f64> {
        (0..self.states.len())
            .map(|k| k as f64 * self.bin_width)
            .collect()
    }

    /// Gradient moment of one order, in rad/m. Zero until the first
    /// non-zero moment is applied.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Highest stored order `K`.
    pub fn max_order(&self) -> usize {
        self.states.len() - 1
    }

    fn shift_for_moment(&mut self, moment: f64) -> Result<i64, PhaseGraphError> {
        if moment == 0.0 {
            return Ok(0);
        }
        if self.bin_width == 0.0 {
            self.bin_width = moment.abs();
        }
        let ratio = moment / self.bin_width;
        let rounded = ratio.round();
        if (ratio - rounded).abs() > COMMENSURABILITY_TOLERANCE * rounded.abs().max(1.0) {
            return Err(PhaseGraphError::IncommensurateGradient {
                moment,
                bin_width: self.bin_width,
            });
        }
        Ok(rounded as i64)
    }

    fn relax(&mut self, duration: f64) {
        if duration == 0.0 {
            return;
        }
        let (e1, e2) = self.species.decay(duration);
        for s in &mut self.states {
            s.f_plus *= e2;
            s.f_minus *= e2;
            s.z *= e1;
        }
        self.states[0].z += 1.0 - e1;
    }

    /// Move every dephasing coherence one order up and every rephasing
    /// coherence one order down.
    fn shift_up(&mut self) {
        self.states.push(OrderState::ZERO);
        let n = self.states.len();
        for k in (1..n).rev() {
            self.states[k].f_plus = self.states[k - 1].f_plus;
        }
        for k in 0..n - 1 {
            self.states[k].f_minus = self.states[k + 1].f_minus;
        }
        self.states[n - 1].f_minus = Complex64::new(0.0, 0.0);
        self.states[0].f_plus = self.states[0].f_minus.conj();
    }

    fn shift_down(&mut self) {
        self.states.push(OrderState::ZERO);
        let n = self.states.len();
        for k in (1..n).rev() {
            self.states[k].f_minus = self.states[k - 1].f_minus;
        }
        for k in 0..n - 1 {
            self.states[k].f_plus = self.states[k + 1].f_plus;
        }
        self.states[n - 1].f_plus = Complex64::new(0.0, 0.0);
        self.states[0].f_minus = self.states[0].f_plus.conj();
    }

    fn prune(&mut self) {
        let threshold = self.threshold;
        if threshold > 0.0 {
            for s in self.states.iter_mut().skip(1) {
                if s.is_negligible(threshold) {
                    *s = OrderState::ZERO;
                }
            }
        }
        while self.states.len() > 1
            && self
                .states
                .last()
                .is_some_and(|s| s.is_negligible(threshold))
        {
            self.states.pop();
        }
    }
}
