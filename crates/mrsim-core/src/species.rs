//! Relaxation-time container.

/// A tissue species, described by its relaxation times.
///
/// Both times are in seconds. `t2 <= t1` is the physical convention but
/// is not enforced. A zero relaxation time means instantaneous relaxation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Species {
    /// Longitudinal relaxation time, in seconds.
    pub t1: f64,
    /// Transverse relaxation time, in seconds.
    pub t2: f64,
}

impl Species {
    /// Create a species from its relaxation times, in seconds.
    pub fn new(t1: f64, t2: f64) -> Self {
        Self { t1, t2 }
    }

    /// Decay factors `(E1, E2)` over `duration` seconds.
    ///
    /// `E = exp(-duration / T)`; a zero relaxation time gives `E = 0` for
    /// any positive duration, and a zero duration gives `E = 1`.
    pub fn decay(&self, duration: f64) -> (f64, f64) {
        (decay_factor(duration, self.t1), decay_factor(duration, self.t2))
    }
}

fn decay_factor(duration: f64, time_constant: f64) -> f64 {
    if duration == 0.0 {
        1.0
    } else if time_constant <= 0.0 {
        0.0
    } else {
        (-duration / time_constant).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_is_exponential() {
        let species = Species::new(1.0, 0.1);
        let (e1, e2) = species.decay(0.1);
        assert!((e1 - (-0.1f64).exp()).abs() < 1e-15);
        assert!((e2 - (-1.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn zero_duration_does_not_decay() {
        let species = Species::new(0.0, 0.0);
        assert_eq!(species.decay(0.0), (1.0, 1.0));
    }

    #[test]
    fn zero_relaxation_time_relaxes_fully() {
        let species = Species::new(0.0, 0.0);
        assert_eq!(species.decay(1e-3), (0.0, 0.0));
    }
}
