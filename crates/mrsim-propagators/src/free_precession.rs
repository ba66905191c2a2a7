//! Relaxation and gradient precession over one time step.
//!
//! Each isochromat sits at a fixed position along the readout axis, so its
//! free-evolution operator for one time step is constant for the whole
//! run. [`FreePrecession`] builds one operator per position up front and
//! applies it after every sample's event.

use mrsim_core::{PropagatorError, Species, TimelineEvent};
use mrsim_physics::Operator;
use mrsim_propagator::{Propagator, StepContext};
use mrsim_space::Space;

use crate::payload_matches;

/// Per-position free evolution under a constant readout gradient.
///
/// Interval events must last one timeline step, and gradient intervals
/// must carry the readout gradient the operators were built for.
#[derive(Debug, Clone)]
pub struct FreePrecession {
    operators: Vec<Operator>,
    time_step: f64,
    gradient: f64,
}

impl FreePrecession {
    /// Build operators for every position of `space`.
    ///
    /// `time_step` is in seconds, `gradient` in T/m.
    pub fn new(species: &Species, time_step: f64, gradient: f64, space: &dyn Space) -> Self {
        let operators = space
            .positions()
            .iter()
            .map(|&x| Operator::time_interval(species, time_step, gradient, x))
            .collect();
        Self {
            operators,
            time_step,
            gradient,
        }
    }

    /// Readout gradient amplitude, in T/m.
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    fn check_event(&self, event: &TimelineEvent, time_step: f64) -> Result<(), PropagatorError> {
        let (duration, amplitude) = match *event {
            TimelineEvent::Pulse { .. } => return Ok(()),
            TimelineEvent::GradientInterval {
                duration,
                amplitude,
            } => (duration, Some(amplitude)),
            TimelineEvent::Idle { duration } => (duration, None),
        };
        if !payload_matches(duration, time_step) {
            return Err(PropagatorError::ExecutionFailed {
                reason: format!("interval of {duration} s does not match the {time_step} s step"),
            });
        }
        match amplitude {
            Some(g) if !payload_matches(g, self.gradient) => Err(PropagatorError::ExecutionFailed {
                reason: format!(
                    "gradient of {g} T/m does not match the prepared {} T/m",
                    self.gradient
                ),
            }),
            _ => Ok(()),
        }
    }
}

impl Propagator for FreePrecession {
    fn name(&self) -> &str {
        "free_precession"
    }

    fn cell_count(&self) -> Option<usize> {
        Some(self.operators.len())
    }

    fn time_step(&self) -> Option<f64> {
        Some(self.time_step)
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        self.check_event(ctx.event(), ctx.time_step())?;
        let cells = ctx.cells();
        let ops = self
            .operators
            .get(cells.clone())
            .ok_or_else(|| PropagatorError::ExecutionFailed {
                reason: format!(
                    "positions {cells:?} outside the {} prepared operators",
                    self.operators.len()
                ),
            })?;
        for (state, op) in ctx.states().iter_mut().zip(ops) {
            *state = op.apply(state);
        }
        Ok(())
    }
}
