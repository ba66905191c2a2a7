//! Instantaneous RF rotation of every isochromat.
//!
//! # Construction
//!
//! ```
//! use mrsim_physics::Pulse;
//! use mrsim_propagators::PulseRotation;
//!
//! let prop = PulseRotation::new(
//!     Pulse::new(std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2),
//!     Pulse::new(std::f64::consts::PI, 0.0),
//! );
//! ```

use mrsim_core::{PropagatorError, PulseRole, TimelineEvent};
use mrsim_physics::{Operator, Pulse};
use mrsim_propagator::{Propagator, StepContext};

use crate::payload_matches;

/// Applies the excitation or refocalization rotation when a sample's
/// event is a pulse, and leaves the states untouched otherwise.
///
/// Both rotations are built once at construction. The pulse is the same
/// for every position, so the operator is shared across the ensemble.
/// A pulse event whose angle or phase differs from the prepared pulse of
/// its role fails the step.
#[derive(Debug, Clone)]
pub struct PulseRotation {
    excitation: Prepared,
    refocalization: Prepared,
}

#[derive(Debug, Clone)]
struct Prepared {
    pulse: Pulse,
    operator: Operator,
}

impl Prepared {
    fn new(pulse: Pulse) -> Self {
        Self {
            pulse,
            operator: Operator::pulse(pulse.angle, pulse.phase),
        }
    }
}

impl PulseRotation {
    /// Create a propagator for the two pulses of a spin-echo train.
    pub fn new(excitation: Pulse, refocalization: Pulse) -> Self {
        Self {
            excitation: Prepared::new(excitation),
            refocalization: Prepared::new(refocalization),
        }
    }

    fn prepared(&self, role: PulseRole) -> &Prepared {
        match role {
            PulseRole::Excitation => &self.excitation,
            PulseRole::Refocalization => &self.refocalization,
        }
    }

    /// The pulse prepared for `role`.
    pub fn pulse(&self, role: PulseRole) -> Pulse {
        self.prepared(role).pulse
    }

    /// The rotation applied for `role`.
    pub fn operator(&self, role: PulseRole) -> &Operator {
        &self.prepared(role).operator
    }
}

impl Propagator for PulseRotation {
    fn name(&self) -> &str {
        "pulse_rotation"
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let (role, angle, phase) = match *ctx.event() {
            TimelineEvent::Pulse { role, angle, phase } => (role, angle, phase),
            TimelineEvent::GradientInterval { .. } | TimelineEvent::Idle { .. } => return Ok(()),
        };
        let prepared = self.prepared(role);
        if !payload_matches(angle, prepared.pulse.angle)
            || !payload_matches(phase, prepared.pulse.phase)
        {
            return Err(PropagatorError::ExecutionFailed {
                reason: format!(
                    "{role:?} event ({angle} rad, phase {phase} rad) does not match the \
                     prepared pulse ({} rad, phase {} rad)",
                    prepared.pulse.angle, prepared.pulse.phase
                ),
            });
        }
        let op = prepared.operator;
        for state in ctx.states() {
            *state = op.apply(state);
        }
        Ok(())
    }
}
