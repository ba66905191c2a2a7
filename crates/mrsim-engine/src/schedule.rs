//! Sequence scheduler: timing parameters to a discrete timeline.
//!
//! All timing decisions are integer arithmetic on the millisecond
//! [`Tick`] clock. For the sample at tick `t`:
//!
//! ```text
//! t_in_TR = t mod TR
//! t_in_TE = t_in_TR mod TE
//!
//! t_in_TR == 0, not final  → excitation
//! t_in_TE == TE/2          → refocalization if echo < train_length, else idle
//!                            (echo = (t_in_TR - TE/2) / TE)
//! otherwise                → gradient interval
//! ```

use std::f64::consts::PI;

use mrsim_core::units::{DEG, MM};
use mrsim_core::{
    PulseRole, Sample, SequenceError, SimulationError, Tick, Timeline, TimelineEvent, GAMMA,
};
use tracing::debug;

/// Phase of the excitation pulse, in radians.
pub const EXCITATION_PHASE: f64 = 90.0 * DEG;

/// Phase of the refocalization pulse, in radians.
pub const REFOCALIZATION_PHASE: f64 = 0.0;

/// Shortest accepted sampling step.
pub const MIN_TIME_STEP: Tick = Tick(2);

// ── SequenceParameters ─────────────────────────────────────────────

/// Timing and flip angles of a multi-echo spin-echo train.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceParameters {
    /// Excitation flip angle, in radians. Default: 90°.
    pub excitation: f64,
    /// Refocalization flip angle, in radians. Default: 180°.
    pub refocalization: f64,
    /// Echo time. Default: 200 ms.
    pub echo_time: Tick,
    /// Repetition time. Default: 1000 ms.
    pub repetition_time: Tick,
    /// Refocalization pulses per repetition. Zero gives a free-induction
    /// decay. Default: 3.
    pub train_length: u32,
    /// Number of repetitions. Default: 4.
    pub repetitions: u32,
    /// Sampling step. Default: 10 ms.
    pub time_step: Tick,
}

impl Default for SequenceParameters {
    fn default() -> Self {
        Self {
            excitation: 90.0 * DEG,
            refocalization: 180.0 * DEG,
            echo_time: Tick(200),
            repetition_time: Tick(1000),
            train_length: 3,
            repetitions: 4,
            time_step: Tick(10),
        }
    }
}

impl SequenceParameters {
    /// Check that every event lands exactly on a sample.
    pub fn validate(&self) -> Result<(), SequenceError> {
        let step = self.time_step.as_millis();
        if self.time_step < MIN_TIME_STEP {
            return Err(SequenceError::TimeStepTooSmall { time_step_ms: step });
        }
        if self.echo_time == Tick::ZERO {
            return Err(SequenceError::ZeroDuration { name: "TE" });
        }
        if self.repetition_time == Tick::ZERO {
            return Err(SequenceError::ZeroDuration { name: "TR" });
        }
        if self.repetitions == 0 {
            return Err(SequenceError::NoRepetitions);
        }
        let tr = self.repetition_time.as_millis();
        if tr % step != 0 {
            return Err(SequenceError::NotAMultiple {
                name: "TR",
                value_ms: tr,
                step_ms: step,
            });
        }
        // TE/2 must itself be a sample.
        let te = self.echo_time.as_millis();
        if te % (2 * step) != 0 {
            return Err(SequenceError::NotAMultiple {
                name: "TE",
                value_ms: te,
                step_ms: 2 * step,
            });
        }
        Ok(())
    }

    /// Number of samples: `1 + repetitions·TR/time_step`.
    ///
    /// Only meaningful after [`validate()`](Self::validate) succeeded.
    pub fn step_count(&self) -> usize {
        let span = u64::from(self.repetitions).saturating_mul(self.repetition_time.as_millis());
        let steps = 1 + span / self.time_step.as_millis().max(1);
        usize::try_from(steps).unwrap_or(usize::MAX)
    }

    /// Total duration of the sequence.
    pub fn duration(&self) -> Tick {
        Tick(u64::from(self.repetitions) * self.repetition_time.as_millis())
    }
}

/// Readout gradient that winds one full turn across `voxel_size` in TE/2.
///
/// `G = 2π / (γ · voxel_size · TE/2)`, in T/m, with `echo_time` in
/// seconds and `voxel_size` in metres.
pub fn readout_gradient(echo_time: f64, voxel_size: f64) -> f64 {
    2.0 * PI / GAMMA / voxel_size / (echo_time / 2.0)
}

// ── Scheduler ──────────────────────────────────────────────────────

/// Classifies every sample of a validated sequence.
#[derive(Clone, Debug)]
pub struct Scheduler {
    params: SequenceParameters,
    readout_gradient: f64,
    step_count: usize,
}

impl Scheduler {
    /// Validate `params` and derive the readout gradient for `voxel_size`
    /// metres.
    pub fn new(params: SequenceParameters, voxel_size: f64) -> Result<Self, SimulationError> {
        params.validate()?;
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(SimulationError::InvalidParameter {
                name: "voxel_size",
                reason: format!("must be finite and positive, got {voxel_size} m"),
            });
        }
        let readout_gradient = readout_gradient(params.echo_time.as_seconds(), voxel_size);
        let step_count = params.step_count();
        debug!(
            step_count,
            readout_gradient,
            voxel_mm = voxel_size / MM,
            "scheduler ready"
        );
        Ok(Self {
            params,
            readout_gradient,
            step_count,
        })
    }

    /// The validated parameters.
    pub fn params(&self) -> &SequenceParameters {
        &self.params
    }

    /// Readout gradient amplitude, in T/m.
    pub fn readout_gradient(&self) -> f64 {
        self.readout_gradient
    }

    /// Number of samples in the timeline.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// The event firing at the start of sample `index`.
    pub fn classify(&self, index: usize) -> TimelineEvent {
        let p = &self.params;
        let step = p.time_step.as_millis();
        let te = p.echo_time.as_millis();
        let t = index as u64 * step;
        let t_in_tr = t % p.repetition_time.as_millis();
        let t_in_te = t_in_tr % te;
        let is_final = index + 1 == self.step_count;

        if t_in_tr == 0 && !is_final {
            TimelineEvent::Pulse {
                role: PulseRole::Excitation,
                angle: p.excitation,
                phase: EXCITATION_PHASE,
            }
        } else if t_in_te == te / 2 {
            let echo = (t_in_tr - te / 2) / te;
            if echo < u64::from(p.train_length) {
                TimelineEvent::Pulse {
                    role: PulseRole::Refocalization,
                    angle: p.refocalization,
                    phase: REFOCALIZATION_PHASE,
                }
            } else {
                TimelineEvent::Idle {
                    duration: p.time_step.as_seconds(),
                }
            }
        } else {
            TimelineEvent::GradientInterval {
                duration: p.time_step.as_seconds(),
                amplitude: self.readout_gradient,
            }
        }
    }

    /// Build the full timeline.
    pub fn build(&self) -> Timeline {
        let step = self.params.time_step.as_millis();
        let samples = (0..self.step_count)
            .map(|index| Sample {
                index,
                tick: Tick(index as u64 * step),
                event: self.classify(index),
            })
            .collect();
        Timeline::new(samples, self.params.time_step, self.readout_gradient)
    }
}

/// Validate `params` and build their timeline for `voxel_size` metres.
pub fn schedule(params: &SequenceParameters, voxel_size: f64) -> Result<Timeline, SimulationError> {
    Ok(Scheduler::new(params.clone(), voxel_size)?.build())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> impl Strategy<Value = SequenceParameters> {
        (2u64..12, 1u64..8, 1u64..6, 0u32..5, 1u32..4).prop_flat_map(
            |(step, te_half, tr_mult, train, reps)| {
                let te = 2 * step * te_half;
                (Just(step), Just(te), Just(tr_mult * te), Just(train), Just(reps))
            },
        )
        .prop_map(|(step, te, tr, train_length, repetitions)| SequenceParameters {
            excitation: 90.0 * DEG,
            refocalization: 180.0 * DEG,
            echo_time: Tick(te),
            repetition_time: Tick(tr),
            train_length,
            repetitions,
            time_step: Tick(step),
        })
    }

    proptest! {
        #[test]
        fn timeline_length_matches_repetitions(p in params()) {
            let timeline = schedule(&p, MM).unwrap();
            let expected = 1 + (u64::from(p.repetitions) * p.repetition_time.0 / p.time_step.0) as usize;
            prop_assert_eq!(timeline.len(), expected);
        }

        #[test]
        fn pulses_fire_only_at_boundaries_and_midpoints(p in params()) {
            let timeline = schedule(&p, MM).unwrap();
            let tr = p.repetition_time.0;
            let te = p.echo_time.0;
            for sample in timeline.samples() {
                let t_in_tr = sample.tick.0 % tr;
                match sample.event.pulse_role() {
                    Some(PulseRole::Excitation) => {
                        prop_assert_eq!(t_in_tr, 0);
                        prop_assert!(sample.index + 1 < timeline.len());
                    }
                    Some(PulseRole::Refocalization) => {
                        prop_assert_eq!(t_in_tr % te, te / 2);
                        prop_assert!((t_in_tr - te / 2) / te < u64::from(p.train_length));
                    }
                    None => {}
                }
            }
        }

        #[test]
        fn every_repetition_starts_with_one_excitation(p in params()) {
            let timeline = schedule(&p, MM).unwrap();
            let excitations = timeline
                .pulses()
                .filter(|s| s.event.pulse_role() == Some(PulseRole::Excitation))
                .count();
            prop_assert_eq!(excitations, p.repetitions as usize);
        }

        #[test]
        fn samples_are_strictly_increasing(p in params()) {
            let timeline = schedule(&p, MM).unwrap();
            for w in timeline.samples().windows(2) {
                prop_assert_eq!(w[1].tick.0 - w[0].tick.0, p.time_step.0);
            }
        }
    }
}
