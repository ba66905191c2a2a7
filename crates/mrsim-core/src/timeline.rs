//! Discrete sequence timelines.
//!
//! A [`Timeline`] is the scheduler's output: one [`Sample`] per time step,
//! each tagged with the [`TimelineEvent`] that fires at its start. Samples
//! are stored in strictly increasing tick order.

use crate::id::Tick;

/// Which of the two sequence pulses an event is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PulseRole {
    /// The pulse at the start of every repetition.
    Excitation,
    /// A pulse at a TE midpoint inside the echo train.
    Refocalization,
}

/// What happens at the start of a sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimelineEvent {
    /// An instantaneous RF pulse, followed by one time step of free
    /// evolution under the readout gradient.
    Pulse {
        /// Which sequence pulse this is.
        role: PulseRole,
        /// Flip angle, in radians.
        angle: f64,
        /// Pulse phase, in radians.
        phase: f64,
    },
    /// Free evolution under a constant gradient.
    GradientInterval {
        /// Interval length, in seconds.
        duration: f64,
        /// Gradient amplitude, in T/m.
        amplitude: f64,
    },
    /// A refocalization slot past the end of the echo train: no pulse
    /// fires, evolution continues as in a gradient interval.
    Idle {
        /// Interval length, in seconds.
        duration: f64,
    },
}

impl TimelineEvent {
    /// The pulse role, if this event is a pulse.
    pub fn pulse_role(&self) -> Option<PulseRole> {
        match self {
            Self::Pulse { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Whether an RF pulse fires.
    pub fn is_pulse(&self) -> bool {
        matches!(self, Self::Pulse { .. })
    }
}

/// One discrete time sample of a timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Position of the sample in the timeline.
    pub index: usize,
    /// Absolute start time.
    pub tick: Tick,
    /// The event firing at `tick`.
    pub event: TimelineEvent,
}

impl Sample {
    /// Absolute start time, in seconds.
    pub fn start(&self) -> f64 {
        self.tick.as_seconds()
    }
}

/// An ordered list of samples sharing one time step and readout gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    samples: Vec<Sample>,
    time_step: Tick,
    readout_gradient: f64,
}

impl Timeline {
    /// Wrap scheduler output.
    ///
    /// `samples` must be in strictly increasing tick order, spaced by
    /// `time_step`.
    pub fn new(samples: Vec<Sample>, time_step: Tick, readout_gradient: f64) -> Self {
        debug_assert!(samples.windows(2).all(|w| w[0].tick < w[1].tick));
        Self {
            samples,
            time_step,
            readout_gradient,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the timeline has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in time order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The sample at `index`.
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Sampling interval on the integer clock.
    pub fn time_step_tick(&self) -> Tick {
        self.time_step
    }

    /// Sampling interval, in seconds.
    pub fn time_step(&self) -> f64 {
        self.time_step.as_seconds()
    }

    /// Readout gradient applied during every free-evolution step, in T/m.
    pub fn readout_gradient(&self) -> f64 {
        self.readout_gradient
    }

    /// Sample start times, in milliseconds.
    pub fn times_ms(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.tick.0 as f64).collect()
    }

    /// Samples at which an RF pulse fires.
    pub fn pulses(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter().filter(|s| s.event.is_pulse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(index: usize, tick: u64) -> Sample {
        Sample {
            index,
            tick: Tick(tick),
            event: TimelineEvent::GradientInterval {
                duration: 0.01,
                amplitude: 1e-3,
            },
        }
    }

    #[test]
    fn pulses_filters_rf_events() {
        let mut samples = vec![interval(0, 0), interval(1, 10), interval(2, 20)];
        samples[1].event = TimelineEvent::Pulse {
            role: PulseRole::Refocalization,
            angle: std::f64::consts::PI,
            phase: 0.0,
        };
        let timeline = Timeline::new(samples, Tick(10), 1e-3);
        let pulses: Vec<usize> = timeline.pulses().map(|s| s.index).collect();
        assert_eq!(pulses, vec![1]);
        assert_eq!(
            timeline.get(1).and_then(|s| s.event.pulse_role()),
            Some(PulseRole::Refocalization)
        );
    }

    #[test]
    fn times_are_reported_in_milliseconds() {
        let timeline = Timeline::new(vec![interval(0, 0), interval(1, 10)], Tick(10), 0.0);
        assert_eq!(timeline.times_ms(), vec![0.0, 10.0]);
        assert_eq!(timeline.time_step(), 0.01);
        assert_eq!(timeline.get(1).map(Sample::start), Some(0.01));
    }
}
