//! Hard-pulse decomposition of shaped RF pulses.
//!
//! A shaped pulse played under a slice-select gradient is approximated by
//! a train of instantaneous sub-pulses, one per sample of the time
//! support, each followed by a short gradient interval. The flip angle of
//! each sub-pulse is proportional to the envelope at its sample.

use std::f64::consts::PI;

use mrsim_core::{PulseError, GAMMA};

use crate::epg::PhaseGraphEvent;

/// Envelope sums at or below this magnitude cannot carry a flip angle.
const ENVELOPE_EPSILON: f64 = 1e-12;

/// An instantaneous RF pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    /// Flip angle, in radians.
    pub angle: f64,
    /// Phase, in radians.
    pub phase: f64,
}

impl Pulse {
    /// Create a pulse from flip angle and phase, both in radians.
    pub fn new(angle: f64, phase: f64) -> Self {
        Self { angle, phase }
    }
}

/// A constant-gradient interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeInterval {
    /// Length, in seconds.
    pub duration: f64,
    /// Gradient amplitude along the slice axis, in T/m.
    pub gradient: f64,
}

impl TimeInterval {
    /// Accumulated dephasing `γ·G·τ`, in rad/m.
    pub fn gradient_moment(&self) -> f64 {
        GAMMA * self.gradient * self.duration
    }
}

/// Pulse amplitude shape as a function of time from the pulse centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Envelope {
    /// `sinc(t / t0)` with the normalized sinc `sin(πu)/(πu)`.
    Sinc {
        /// Time to the first zero crossing, in seconds.
        t0: f64,
    },
    /// Constant amplitude.
    Rectangular,
}

impl Envelope {
    /// Envelope amplitude at time `t`.
    pub fn sample(&self, t: f64) -> f64 {
        match *self {
            Self::Sinc { t0 } => sinc(t / t0),
            Self::Rectangular => 1.0,
        }
    }
}

fn sinc(u: f64) -> f64 {
    if u == 0.0 {
        1.0
    } else {
        let x = PI * u;
        x.sin() / x
    }
}

/// A shaped pulse decomposed into hard sub-pulses.
#[derive(Clone, Debug, PartialEq)]
pub struct HardPulseApproximation {
    pulses: Vec<Pulse>,
    time_interval: TimeInterval,
    gradient_moment: f64,
}

impl HardPulseApproximation {
    /// Decompose `model` over `support` (sample times in seconds, centred
    /// on the pulse peak).
    ///
    /// The slice-select gradient is `2π·bandwidth / (γ·slice_thickness)`.
    /// Each sub-pulse is followed by one support spacing under that
    /// gradient; a single-sample support gets a zero-length interval.
    pub fn new(
        model: Pulse,
        support: &[f64],
        envelope: Envelope,
        bandwidth: f64,
        slice_thickness: f64,
    ) -> Result<Self, PulseError> {
        if support.is_empty() {
            return Err(PulseError::EmptySupport);
        }
        if support.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PulseError::UnorderedSupport);
        }
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(PulseError::InvalidBandwidth { value: bandwidth });
        }
        if !slice_thickness.is_finite() || slice_thickness <= 0.0 {
            return Err(PulseError::InvalidSliceThickness {
                value: slice_thickness,
            });
        }

        let amplitudes: Vec<f64> = support.iter().map(|&t| envelope.sample(t)).collect();
        let total: f64 = amplitudes.iter().sum();
        if !total.is_finite() || total.abs() <= ENVELOPE_EPSILON {
            return Err(PulseError::DegenerateEnvelope);
        }

        let pulses = amplitudes
            .iter()
            .map(|a| Pulse::new(model.angle * a / total, model.phase))
            .collect();

        let n = support.len();
        let duration = if n > 1 {
            (support[n - 1] - support[0]) / (n - 1) as f64
        } else {
            0.0
        };
        let gradient = 2.0 * PI * bandwidth / (GAMMA * slice_thickness);
        let time_interval = TimeInterval { duration, gradient };
        let gradient_moment = time_interval.gradient_moment() * n as f64;

        Ok(Self {
            pulses,
            time_interval,
            gradient_moment,
        })
    }

    /// The sub-pulses in play order.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// The interval following each sub-pulse.
    pub fn time_interval(&self) -> TimeInterval {
        self.time_interval
    }

    /// Total gradient moment of the train, in rad/m.
    pub fn gradient_moment(&self) -> f64 {
        self.gradient_moment
    }

    /// The train as alternating pulse and interval events.
    pub fn events(&self) -> impl Iterator<Item = PhaseGraphEvent> + '_ {
        let interval = PhaseGraphEvent::TimeInterval {
            duration: self.time_interval.duration,
            gradient: self.time_interval.gradient,
        };
        self.pulses.iter().flat_map(move |p| {
            [
                PhaseGraphEvent::Pulse {
                    angle: p.angle,
                    phase: p.phase,
                },
                interval,
            ]
        })
    }
}

/// `count` evenly spaced samples spanning `[-span/2, +span/2]`, endpoints
/// included.
pub fn centered_support(span: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = span / (count - 1) as f64;
            (0..count).map(|i| -0.5 * span + i as f64 * step).collect()
        }
    }
}
