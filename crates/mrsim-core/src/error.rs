//! Error types for the mrsim toolkit.
//!
//! Organized by subsystem: sequence scheduling, phase-graph evolution,
//! shaped-pulse decomposition, propagator execution, the tick engine, and
//! the top-level [`SimulationError`] returned by every simulation entry
//! point.

use std::error::Error;
use std::fmt;

/// Errors from sequence-parameter validation in the scheduler.
///
/// Every variant describes a timing configuration that cannot be placed
/// on the integer millisecond clock without rounding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceError {
    /// The sampling time step is below the 2 ms minimum.
    TimeStepTooSmall {
        /// The configured time step, in milliseconds.
        time_step_ms: u64,
    },
    /// A duration that must be positive is zero.
    ZeroDuration {
        /// Which parameter (`"TE"` or `"TR"`).
        name: &'static str,
    },
    /// A duration is not an exact multiple of the sampling step.
    NotAMultiple {
        /// Which parameter.
        name: &'static str,
        /// The parameter value, in milliseconds.
        value_ms: u64,
        /// The step it must be a multiple of, in milliseconds.
        step_ms: u64,
    },
    /// The repetition count is zero.
    NoRepetitions,
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeStepTooSmall { time_step_ms } => {
                write!(f, "time step {time_step_ms} ms is below the 2 ms minimum")
            }
            Self::ZeroDuration { name } => write!(f, "{name} must be positive"),
            Self::NotAMultiple {
                name,
                value_ms,
                step_ms,
            } => {
                write!(
                    f,
                    "{name} = {value_ms} ms is not a multiple of {step_ms} ms"
                )
            }
            Self::NoRepetitions => write!(f, "at least one repetition is required"),
        }
    }
}

impl Error for SequenceError {}

/// Errors from phase-graph evolution.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseGraphError {
    /// A gradient moment is not an integer multiple of the bin width
    /// fixed by the first non-zero moment.
    IncommensurateGradient {
        /// The offending moment, in rad/m.
        moment: f64,
        /// The established bin width, in rad/m.
        bin_width: f64,
    },
    /// A time interval has a negative or non-finite duration.
    InvalidDuration {
        /// The rejected duration, in seconds.
        value: f64,
    },
}

impl fmt::Display for PhaseGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncommensurateGradient { moment, bin_width } => {
                write!(
                    f,
                    "gradient moment {moment} rad/m is not a multiple of bin width {bin_width} rad/m"
                )
            }
            Self::InvalidDuration { value } => {
                write!(f, "duration must be finite and non-negative, got {value} s")
            }
        }
    }
}

impl Error for PhaseGraphError {}

/// Errors from the shaped-pulse decomposition.
#[derive(Clone, Debug, PartialEq)]
pub enum PulseError {
    /// The time support has no samples.
    EmptySupport,
    /// The time support is not strictly increasing.
    UnorderedSupport,
    /// The envelope sums to zero over the support, so no flip angle can
    /// be distributed across the sub-pulses.
    DegenerateEnvelope,
    /// Bandwidth is zero, negative, or non-finite.
    InvalidBandwidth {
        /// The rejected bandwidth, in Hz.
        value: f64,
    },
    /// Slice thickness is zero, negative, or non-finite.
    InvalidSliceThickness {
        /// The rejected thickness, in metres.
        value: f64,
    },
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySupport => write!(f, "pulse support is empty"),
            Self::UnorderedSupport => write!(f, "pulse support is not strictly increasing"),
            Self::DegenerateEnvelope => write!(f, "pulse envelope sums to zero"),
            Self::InvalidBandwidth { value } => {
                write!(f, "bandwidth must be finite and positive, got {value} Hz")
            }
            Self::InvalidSliceThickness { value } => {
                write!(f, "slice thickness must be finite and positive, got {value} m")
            }
        }
    }
}

impl Error for PulseError {}

/// Errors from individual propagator execution.
///
/// Returned by `Propagator::step()` and wrapped in
/// [`StepError::PropagatorFailed`] by the tick engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropagatorError {
    /// The propagator's step function failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A non-finite component was found in an isochromat state.
    NanDetected {
        /// Global index of the first affected position.
        position: usize,
    },
}

impl fmt::Display for PropagatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::NanDetected { position } => {
                write!(f, "non-finite magnetization at position {position}")
            }
        }
    }
}

impl Error for PropagatorError {}

/// Errors from the tick engine while advancing the ensemble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// A propagator returned an error.
    PropagatorFailed {
        /// Name of the failing propagator.
        name: String,
        /// Index of the sample being advanced.
        sample: usize,
        /// The underlying propagator error.
        reason: PropagatorError,
    },
    /// A worker thread panicked or disconnected before reporting.
    WorkerFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropagatorFailed {
                name,
                sample,
                reason,
            } => {
                write!(f, "propagator '{name}' failed at sample {sample}: {reason}")
            }
            Self::WorkerFailed { reason } => write!(f, "worker failed: {reason}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PropagatorFailed { reason, .. } => Some(reason),
            Self::WorkerFailed { .. } => None,
        }
    }
}

/// Top-level error returned by the simulation entry points.
///
/// A failure aborts the whole simulation; no partial output is produced.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationError {
    /// A scalar input makes the computation undefined (division by zero,
    /// empty ranges).
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The coherence-order table has no order above zero, so no spatial
    /// step can be derived.
    DegenerateSpectrum,
    /// A configuration failed validation.
    InvalidConfig {
        /// Description of the validation failure.
        reason: String,
    },
    /// Sequence timing could not be scheduled.
    Sequence(SequenceError),
    /// Phase-graph evolution failed.
    PhaseGraph(PhaseGraphError),
    /// Shaped-pulse decomposition failed.
    Pulse(PulseError),
    /// Ensemble propagation failed.
    Step(StepError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter '{name}': {reason}")
            }
            Self::DegenerateSpectrum => {
                write!(f, "degenerate spectrum: no coherence order above zero")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
            Self::Sequence(e) => write!(f, "sequence: {e}"),
            Self::PhaseGraph(e) => write!(f, "phase graph: {e}"),
            Self::Pulse(e) => write!(f, "pulse: {e}"),
            Self::Step(e) => write!(f, "step: {e}"),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sequence(e) => Some(e),
            Self::PhaseGraph(e) => Some(e),
            Self::Pulse(e) => Some(e),
            Self::Step(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SequenceError> for SimulationError {
    fn from(e: SequenceError) -> Self {
        Self::Sequence(e)
    }
}

impl From<PhaseGraphError> for SimulationError {
    fn from(e: PhaseGraphError) -> Self {
        Self::PhaseGraph(e)
    }
}

impl From<PulseError> for SimulationError {
    fn from(e: PulseError) -> Self {
        Self::Pulse(e)
    }
}

impl From<StepError> for SimulationError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}
