//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena would hold zero positions or zero samples.
    EmptyArena,
    /// The recorded trajectory would exceed the configured capacity.
    CapacityExceeded {
        /// Number of states requested.
        requested: usize,
        /// Maximum number of states allowed.
        capacity: usize,
    },
    /// A state slice does not match the arena width.
    LengthMismatch {
        /// Expected number of positions.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },
    /// The trajectory already holds every sample it was sized for.
    TrajectoryFull {
        /// Number of samples the trajectory holds.
        capacity: usize,
    },
    /// `begin_step()` was called while a step was already open.
    StepInProgress,
    /// `publish()` was called without a matching `begin_step()`.
    NoStepInProgress,
    /// Partial trajectories could not be stitched together.
    InvalidChunks {
        /// Description of the mismatch.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyArena => write!(f, "arena must hold at least one position and one sample"),
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} states, capacity {capacity}"
                )
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} positions, got {actual}")
            }
            Self::TrajectoryFull { capacity } => {
                write!(f, "trajectory already holds all {capacity} samples")
            }
            Self::StepInProgress => write!(f, "a step is already in progress"),
            Self::NoStepInProgress => write!(f, "no step in progress"),
            Self::InvalidChunks { reason } => write!(f, "invalid trajectory chunks: {reason}"),
        }
    }
}

impl Error for ArenaError {}
