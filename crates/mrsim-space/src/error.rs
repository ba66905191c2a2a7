//! Error types for space construction.

use std::fmt;

/// Errors arising from space construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// Attempted to construct a space with zero positions.
    EmptySpace,
    /// The spatial extent is negative or non-finite.
    InvalidExtent {
        /// The rejected extent, in metres.
        value: f64,
    },
    /// A position is NaN or infinite.
    NonFinitePosition {
        /// Index of the offending position.
        index: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "space must have at least one position"),
            Self::InvalidExtent { value } => {
                write!(f, "extent must be finite and non-negative, got {value} m")
            }
            Self::NonFinitePosition { index } => {
                write!(f, "position {index} is not finite")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
