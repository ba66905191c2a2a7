//! Arena configuration parameters.

use crate::error::ArenaError;

/// Sizing of the per-step buffers and the recorded trajectory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of isochromats held in each buffer.
    pub cell_count: usize,

    /// Number of samples the trajectory will record.
    pub sample_count: usize,

    /// Upper bound on `cell_count * sample_count` recorded states.
    ///
    /// Default: 2^26 states (2 GiB of `f64` components).
    pub max_recorded_states: usize,
}

impl ArenaConfig {
    /// Default cap on recorded states.
    pub const DEFAULT_MAX_RECORDED_STATES: usize = 1 << 26;

    /// Create a config for `cell_count` positions and `sample_count` samples.
    pub fn new(cell_count: usize, sample_count: usize) -> Self {
        Self {
            cell_count,
            sample_count,
            max_recorded_states: Self::DEFAULT_MAX_RECORDED_STATES,
        }
    }

    /// Number of states the trajectory will hold.
    pub fn recorded_states(&self) -> Option<usize> {
        self.cell_count.checked_mul(self.sample_count)
    }

    /// Memory used by the recorded trajectory, in bytes.
    pub fn recorded_bytes(&self) -> Option<usize> {
        self.recorded_states()?
            .checked_mul(std::mem::size_of::<mrsim_core::Magnetization>())
    }

    /// Check sizing invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.cell_count == 0 || self.sample_count == 0 {
            return Err(ArenaError::EmptyArena);
        }
        match self.recorded_states() {
            Some(n) if n <= self.max_recorded_states => Ok(()),
            requested => Err(ArenaError::CapacityExceeded {
                requested: requested.unwrap_or(usize::MAX),
                capacity: self.max_recorded_states,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ArenaConfig::new(50, 401);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.recorded_states(), Some(20_050));
        assert_eq!(cfg.recorded_bytes(), Some(20_050 * 32));
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert_eq!(ArenaConfig::new(0, 10).validate(), Err(ArenaError::EmptyArena));
        assert_eq!(ArenaConfig::new(10, 0).validate(), Err(ArenaError::EmptyArena));
    }

    #[test]
    fn oversized_trajectory_is_rejected() {
        let cfg = ArenaConfig {
            max_recorded_states: 100,
            ..ArenaConfig::new(11, 10)
        };
        assert_eq!(
            cfg.validate(),
            Err(ArenaError::CapacityExceeded {
                requested: 110,
                capacity: 100
            })
        );
    }
}
