//! Benchmark profiles for the mrsim simulation toolkit.
//!
//! Provides pre-built configurations for benchmarking:
//!
//! - [`reference_profile`]: the four-TR spin-echo train on 50 isochromats
//! - [`stress_profile`]: the same train on 2000 isochromats
//! - [`spoiling_profile`]: a 160-repetition RF-spoiled train at 117°
//! - [`slice_profile_profile`]: 90° sinc pulse with 101 sub-pulses

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use mrsim_core::units::{DEG, MS};
use mrsim_core::Species;
use mrsim_engine::{EnsembleConfig, SliceProfileConfig, SpoilingConfig};

/// Build the reference ensemble profile: 50 positions, 401 samples.
///
/// T1 = 600 ms, T2 = 400 ms, TE = 200 ms, TR = 1000 ms, three echoes per
/// TR, four repetitions.
pub fn reference_profile(workers: usize) -> EnsembleConfig {
    EnsembleConfig {
        species: Species::new(600.0 * MS, 400.0 * MS),
        worker_count: Some(workers),
        ..EnsembleConfig::default()
    }
}

/// Build a stress ensemble profile: same sequence, 2000 positions.
pub fn stress_profile(workers: usize) -> EnsembleConfig {
    EnsembleConfig {
        position_count: 2000,
        ..reference_profile(workers)
    }
}

/// RF-spoiled train with T1 = T2 = 1 s and a 117° increment.
pub fn spoiling_profile() -> SpoilingConfig {
    SpoilingConfig {
        species: Species::new(1.0, 1.0),
        phase_step: 117.0 * DEG,
        ..SpoilingConfig::default()
    }
}

/// Default sinc-pulse slice profile.
pub fn slice_profile_profile() -> SliceProfileConfig {
    SliceProfileConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_validates() {
        reference_profile(1).validate().unwrap();
    }

    #[test]
    fn stress_profile_validates() {
        let config = stress_profile(4);
        config.validate().unwrap();
        assert_eq!(config.resolved_worker_count(), 4);
    }

    #[test]
    fn spoiling_profile_runs_four_t1() {
        let config = spoiling_profile();
        config.validate().unwrap();
        assert_eq!(config.resolved_repetitions(), 160);
    }

    #[test]
    fn slice_profile_profile_validates() {
        slice_profile_profile().validate().unwrap();
    }
}
