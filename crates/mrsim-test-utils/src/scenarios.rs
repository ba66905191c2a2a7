//! Reference scenarios shared by the engine tests and benchmarks.

use mrsim_core::Species;

/// Spin-echo train species: T1 = 600 ms, T2 = 400 ms.
pub const ECHO_TRAIN_SPECIES: Species = Species { t1: 0.6, t2: 0.4 };

/// RF-spoiling species: T1 = T2 = 1000 ms.
pub const SPOILING_SPECIES: Species = Species { t1: 1.0, t2: 1.0 };

/// Slice-profile species: T1 = 600 ms, T2 = 400 ms.
pub const SLICE_SPECIES: Species = Species { t1: 0.6, t2: 0.4 };

/// Relaxation times of the spoiling scenario give this many repetitions
/// at TR = 25 ms: `floor(4·T1/TR)`.
pub const SPOILING_REPETITIONS: usize = 160;
