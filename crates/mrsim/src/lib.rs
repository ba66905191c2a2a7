//! mrsim: magnetic-resonance sequence simulation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all mrsim sub-crates. For most users, adding `mrsim` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use mrsim::prelude::*;
//!
//! // RF-spoiled gradient echo with a 117° phase increment.
//! let config = SpoilingConfig {
//!     phase_step: 117.0 * DEG,
//!     repetitions: Some(40),
//!     ..SpoilingConfig::default()
//! };
//! let out = experiments::rf_spoiling_evolution(&config).unwrap();
//! let signal = out.get("signal").unwrap();
//! assert_eq!(signal.len(), 40);
//! assert!(out.runtime_label().starts_with("Runtime: "));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `mrsim-core` | Species, magnetization, timeline, series, errors |
//! | [`physics`] | `mrsim-physics` | Bloch operators, phase graph, hard-pulse decomposition |
//! | [`arena`] | `mrsim-arena` | Ping-pong state buffers and trajectories |
//! | [`space`] | `mrsim-space` | Isochromat position layouts |
//! | [`propagator`] | `mrsim-propagator` | Propagator trait and pipeline validation |
//! | [`propagators`] | `mrsim-propagators` | Pulse rotation and free precession |
//! | [`engine`] | `mrsim-engine` | Scheduler, tick engine and experiments |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, units and errors (`mrsim-core`).
pub use mrsim_core as types;

/// Physics primitives (`mrsim-physics`).
///
/// [`physics::Operator`] for single isochromats and
/// [`physics::PhaseGraph`] for coherence-order bookkeeping.
pub use mrsim_physics as physics;

/// State buffers and recorded trajectories (`mrsim-arena`).
pub use mrsim_arena as arena;

/// Isochromat positions (`mrsim-space`).
pub use mrsim_space as space;

/// Propagator trait and pipeline validation (`mrsim-propagator`).
///
/// The [`propagator::Propagator`] trait is the extension point for
/// custom per-sample physics in ensemble runs.
pub use mrsim_propagator as propagator;

/// Reference propagators (`mrsim-propagators`).
pub use mrsim_propagators as propagators;

/// Scheduling, ensemble runs and phase-graph experiments (`mrsim-engine`).
pub use mrsim_engine as engine;

/// Experiment pipelines producing named plot series.
pub use mrsim_engine::experiments;

/// Common imports for typical mrsim usage.
///
/// ```rust
/// use mrsim::prelude::*;
/// ```
pub mod prelude {
    // Core types and units
    pub use mrsim_core::units::{DEG, MM, MS, MT_PER_M};
    pub use mrsim_core::{Complex64, Magnetization, Series, Species, Tick, Timeline, GAMMA};

    // Errors
    pub use mrsim_core::{PropagatorError, SimulationError, StepError};

    // Physics
    pub use mrsim_physics::{Operator, PhaseGraph, PhaseGraphEvent, Pulse};

    // Space and propagators
    pub use mrsim_propagator::{Propagator, StepContext};
    pub use mrsim_space::{Line1D, Space};

    // Engine
    pub use mrsim_engine::{
        ContrastConfig, ContrastPreset, EfficiencyConfig, EnsembleConfig, ExperimentOutput,
        RunMetrics, SequenceParameters, SliceProfileConfig, SpoilingConfig,
    };
    pub use mrsim_engine::experiments;
}
