//! Simulation engine for mrsim experiments.
//!
//! Turns sequence parameters into a discrete [`Timeline`](mrsim_core::Timeline)
//! and drives it through either an isochromat ensemble or a single
//! phase graph:
//!
//! - [`schedule`]: sequence parameters to timeline.
//! - [`tick`]: the per-chunk tick engine and the parallel [`propagate`] driver.
//! - [`ensemble`]: spin-echo train on an isochromat ensemble.
//! - [`spoiling`]: RF-spoiled steady state and the phase-increment sweep.
//! - [`slice_profile`]: excitation profile of a shaped pulse.
//! - [`contrast`]: spin-echo signal against T1 and T2.
//! - [`experiments`]: the above packaged as named plot series.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod contrast;
pub mod ensemble;
pub mod experiments;
pub mod metrics;
pub mod schedule;
pub mod slice_profile;
pub mod spoiling;
pub mod tick;

pub use config::{
    default_repetitions, ConfigError, ContrastConfig, ContrastPreset, EfficiencyConfig,
    EnsembleConfig, SliceProfileConfig, SpoilingConfig,
};
pub use contrast::{spin_echo_contrast, spin_echo_signal, ContrastOutput};
pub use ensemble::{simulate_ensemble, summarize, EnsembleOutput, SignalSummary};
pub use experiments::ExperimentOutput;
pub use metrics::{to_eng_string, RunMetrics};
pub use schedule::{schedule, Scheduler, SequenceParameters};
pub use slice_profile::{slice_profile, SliceProfile, Spectrum};
pub use spoiling::{
    ideal_spoiling, rf_spoiling, spoiling_efficiency, spoiling_phase, EfficiencyOutput,
    SpoilingOutput,
};
pub use tick::{propagate, Propagation, TickEngine};
