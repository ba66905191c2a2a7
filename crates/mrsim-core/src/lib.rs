//! Core types for the mrsim simulation toolkit.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other crate in the workspace: tick
//! identifiers, the relaxation [`Species`], the four-component
//! [`Magnetization`] record, the sequence [`Timeline`], output [`Series`],
//! physical constants, and the error enums.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod magnetization;
pub mod series;
pub mod species;
pub mod timeline;
pub mod units;

pub use error::{
    PhaseGraphError, PropagatorError, PulseError, SequenceError, SimulationError, StepError,
};
pub use id::Tick;
pub use magnetization::Magnetization;
pub use num_complex::Complex64;
pub use series::Series;
pub use species::Species;
pub use timeline::{PulseRole, Sample, Timeline, TimelineEvent};
pub use units::GAMMA;
