//! Physics primitives for the mrsim toolkit.
//!
//! - [`Operator`]: 4×4 homogeneous Bloch operators for single isochromats
//!   (pulse rotations, relaxation with precession).
//! - [`PhaseGraph`]: extended-phase-graph state, a table of coherence
//!   orders evolved by pulses and gradient intervals.
//! - [`HardPulseApproximation`]: decomposition of a shaped pulse into a
//!   train of hard sub-pulses separated by slice-select gradient steps.
//!
//! Quantities are in SI units throughout.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bloch;
pub mod epg;
pub mod pulse;

pub use bloch::Operator;
pub use epg::{OrderState, PhaseGraph, PhaseGraphEvent};
pub use pulse::{centered_support, Envelope, HardPulseApproximation, Pulse, TimeInterval};
