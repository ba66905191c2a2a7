//! Ensemble propagators for mrsim.
//!
//! # Pipeline order (each sample)
//!
//! 1. [`PulseRotation`]: applies the sample's RF pulse, if any
//! 2. [`FreePrecession`]: one time step of relaxation and precession under
//!    the readout gradient, at each isochromat's position

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod free_precession;
pub mod pulse_rotation;

pub use free_precession::FreePrecession;
pub use pulse_rotation::PulseRotation;

/// Relative tolerance when checking an event's payload against the values
/// baked into a propagator's operators.
const PAYLOAD_TOLERANCE: f64 = 1e-12;

fn payload_matches(event: f64, prepared: f64) -> bool {
    (event - prepared).abs() <= PAYLOAD_TOLERANCE * prepared.abs().max(1.0)
}
