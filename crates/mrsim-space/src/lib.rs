//! Isochromat position layouts.
//!
//! This crate defines the [`Space`] trait, through which propagators look
//! up the physical position of every isochromat they advance, and the
//! [`Line1D`] backend: positions spread along the readout axis of a voxel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod line1d;
pub mod space;

pub use error::SpaceError;
pub use line1d::{linspace, Line1D};
pub use space::Space;
