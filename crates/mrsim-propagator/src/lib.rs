//! Propagator trait and step context for mrsim ensemble simulations.
//!
//! A [`Propagator`] advances a contiguous range of isochromats through one
//! timeline sample. Propagators are stateless (`&self`) so one pipeline
//! can be shared by every worker of a parallel run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod propagator;

pub use context::StepContext;
pub use pipeline::{validate_pipeline, PipelineError, PipelinePlan};
pub use propagator::Propagator;
