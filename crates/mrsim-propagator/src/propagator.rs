//! The [`Propagator`] trait.
//!
//! Propagators are stateless operators executed in sequence for every
//! sample. Anything they precompute (operators, per-position tables) is
//! fixed at construction and declared through [`Propagator::cell_count`]
//! and [`Propagator::time_step`] so the pipeline can be checked once at
//! startup.

use crate::context::StepContext;
use mrsim_core::PropagatorError;

/// A stateless operator in the per-sample pipeline.
///
/// # Contract
///
/// - `step()` MUST be deterministic and MUST only touch `ctx.states()`.
/// - `step()` may be called concurrently on disjoint position ranges.
/// - `cell_count()` and `time_step()` are called once at startup.
///
/// # Examples
///
/// A propagator that spoils all transverse magnetization:
///
/// ```
/// use mrsim_propagator::{Propagator, StepContext};
/// use mrsim_core::PropagatorError;
///
/// struct Crusher;
///
/// impl Propagator for Crusher {
///     fn name(&self) -> &str { "crusher" }
///
///     fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
///         for m in ctx.states() {
///             m.x = 0.0;
///             m.y = 0.0;
///         }
///         Ok(())
///     }
/// }
///
/// assert_eq!(Crusher.name(), "crusher");
/// assert_eq!(Crusher.cell_count(), None);
/// ```
pub trait Propagator: Send + Sync + 'static {
    /// Human-readable name for error reporting and timing metrics.
    fn name(&self) -> &str;

    /// Number of positions this propagator holds per-position data for.
    ///
    /// The pipeline rejects a space of a different size. Default: `None`
    /// (position-independent).
    fn cell_count(&self) -> Option<usize> {
        None
    }

    /// Time step, in seconds, baked into precomputed operators.
    ///
    /// The pipeline rejects a timeline sampled at a different step.
    /// Default: `None` (step-independent).
    fn time_step(&self) -> Option<f64> {
        None
    }

    /// Advance `ctx.states()` through the sample in `ctx.sample()`.
    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError>;
}
