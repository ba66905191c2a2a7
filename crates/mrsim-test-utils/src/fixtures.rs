//! Reusable propagator test fixtures.
//!
//! - [`ConstPropagator`]: overwrites every state with a fixed value.
//! - [`FailingPropagator`]: fails deterministically after N calls.
//! - [`RecordingPropagator`]: logs the sample index of every call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mrsim_core::{Magnetization, PropagatorError};
use mrsim_propagator::{Propagator, StepContext};

/// Writes a constant magnetization to all positions.
///
/// A non-finite value exercises the engine's NaN sentinel.
pub struct ConstPropagator {
    pub name: String,
    pub value: Magnetization,
}

impl ConstPropagator {
    pub fn new(name: impl Into<String>, value: Magnetization) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Propagator for ConstPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        ctx.states().fill(self.value);
        Ok(())
    }
}

/// Fails deterministically after a configurable number of successful calls.
///
/// The counter is shared by every worker holding the pipeline, so in a
/// parallel run the failure lands on whichever worker makes the first
/// call past the limit.
pub struct FailingPropagator {
    pub name: String,
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingPropagator {
    /// Create a propagator that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }
}

impl Propagator for FailingPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(PropagatorError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }
}

/// Records the index of every sample it is stepped through.
///
/// States are left untouched. Keep the handle from
/// [`samples`](RecordingPropagator::samples) before boxing the
/// propagator into a pipeline.
pub struct RecordingPropagator {
    pub name: String,
    seen: Arc<Mutex<Vec<usize>>>,
}

impl RecordingPropagator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of visited sample indices, in call order.
    pub fn samples(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.seen)
    }
}

impl Propagator for RecordingPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let index = ctx.sample().index;
        self.seen
            .lock()
            .map_err(|_| PropagatorError::ExecutionFailed {
                reason: "sample log poisoned".into(),
            })?
            .push(index);
        Ok(())
    }
}
