//! Execution context passed to propagators for one sample.

use std::ops::Range;

use mrsim_core::{Magnetization, Sample, TimelineEvent};

/// Execution context passed to each propagator's `step()` method.
///
/// Holds the isochromats of one contiguous position range. `states()` is
/// the in-step view, already updated by earlier propagators of this
/// sample; index `i` is global position `cells().start + i`.
pub struct StepContext<'a> {
    sample: &'a Sample,
    states: &'a mut [Magnetization],
    cells: Range<usize>,
    time_step: f64,
}

impl<'a> StepContext<'a> {
    /// Construct a new step context.
    ///
    /// Typically called by the engine, not by propagators directly.
    pub fn new(
        sample: &'a Sample,
        states: &'a mut [Magnetization],
        first_cell: usize,
        time_step: f64,
    ) -> Self {
        let cells = first_cell..first_cell + states.len();
        Self {
            sample,
            states,
            cells,
            time_step,
        }
    }

    /// The sample being advanced.
    pub fn sample(&self) -> &Sample {
        self.sample
    }

    /// The event firing at the start of the sample.
    pub fn event(&self) -> &TimelineEvent {
        &self.sample.event
    }

    /// Mutable in-step states of this context's positions.
    pub fn states(&mut self) -> &mut [Magnetization] {
        self.states
    }

    /// Global position indices covered by this context.
    pub fn cells(&self) -> Range<usize> {
        self.cells.clone()
    }

    /// Sampling interval of the timeline, in seconds.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }
}
