//! Tick engine: advances isochromats through a timeline.
//!
//! [`TickEngine`] owns the double-buffered arena for one contiguous
//! position range and runs the propagator pipeline once per sample, with
//! rollback atomicity: a failing propagator or a non-finite state
//! abandons the staging buffer and leaves the published state untouched.
//!
//! [`propagate()`] splits the ensemble across workers, runs one engine
//! per chunk on a scoped thread, and stitches the recorded trajectories
//! back together. Positions never interact, so the result is identical
//! for every worker count.

use std::ops::Range;
use std::time::Instant;

use crossbeam_channel::bounded;
use indexmap::IndexMap;
use mrsim_arena::{ArenaConfig, PingPongArena, Trajectory};
use mrsim_core::{Magnetization, PropagatorError, Sample, SimulationError, StepError, Timeline};
use mrsim_propagator::{validate_pipeline, PipelinePlan, Propagator, StepContext};
use mrsim_space::Space;
use tracing::{debug, trace};

use crate::config::ConfigError;

// ── TickEngine ───────────────────────────────────────────────────

/// Single-threaded engine for one contiguous range of positions.
pub struct TickEngine<'a> {
    arena: PingPongArena,
    propagators: &'a [Box<dyn Propagator>],
    cells: Range<usize>,
    time_step: f64,
    propagator_us: IndexMap<String, u64>,
}

impl<'a> TickEngine<'a> {
    /// Create an engine for `cells`, every isochromat starting at
    /// `initial`.
    ///
    /// The pipeline is assumed to have passed
    /// [`validate_pipeline()`] for the ensemble and `time_step`.
    pub fn new(
        propagators: &'a [Box<dyn Propagator>],
        cells: Range<usize>,
        time_step: f64,
        initial: Magnetization,
    ) -> Result<Self, ConfigError> {
        let config = ArenaConfig::new(cells.len(), 1);
        let arena = PingPongArena::new(&config, initial)?;
        let propagator_us = propagators
            .iter()
            .map(|p| (p.name().to_string(), 0))
            .collect();
        Ok(Self {
            arena,
            propagators,
            cells,
            time_step,
            propagator_us,
        })
    }

    /// The position range this engine advances.
    pub fn cells(&self) -> Range<usize> {
        self.cells.clone()
    }

    /// The state after the last successful sample.
    pub fn published(&self) -> &[Magnetization] {
        self.arena.published()
    }

    /// Number of samples executed so far.
    pub fn generation(&self) -> u64 {
        self.arena.generation()
    }

    /// Accumulated execution time per propagator, in microseconds.
    pub fn propagator_us(&self) -> &IndexMap<String, u64> {
        &self.propagator_us
    }

    /// Execute one sample: every propagator in pipeline order, then
    /// publish.
    ///
    /// After each propagator the staged states are checked for NaN or
    /// infinity. On any failure the step is abandoned.
    pub fn execute_sample(&mut self, sample: &Sample) -> Result<(), StepError> {
        let staging = self
            .arena
            .begin_step()
            .map_err(|e| StepError::WorkerFailed {
                reason: e.to_string(),
            })?;

        let mut outcome = Ok(());
        for prop in self.propagators {
            let start = Instant::now();
            let mut ctx =
                StepContext::new(sample, &mut *staging, self.cells.start, self.time_step);
            let mut result = prop.step(&mut ctx);
            if result.is_ok() {
                if let Some(i) = staging.iter().position(|m| !m.is_finite()) {
                    result = Err(PropagatorError::NanDetected {
                        position: self.cells.start + i,
                    });
                }
            }
            if let Err(reason) = result {
                outcome = Err(StepError::PropagatorFailed {
                    name: prop.name().to_string(),
                    sample: sample.index,
                    reason,
                });
                break;
            }
            if let Some(total) = self.propagator_us.get_mut(prop.name()) {
                *total += start.elapsed().as_micros() as u64;
            }
        }

        match outcome {
            Ok(()) => self.arena.publish().map_err(|e| StepError::WorkerFailed {
                reason: e.to_string(),
            }),
            Err(e) => {
                self.arena.abandon();
                Err(e)
            }
        }
    }

    /// Run every sample of `timeline` but the last, recording the initial
    /// state and the state after each sample.
    ///
    /// The trajectory ends at the final sample, whose event never runs.
    pub fn run(&mut self, timeline: &Timeline, trajectory: &mut Trajectory) -> Result<(), StepError> {
        let record = |trajectory: &mut Trajectory, states: &[Magnetization]| {
            trajectory
                .record(states)
                .map_err(|e| StepError::WorkerFailed {
                    reason: format!("trajectory: {e}"),
                })
        };
        record(trajectory, self.arena.published())?;
        let executed = timeline.len().saturating_sub(1);
        for sample in &timeline.samples()[..executed] {
            self.execute_sample(sample)?;
            record(trajectory, self.arena.published())?;
        }
        trace!(
            cells = ?self.cells,
            samples = executed,
            "chunk complete"
        );
        Ok(())
    }
}

// ── Parallel driver ──────────────────────────────────────────────

/// Output of [`propagate()`].
#[derive(Clone, Debug)]
pub struct Propagation {
    /// Every isochromat state at every sample.
    pub trajectory: Trajectory,
    /// Execution time per propagator summed over workers, in microseconds.
    pub propagator_us: IndexMap<String, u64>,
    /// Number of workers that ran.
    pub worker_count: usize,
}

struct ChunkReport {
    trajectory: Trajectory,
    propagator_us: IndexMap<String, u64>,
}

fn run_chunk(
    propagators: &[Box<dyn Propagator>],
    timeline: &Timeline,
    cells: Range<usize>,
    max_recorded_states: usize,
) -> Result<ChunkReport, SimulationError> {
    let config = ArenaConfig {
        max_recorded_states,
        ..ArenaConfig::new(cells.len(), timeline.len())
    };
    let mut trajectory = Trajectory::new(&config).map_err(ConfigError::from)?;
    let mut engine = TickEngine::new(
        propagators,
        cells,
        timeline.time_step(),
        Magnetization::EQUILIBRIUM,
    )?;
    engine.run(timeline, &mut trajectory)?;
    Ok(ChunkReport {
        trajectory,
        propagator_us: engine.propagator_us,
    })
}

/// Sum chunk timings into per-propagator totals keyed in pipeline order.
fn pipeline_timings<'r>(
    plan: &PipelinePlan,
    chunks: impl IntoIterator<Item = &'r IndexMap<String, u64>>,
) -> IndexMap<String, u64> {
    let mut totals: IndexMap<String, u64> = plan.names().map(|n| (n.to_owned(), 0)).collect();
    for chunk in chunks {
        for (name, us) in chunk {
            if let Some(total) = totals.get_mut(name) {
                *total += us;
            }
        }
    }
    totals
}

/// Advance every position of `space` through `timeline`.
///
/// Validates the pipeline, splits the positions into at most
/// `worker_count` contiguous chunks and runs each on its own scoped
/// thread. Results travel back over a channel and are merged in position
/// order. The first failure by position order is returned.
pub fn propagate(
    propagators: &[Box<dyn Propagator>],
    space: &dyn Space,
    timeline: &Timeline,
    worker_count: usize,
    max_recorded_states: usize,
) -> Result<Propagation, SimulationError> {
    let plan =
        validate_pipeline(propagators, space, timeline.time_step()).map_err(ConfigError::from)?;
    let cell_count = space.cell_count();
    let arena_config = ArenaConfig {
        max_recorded_states,
        ..ArenaConfig::new(cell_count, timeline.len())
    };
    arena_config.validate().map_err(ConfigError::from)?;

    let chunks = space.partition(worker_count);
    debug!(
        positions = cell_count,
        samples = timeline.len(),
        propagators = plan.len(),
        workers = chunks.len(),
        "propagating ensemble"
    );

    if chunks.len() <= 1 {
        let report = run_chunk(propagators, timeline, 0..cell_count, max_recorded_states)?;
        return Ok(Propagation {
            propagator_us: pipeline_timings(&plan, [&report.propagator_us]),
            trajectory: report.trajectory,
            worker_count: 1,
        });
    }

    let (tx, rx) = bounded(chunks.len());
    let panicked = std::thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .iter()
            .cloned()
            .map(|cells| {
                let tx = tx.clone();
                scope.spawn(move || {
                    let report =
                        run_chunk(propagators, timeline, cells.clone(), max_recorded_states);
                    // The receiver outlives the scope.
                    let _ = tx.send((cells, report));
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join())
            .filter(Result::is_err)
            .count()
    });
    drop(tx);

    let mut reports: Vec<(Range<usize>, Result<ChunkReport, SimulationError>)> =
        rx.iter().collect();
    reports.sort_by_key(|(cells, _)| cells.start);
    if panicked > 0 || reports.len() != chunks.len() {
        return Err(StepError::WorkerFailed {
            reason: format!(
                "{} of {} workers did not report",
                chunks.len() - reports.len(),
                chunks.len()
            ),
        }
        .into());
    }

    let mut parts = Vec::with_capacity(reports.len());
    let mut timings = Vec::with_capacity(reports.len());
    for (cells, report) in reports {
        let report = report?;
        timings.push(report.propagator_us);
        parts.push((cells, report.trajectory));
    }
    let propagator_us = pipeline_timings(&plan, &timings);
    let trajectory = Trajectory::merge(cell_count, parts).map_err(ConfigError::from)?;
    Ok(Propagation {
        trajectory,
        propagator_us,
        worker_count: chunks.len(),
    })
}
