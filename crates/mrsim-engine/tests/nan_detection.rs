//! Integration test: NaN detection across parallel workers.
//!
//! A propagator poisons one isochromat part-way through the run. The
//! engine must stop, report the global position, and never publish the
//! poisoned state.

use std::sync::atomic::{AtomicUsize, Ordering};

use mrsim_core::{Magnetization, PropagatorError, SimulationError, StepError, Tick};
use mrsim_engine::{propagate, schedule, SequenceParameters, TickEngine};
use mrsim_propagator::{Propagator, StepContext};
use mrsim_space::Line1D;

// ── Poisoning propagator ─────────────────────────────────────────────

/// Writes NaN into one global position once `from_sample` is reached.
struct PoisonAt {
    position: usize,
    from_sample: usize,
    calls: AtomicUsize,
}

impl PoisonAt {
    fn new(position: usize, from_sample: usize) -> Self {
        Self {
            position,
            from_sample,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Propagator for PoisonAt {
    fn name(&self) -> &str {
        "poison_at"
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if ctx.sample().index < self.from_sample || !ctx.cells().contains(&self.position) {
            return Ok(());
        }
        let local = self.position - ctx.cells().start;
        ctx.states()[local].x = f64::NAN;
        Ok(())
    }
}

fn timeline() -> mrsim_core::Timeline {
    let params = SequenceParameters {
        repetition_time: Tick(400),
        repetitions: 1,
        ..SequenceParameters::default()
    };
    schedule(&params, 1e-3).unwrap()
}

#[test]
fn poisoned_position_is_reported_globally() {
    let space = Line1D::centered(1e-3, 8).unwrap();
    let props: Vec<Box<dyn Propagator>> = vec![Box::new(PoisonAt::new(5, 7))];
    let err = propagate(&props, &space, &timeline(), 2, usize::MAX).unwrap_err();
    assert_eq!(
        err,
        SimulationError::Step(StepError::PropagatorFailed {
            name: "poison_at".into(),
            sample: 7,
            reason: PropagatorError::NanDetected { position: 5 },
        })
    );
}

#[test]
fn poisoned_step_is_not_published() {
    let props: Vec<Box<dyn Propagator>> = vec![Box::new(PoisonAt::new(2, 3))];
    let timeline = timeline();
    let mut engine = TickEngine::new(&props, 0..4, 0.01, Magnetization::EQUILIBRIUM).unwrap();
    for sample in &timeline.samples()[..3] {
        engine.execute_sample(sample).unwrap();
    }
    assert!(engine.execute_sample(&timeline.samples()[3]).is_err());
    assert_eq!(engine.generation(), 3);
    assert!(engine.published().iter().all(|m| m.x.is_finite()));
}

#[test]
fn healthy_chunks_do_not_mask_the_failure() {
    let space = Line1D::centered(1e-3, 16).unwrap();
    let props: Vec<Box<dyn Propagator>> = vec![Box::new(PoisonAt::new(0, 1))];
    let err = propagate(&props, &space, &timeline(), 4, usize::MAX).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Step(StepError::PropagatorFailed {
            reason: PropagatorError::NanDetected { position: 0 },
            ..
        })
    ));
}
