//! Integration test: the ensemble pipeline agrees with the phase graph.
//!
//! One isochromat at the gradient origin, driven through `PulseRotation`
//! and `FreePrecession` by the tick engine, must end where a phase graph
//! driven through a single rectangular hard-pulse sub-pulse and the same
//! free interval ends. A pipeline built for one timeline must also refuse
//! a timeline whose events it was not prepared for.

use std::f64::consts::PI;

use mrsim_core::{
    Magnetization, PropagatorError, PulseRole, Sample, SimulationError, Species, StepError, Tick,
    Timeline, TimelineEvent,
};
use mrsim_engine::ensemble::ensemble_pipeline;
use mrsim_engine::{propagate, schedule, SequenceParameters};
use mrsim_physics::{Envelope, HardPulseApproximation, PhaseGraph, PhaseGraphEvent, Pulse};
use mrsim_propagator::Propagator;
use mrsim_propagators::{FreePrecession, PulseRotation};
use mrsim_space::Line1D;
use proptest::prelude::*;

const STEP: Tick = Tick(10);

/// Excitation at tick 0 followed by `intervals` gradient-free steps.
fn excite_then_relax(angle: f64, phase: f64, intervals: usize) -> Timeline {
    let pulse = Sample {
        index: 0,
        tick: Tick(0),
        event: TimelineEvent::Pulse {
            role: PulseRole::Excitation,
            angle,
            phase,
        },
    };
    let rest = (1..=intervals).map(|index| Sample {
        index,
        tick: Tick(index as u64 * STEP.0),
        event: TimelineEvent::GradientInterval {
            duration: STEP.as_seconds(),
            amplitude: 0.0,
        },
    });
    Timeline::new(std::iter::once(pulse).chain(rest).collect(), STEP, 0.0)
}

fn engine_state(species: &Species, angle: f64, phase: f64, executed: usize) -> Magnetization {
    let space = Line1D::from_positions(vec![0.0]).unwrap();
    let timeline = excite_then_relax(angle, phase, executed);
    let props: Vec<Box<dyn Propagator>> = vec![
        Box::new(PulseRotation::new(Pulse::new(angle, phase), Pulse::new(PI, 0.0))),
        Box::new(FreePrecession::new(
            species,
            timeline.time_step(),
            timeline.readout_gradient(),
            &space,
        )),
    ];
    let out = propagate(&props, &space, &timeline, 1, usize::MAX).unwrap();
    out.trajectory.sample(executed).unwrap()[0]
}

fn graph_state(species: &Species, angle: f64, phase: f64, duration: f64) -> PhaseGraph {
    let train = HardPulseApproximation::new(
        Pulse::new(angle, phase),
        &[0.0],
        Envelope::Rectangular,
        1e3,
        1e-3,
    )
    .unwrap();
    let graph = train
        .events()
        .chain([PhaseGraphEvent::TimeInterval {
            duration,
            gradient: 0.0,
        }])
        .try_fold(PhaseGraph::new(*species), |g, e| g.evolve(&e))
        .unwrap();
    graph
}

#[test]
fn single_isochromat_matches_hard_pulse_graph() {
    let species = Species::new(0.6, 0.4);
    let (angle, phase) = (0.8, 0.4);
    let m = engine_state(&species, angle, phase, 2);
    let graph = graph_state(&species, angle, phase, 2.0 * STEP.as_seconds());
    assert!((graph.echo() - m.transverse()).norm() < 1e-12);
    assert!((graph.states()[0].z.re - m.z).abs() < 1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pipeline_and_graph_agree(
        t1 in 0.05f64..2.0,
        t2 in 0.01f64..0.5,
        angle in 0.0f64..PI,
        phase in -PI..PI,
        executed in 1usize..6,
    ) {
        let species = Species::new(t1, t2);
        let m = engine_state(&species, angle, phase, executed);
        let duration = executed as f64 * STEP.as_seconds();
        let graph = graph_state(&species, angle, phase, duration);
        prop_assert!((graph.echo() - m.transverse()).norm() < 1e-10);
        prop_assert!((graph.states()[0].z.re - m.z).abs() < 1e-10);
    }
}

#[test]
fn pipeline_refuses_a_timeline_with_another_gradient() {
    let params = SequenceParameters {
        repetition_time: Tick(400),
        repetitions: 1,
        ..SequenceParameters::default()
    };
    let prepared = schedule(&params, 1e-3).unwrap();
    let other = schedule(&params, 2e-3).unwrap();
    assert_ne!(prepared.readout_gradient(), other.readout_gradient());

    let space = Line1D::centered(1e-3, 4).unwrap();
    let props = ensemble_pipeline(&Species::new(0.6, 0.4), &params, &prepared, &space);
    assert!(propagate(&props, &space, &prepared, 1, usize::MAX).is_ok());

    let err = propagate(&props, &space, &other, 1, usize::MAX).unwrap_err();
    match err {
        SimulationError::Step(StepError::PropagatorFailed {
            name,
            sample,
            reason,
        }) => {
            assert_eq!(name, "free_precession");
            assert_eq!(sample, 1);
            assert!(matches!(reason, PropagatorError::ExecutionFailed { .. }));
        }
        other => panic!("expected PropagatorFailed, got {other:?}"),
    }
}

#[test]
fn pipeline_refuses_a_pulse_it_was_not_built_for() {
    let species = Species::new(0.6, 0.4);
    let space = Line1D::from_positions(vec![0.0]).unwrap();
    let timeline = excite_then_relax(0.8, 0.4, 2);
    let props: Vec<Box<dyn Propagator>> = vec![
        Box::new(PulseRotation::new(Pulse::new(0.5, 0.4), Pulse::new(PI, 0.0))),
        Box::new(FreePrecession::new(&species, timeline.time_step(), 0.0, &space)),
    ];
    let err = propagate(&props, &space, &timeline, 1, usize::MAX).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Step(StepError::PropagatorFailed { sample: 0, .. })
    ));
}
