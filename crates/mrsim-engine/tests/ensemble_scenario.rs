//! Integration test: spin-echo train on the reference ensemble.
//!
//! T1 = 600 ms, T2 = 400 ms, TE = 200 ms, TR = 1000 ms, three echoes per
//! TR, four repetitions, 10 ms sampling, 50 positions over 1 mm.

use mrsim_core::units::MS;
use mrsim_core::{Species, Tick};
use mrsim_engine::{simulate_ensemble, EnsembleConfig, SequenceParameters};
use mrsim_test_utils::assert_close;
use mrsim_test_utils::scenarios::ECHO_TRAIN_SPECIES;

fn reference(workers: usize) -> EnsembleConfig {
    EnsembleConfig {
        species: ECHO_TRAIN_SPECIES,
        worker_count: Some(workers),
        ..EnsembleConfig::default()
    }
}

#[test]
fn echoes_peak_at_odd_multiples_of_half_te() {
    let out = simulate_ensemble(&reference(1)).unwrap();
    assert_eq!(out.magnitude.len(), 401);

    // Echo k forms at TE/2·(2k+1) after the refocalization at TE·k + TE/2,
    // which is (k+1)·TE from the excitation.
    for (sample, t) in [(20, 200.0), (40, 400.0), (60, 600.0)] {
        assert_close(out.times_ms[sample], t, 1e-9);
        assert_close(out.magnitude[sample], (-t * MS / 0.4).exp(), 1e-9);
    }
    // Between echoes the readout gradient dephases the voxel.
    assert!(out.magnitude[10] < 0.05);
    assert!(out.magnitude[30] < out.magnitude[20]);
}

#[test]
fn later_repetitions_start_from_partial_recovery() {
    let out = simulate_ensemble(&reference(1)).unwrap();
    let second_tr = out.magnitude[120];
    assert!(second_tr > 0.25 && second_tr < 0.35, "{second_tr}");
    assert!(second_tr < out.magnitude[20]);
    // Steady state is reached after one TR.
    assert_close(out.magnitude[220], second_tr, 1e-2);
}

#[test]
fn free_induction_decay_follows_t2() {
    let config = EnsembleConfig {
        sequence: SequenceParameters {
            train_length: 0,
            repetition_time: Tick(400),
            repetitions: 1,
            ..SequenceParameters::default()
        },
        position_count: 9,
        worker_count: Some(1),
        ..EnsembleConfig::default()
    };
    let out = simulate_ensemble(&config).unwrap();
    for (i, signals) in out.signals.iter().enumerate().skip(1) {
        let expected = (-(i as f64) * 10.0 * MS / 0.4).exp();
        for s in signals {
            assert_close(s.norm(), expected, 1e-9);
        }
    }
}

#[test]
fn parallel_run_matches_sequential() {
    let sequential = simulate_ensemble(&reference(1)).unwrap();
    let parallel = simulate_ensemble(&reference(4)).unwrap();
    assert_eq!(parallel.metrics.worker_count, 4);
    assert_eq!(sequential.signals, parallel.signals);
    assert_eq!(sequential.magnitude, parallel.magnitude);
}

#[test]
fn slower_t2_keeps_more_signal() {
    let fast = simulate_ensemble(&reference(2)).unwrap();
    let slow = simulate_ensemble(&EnsembleConfig {
        species: Species::new(0.6, 0.8),
        ..reference(2)
    })
    .unwrap();
    for sample in [20, 40, 60] {
        assert!(slow.magnitude[sample] > fast.magnitude[sample]);
    }
}

#[test]
fn invalid_timing_is_rejected() {
    let config = EnsembleConfig {
        sequence: SequenceParameters {
            echo_time: Tick(210),
            ..SequenceParameters::default()
        },
        ..reference(1)
    };
    assert!(simulate_ensemble(&config).is_err());
}
