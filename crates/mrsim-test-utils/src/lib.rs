//! Test utilities and mock propagators for mrsim development.
//!
//! Provides reusable [`Propagator`](mrsim_propagator::Propagator)
//! fixtures for engine tests, the reference [`scenarios`], and tolerance
//! assertions for numeric results.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod scenarios;

pub use fixtures::{ConstPropagator, FailingPropagator, RecordingPropagator};

/// Assert that `actual` is within `tolerance` of `expected`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

/// Assert that two slices agree element-wise within `tolerance`.
#[track_caller]
pub fn assert_all_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "element {i}: expected {e} ± {tolerance}, got {a}"
        );
    }
}
