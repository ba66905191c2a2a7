//! RF-spoiled steady state on a single phase graph.
//!
//! Each repetition applies the flip angle at a quadratically incremented
//! phase, reads the echo at TE de-rotated by that phase, and dephases the
//! rest of the TR with a gradient winding one turn per slice thickness.

use std::f64::consts::{PI, TAU};
use std::time::Instant;

use mrsim_core::units::DEG;
use mrsim_core::{Complex64, SimulationError, Species, GAMMA};
use mrsim_physics::PhaseGraph;
use tracing::{debug, info, instrument};

use crate::config::{EfficiencyConfig, SpoilingConfig};
use crate::metrics::RunMetrics;

/// Cumulative RF phase of repetition `repetition` (0-indexed):
/// `phase_step · r(r+1)/2`, reduced to `[0, 2π)`.
pub fn spoiling_phase(phase_step: f64, repetition: usize) -> f64 {
    let r = repetition as f64;
    (phase_step * r * (r + 1.0) / 2.0).rem_euclid(TAU)
}

/// Closed-form ideally spoiled steady state:
/// `sin(α)(1 − E1) / (1 − cos(α)E1)` with `E1 = exp(−TR/T1)`.
pub fn ideal_spoiling(
    species: &Species,
    flip_angle: f64,
    repetition_time: f64,
) -> Result<f64, SimulationError> {
    if species.t1.is_nan() || species.t1 <= 0.0 {
        return Err(SimulationError::InvalidParameter {
            name: "T1",
            reason: format!("must be positive, got {} s", species.t1),
        });
    }
    if repetition_time.is_nan() || repetition_time <= 0.0 {
        return Err(SimulationError::InvalidParameter {
            name: "TR",
            reason: format!("must be positive, got {repetition_time} s"),
        });
    }
    let e1 = (-repetition_time / species.t1).exp();
    Ok(flip_angle.sin() * (1.0 - e1) / (1.0 - flip_angle.cos() * e1))
}

/// Readout gradient dephasing one turn across `slice_thickness` over
/// `duration`, in T/m.
pub fn spoiler_gradient(slice_thickness: f64, duration: f64) -> f64 {
    2.0 * PI / (GAMMA * slice_thickness) / duration
}

/// Echo train of an RF-spoiled run.
#[derive(Clone, Debug)]
pub struct SpoilingOutput {
    /// De-rotated echo per repetition.
    pub echoes: Vec<Complex64>,
    /// Closed-form ideally spoiled magnitude.
    pub ideal: f64,
    /// Run timing.
    pub metrics: RunMetrics,
}

fn echo_train(config: &SpoilingConfig) -> Result<Vec<Complex64>, SimulationError> {
    let repetitions = config.resolved_repetitions();
    let te = config.echo_time;
    let tr = config.repetition_time;
    let gradient = spoiler_gradient(config.slice_thickness, tr - te);

    let mut graph = PhaseGraph::new(config.species);
    let mut echoes = Vec::with_capacity(repetitions);
    for r in 0..repetitions {
        let phase = spoiling_phase(config.phase_step, r);
        graph.apply_pulse(config.flip_angle, phase);
        graph.apply_time_interval(te, 0.0)?;
        echoes.push(graph.echo() * Complex64::from_polar(1.0, -phase));
        graph.apply_time_interval(tr - te, gradient)?;
    }
    debug!(
        repetitions,
        max_order = graph.max_order(),
        phase_step_deg = config.phase_step / DEG,
        "echo train complete"
    );
    Ok(echoes)
}

/// Simulate the RF-spoiled train described by `config`.
#[instrument(skip_all, name = "rf_spoiling")]
pub fn rf_spoiling(config: &SpoilingConfig) -> Result<SpoilingOutput, SimulationError> {
    let start = Instant::now();
    config.validate()?;
    let ideal = ideal_spoiling(&config.species, config.flip_angle, config.repetition_time)?;
    let echoes = echo_train(config)?;
    let metrics = RunMetrics {
        total_us: start.elapsed().as_micros() as u64,
        sample_count: echoes.len(),
        position_count: 1,
        worker_count: 1,
        ..RunMetrics::default()
    };
    info!(runtime = %metrics.runtime_label(), ideal, "rf spoiling finished");
    Ok(SpoilingOutput {
        echoes,
        ideal,
        metrics,
    })
}

/// Steady-state magnitude as a function of phase increment.
#[derive(Clone, Debug)]
pub struct EfficiencyOutput {
    /// Swept phase increments, in radians.
    pub phase_steps: Vec<f64>,
    /// Magnitude of the last echo for each increment.
    pub signal: Vec<f64>,
    /// Closed-form ideally spoiled magnitude.
    pub ideal: f64,
    /// Run timing.
    pub metrics: RunMetrics,
}

/// Run one spoiled train per phase increment, keeping the last echo.
#[instrument(skip_all, name = "spoiling_efficiency")]
pub fn spoiling_efficiency(config: &EfficiencyConfig) -> Result<EfficiencyOutput, SimulationError> {
    let start = Instant::now();
    config.validate()?;
    let base = &config.spoiling;
    let ideal = ideal_spoiling(&base.species, base.flip_angle, base.repetition_time)?;
    let phase_steps = config.phase_steps();

    let mut signal = Vec::with_capacity(phase_steps.len());
    for &phase_step in &phase_steps {
        let run = SpoilingConfig {
            phase_step,
            ..base.clone()
        };
        let last = echo_train(&run)?.last().map_or(0.0, |e| e.norm());
        signal.push(last);
    }

    let metrics = RunMetrics {
        total_us: start.elapsed().as_micros() as u64,
        sample_count: phase_steps.len() * base.resolved_repetitions(),
        position_count: 1,
        worker_count: 1,
        ..RunMetrics::default()
    };
    info!(
        steps = phase_steps.len(),
        runtime = %metrics.runtime_label(),
        "spoiling efficiency finished"
    );
    Ok(EfficiencyOutput {
        phase_steps,
        signal,
        ideal,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsim_core::units::{MM, MS};

    #[test]
    fn phase_schedule_is_quadratic() {
        let step = 10.0 * DEG;
        assert_eq!(spoiling_phase(step, 0), 0.0);
        assert!((spoiling_phase(step, 1) - step).abs() < 1e-12);
        assert!((spoiling_phase(step, 2) - 3.0 * step).abs() < 1e-12);
        assert!((spoiling_phase(step, 3) - 6.0 * step).abs() < 1e-12);
        for r in 0..200 {
            let p = spoiling_phase(117.0 * DEG, r);
            assert!((0.0..TAU).contains(&p));
        }
    }

    #[test]
    fn ideal_matches_ernst_formula() {
        let species = Species::new(1.0, 1.0);
        let alpha = 30.0 * DEG;
        let e1 = (-0.025f64).exp();
        let expected = alpha.sin() * (1.0 - e1) / (1.0 - alpha.cos() * e1);
        let ideal = ideal_spoiling(&species, alpha, 25.0 * MS).unwrap();
        assert!((ideal - expected).abs() < 1e-15);
    }

    #[test]
    fn ideal_rejects_degenerate_inputs() {
        let alpha = 30.0 * DEG;
        assert!(matches!(
            ideal_spoiling(&Species::new(0.0, 1.0), alpha, 0.025),
            Err(SimulationError::InvalidParameter { name: "T1", .. })
        ));
        assert!(matches!(
            ideal_spoiling(&Species::new(1.0, 1.0), alpha, 0.0),
            Err(SimulationError::InvalidParameter { name: "TR", .. })
        ));
    }

    #[test]
    fn spoiler_winds_one_turn_per_slice() {
        let g = spoiler_gradient(MM, 20.0 * MS);
        let turns = GAMMA * g * MM * 20.0 * MS / TAU;
        assert!((turns - 1.0).abs() < 1e-12);
    }

    #[test]
    fn one_echo_per_repetition() {
        let out = rf_spoiling(&SpoilingConfig {
            repetitions: Some(12),
            ..SpoilingConfig::default()
        })
        .unwrap();
        assert_eq!(out.echoes.len(), 12);
        assert_eq!(out.metrics.sample_count, 12);
    }

    #[test]
    fn efficiency_keeps_one_value_per_step() {
        let config = EfficiencyConfig {
            spoiling: SpoilingConfig {
                repetitions: Some(20),
                ..SpoilingConfig::default()
            },
            phase_step_increment: 45.0 * DEG,
            ..EfficiencyConfig::default()
        };
        let out = spoiling_efficiency(&config).unwrap();
        assert_eq!(out.phase_steps.len(), 5);
        assert_eq!(out.signal.len(), 5);
        assert!(out.signal.iter().all(|s| s.is_finite() && *s >= 0.0));
    }
}
