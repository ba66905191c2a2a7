//! Spin-echo contrast as a function of T1 and T2.
//!
//! A single pruned phase graph is driven through a fixed number of
//! repetitions of a crushed spin echo; the last echo approximates the
//! steady-state signal. Sweeping one relaxation time with the other held
//! fixed shows which weighting a TE/TR pair produces.

use std::time::Instant;

use mrsim_core::{Complex64, SimulationError, Species};
use mrsim_physics::{PhaseGraph, PhaseGraphEvent};
use mrsim_space::linspace;
use tracing::{debug, info, instrument};

use crate::config::ContrastConfig;
use crate::metrics::RunMetrics;

/// Events of one repetition: excitation, crushed refocalization, the
/// echo point, then the rest of the TR.
///
/// The echo is read after the fourth event.
fn repetition_events(config: &ContrastConfig) -> [PhaseGraphEvent; 6] {
    let half_te = 0.5 * config.echo_time;
    let crushed = PhaseGraphEvent::TimeInterval {
        duration: half_te,
        gradient: config.gradient,
    };
    [
        PhaseGraphEvent::Pulse {
            angle: config.excitation,
            phase: 0.0,
        },
        crushed,
        PhaseGraphEvent::Pulse {
            angle: config.refocalization,
            phase: 0.0,
        },
        crushed,
        crushed,
        PhaseGraphEvent::TimeInterval {
            duration: config.repetition_time - half_te,
            gradient: 0.0,
        },
    ]
}

const ECHO_EVENT: usize = 4;

/// Echo of the last repetition for one species.
pub fn spin_echo_signal(
    species: &Species,
    config: &ContrastConfig,
) -> Result<Complex64, SimulationError> {
    let events = repetition_events(config);
    let mut graph = PhaseGraph::new(*species).with_threshold(config.threshold);
    let mut echo = Complex64::new(0.0, 0.0);
    for _ in 0..config.repetitions {
        for (i, event) in events.iter().enumerate() {
            if i == ECHO_EVENT {
                echo = graph.echo();
            }
            graph = graph.evolve(event)?;
        }
    }
    Ok(echo)
}

/// Signal magnitude along the T1 and T2 sweeps.
#[derive(Clone, Debug)]
pub struct ContrastOutput {
    /// Swept T1 values, in seconds.
    pub t1_values: Vec<f64>,
    /// `|echo|` per T1, with T2 fixed.
    pub t1_signal: Vec<f64>,
    /// Swept T2 values, in seconds.
    pub t2_values: Vec<f64>,
    /// `|echo|` per T2, with T1 fixed.
    pub t2_signal: Vec<f64>,
    /// Run timing.
    pub metrics: RunMetrics,
}

/// Sweep T1 and T2 over `[0, sweep_max]`.
#[instrument(skip_all, name = "spin_echo_contrast")]
pub fn spin_echo_contrast(config: &ContrastConfig) -> Result<ContrastOutput, SimulationError> {
    let start = Instant::now();
    config.validate()?;

    let values = linspace(0.0, config.sweep_max, config.sweep_points);
    let t1_signal = values
        .iter()
        .map(|&t1| Ok(spin_echo_signal(&Species::new(t1, config.fixed_t2), config)?.norm()))
        .collect::<Result<Vec<_>, SimulationError>>()?;
    debug!(points = values.len(), "T1 sweep complete");
    let t2_signal = values
        .iter()
        .map(|&t2| Ok(spin_echo_signal(&Species::new(config.fixed_t1, t2), config)?.norm()))
        .collect::<Result<Vec<_>, SimulationError>>()?;
    debug!(points = values.len(), "T2 sweep complete");

    let metrics = RunMetrics {
        total_us: start.elapsed().as_micros() as u64,
        sample_count: 2 * values.len() * config.repetitions,
        position_count: 1,
        worker_count: 1,
        ..RunMetrics::default()
    };
    info!(
        te = config.echo_time,
        tr = config.repetition_time,
        runtime = %metrics.runtime_label(),
        "contrast sweep finished"
    );
    Ok(ContrastOutput {
        t1_values: values.clone(),
        t1_signal,
        t2_values: values,
        t2_signal,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContrastPreset;

    #[test]
    fn single_repetition_is_a_plain_spin_echo() {
        let config = ContrastConfig {
            repetitions: 1,
            threshold: 0.0,
            ..ContrastConfig::default()
        };
        let species = Species::new(1.0, 0.1);
        let echo = spin_echo_signal(&species, &config).unwrap();
        let expected = (-config.echo_time / species.t2).exp();
        assert!((echo.norm() - expected).abs() < 1e-12);
    }

    #[test]
    fn t1_weighted_steady_state() {
        let config = ContrastConfig::preset(ContrastPreset::T1Weighted);
        let echo = spin_echo_signal(&Species::new(1.0, 0.1), &config).unwrap();
        assert!((echo.norm() - 0.40826).abs() < 1e-4);
    }

    #[test]
    fn zero_t2_gives_no_echo() {
        let config = ContrastConfig::default();
        let echo = spin_echo_signal(&Species::new(1.0, 0.0), &config).unwrap();
        assert!(echo.norm() < 1e-12);
    }

    #[test]
    fn sweeps_share_the_grid() {
        let config = ContrastConfig {
            sweep_points: 5,
            repetitions: 20,
            ..ContrastConfig::default()
        };
        let out = spin_echo_contrast(&config).unwrap();
        assert_eq!(out.t1_values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(out.t1_values, out.t2_values);
        assert_eq!(out.t1_signal.len(), 5);
        assert_eq!(out.t2_signal.len(), 5);
        assert_eq!(out.metrics.sample_count, 200);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ContrastConfig {
            repetitions: 0,
            ..ContrastConfig::default()
        };
        assert!(matches!(
            spin_echo_contrast(&config),
            Err(SimulationError::InvalidConfig { .. })
        ));
    }
}
