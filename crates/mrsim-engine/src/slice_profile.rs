//! Slice-profile reconstruction from a phase graph.
//!
//! A sinc pulse is decomposed into hard sub-pulses played under the
//! slice-select gradient. After the train, the coherence-order table is
//! the spatial-frequency content of the excited slice: unfolding it onto
//! signed orders and inverse-transforming gives the profile.
//!
//! # Unfolding rule
//!
//! The graph stores orders `0..=K` only. The signed spectrum of length
//! `2K + 1`, indexed by order `-K..=K`, is
//!
//! ```text
//! F[0]  = F⁺₀            Z[0]  = Z₀
//! F[+k] = F⁺ₖ            Z[+k] = Zₖ
//! F[-k] = conj(F⁻ₖ)      Z[-k] = Zₖ
//! ```
//!
//! Getting a sign or conjugate wrong here mirrors or smears the profile
//! without any error, so the rule lives in [`unfold`] alone.

use std::ops::Range;
use std::time::Instant;

use mrsim_core::units::MM;
use mrsim_core::{Complex64, SimulationError};
use mrsim_physics::{
    centered_support, Envelope, HardPulseApproximation, OrderState, PhaseGraph, Pulse,
};
use rustfft::FftPlanner;
use tracing::{debug, info, instrument};

use crate::config::SliceProfileConfig;
use crate::metrics::RunMetrics;

/// Positions within this distance beyond the window edge are kept.
const CROP_TOLERANCE: f64 = 1e-12;

/// Signed-order spectra, index `i` holding order `i - K`.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    /// Transverse coherences.
    pub transversal: Vec<Complex64>,
    /// Longitudinal coherences.
    pub longitudinal: Vec<Complex64>,
}

impl Spectrum {
    /// Highest order `K`.
    pub fn max_order(&self) -> usize {
        self.transversal.len() / 2
    }
}

/// Unfold stored orders `0..=K` onto `-K..=K`.
pub fn unfold(states: &[OrderState]) -> Spectrum {
    let k_max = states.len().saturating_sub(1);
    let len = 2 * k_max + 1;
    let mut transversal = vec![Complex64::new(0.0, 0.0); len];
    let mut longitudinal = vec![Complex64::new(0.0, 0.0); len];
    for (k, state) in states.iter().enumerate() {
        transversal[k_max + k] = state.f_plus;
        longitudinal[k_max + k] = state.z;
        if k > 0 {
            transversal[k_max - k] = state.f_minus.conj();
            longitudinal[k_max - k] = state.z;
        }
    }
    Spectrum {
        transversal,
        longitudinal,
    }
}

/// Centred inverse DFT of a signed-order spectrum.
///
/// `spectrum[i]` is order `i - K` (odd length `2K + 1`). The result is the
/// unnormalized sum `Σₖ Fₖ·e^{2πi·k·j/L}` at sample `j = i - K`, so order 0
/// lands at the centre and magnitudes keep the voxel-mean scale.
pub fn inverse_transform(planner: &mut FftPlanner<f64>, spectrum: &[Complex64]) -> Vec<Complex64> {
    let len = spectrum.len();
    if len == 0 {
        return Vec::new();
    }
    let k_max = len / 2;
    // Signed order k sits at k mod L.
    let mut buffer = spectrum.to_vec();
    buffer.rotate_left(k_max);
    planner.plan_fft_inverse(len).process(&mut buffer);
    buffer.rotate_right(k_max);
    buffer
}

/// Spatial sampling step `1/(2·k_max)`, with `k_max` the highest order in
/// cycles per metre.
///
/// Fails with [`SimulationError::DegenerateSpectrum`] when no order above
/// zero exists.
pub fn spatial_step(max_order: usize, bin_width: f64) -> Result<f64, SimulationError> {
    let k_max = max_order as f64 * bin_width.abs() / std::f64::consts::TAU;
    if max_order == 0 || k_max <= 0.0 || !k_max.is_finite() {
        return Err(SimulationError::DegenerateSpectrum);
    }
    Ok(1.0 / (2.0 * k_max))
}

/// Index range of `axis` (ascending) within `[-half_width, +half_width]`.
pub fn crop_window(axis: &[f64], half_width: f64) -> Range<usize> {
    let lo = axis.partition_point(|&x| x < -half_width - CROP_TOLERANCE);
    let hi = axis.partition_point(|&x| x <= half_width + CROP_TOLERANCE);
    lo..hi.max(lo)
}

/// Reconstructed profile, cropped to `±slice_thickness`.
#[derive(Clone, Debug)]
pub struct SliceProfile {
    /// Positions, in metres, ascending and symmetric about 0.
    pub positions: Vec<f64>,
    /// Transverse magnitude per position.
    pub transversal: Vec<f64>,
    /// Longitudinal magnitude per position.
    pub longitudinal: Vec<f64>,
    /// Run timing.
    pub metrics: RunMetrics,
}

/// The sinc pulse of `config` decomposed into hard sub-pulses.
pub fn sinc_pulse(config: &SliceProfileConfig) -> Result<HardPulseApproximation, SimulationError> {
    if config.zero_crossings == 0 {
        return Err(SimulationError::InvalidParameter {
            name: "zero_crossings",
            reason: "must be at least 1".to_string(),
        });
    }
    let t0 = config.duration / (2.0 * f64::from(config.zero_crossings));
    let support = centered_support(config.duration, config.support_size);
    Ok(HardPulseApproximation::new(
        Pulse::new(config.flip_angle, 0.0),
        &support,
        Envelope::Sinc { t0 },
        1.0 / t0,
        config.slice_thickness,
    )?)
}

/// Reconstruct the slice profile described by `config`.
#[instrument(skip_all, name = "slice_profile")]
pub fn slice_profile(config: &SliceProfileConfig) -> Result<SliceProfile, SimulationError> {
    let start = Instant::now();
    config.validate()?;
    let pulse = sinc_pulse(config)?;

    let graph = pulse
        .events()
        .try_fold(PhaseGraph::new(config.species), |graph, event| {
            graph.evolve(&event)
        })?;
    let spectrum = unfold(graph.states());
    let max_order = spectrum.max_order();
    let step = spatial_step(max_order, graph.bin_width())?;
    debug!(
        max_order,
        bin_width = graph.bin_width(),
        step_mm = step / MM,
        "spectrum unfolded"
    );

    let mut planner = FftPlanner::new();
    let transversal = inverse_transform(&mut planner, &spectrum.transversal);
    let longitudinal = inverse_transform(&mut planner, &spectrum.longitudinal);

    let axis: Vec<f64> = (0..transversal.len())
        .map(|i| (i as f64 - max_order as f64) * step)
        .collect();
    let window = crop_window(&axis, config.slice_thickness);

    let metrics = RunMetrics {
        total_us: start.elapsed().as_micros() as u64,
        sample_count: pulse.pulses().len(),
        position_count: window.len(),
        worker_count: 1,
        ..RunMetrics::default()
    };
    info!(
        positions = window.len(),
        runtime = %metrics.runtime_label(),
        "slice profile finished"
    );
    Ok(SliceProfile {
        positions: axis[window.clone()].to_vec(),
        transversal: transversal[window.clone()].iter().map(|v| v.norm()).collect(),
        longitudinal: longitudinal[window].iter().map(|v| v.norm()).collect(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn unfold_places_conjugate_rephasing_orders() {
        let states = [
            OrderState {
                f_plus: c(0.1, 0.2),
                f_minus: c(0.1, -0.2),
                z: c(0.5, 0.0),
            },
            OrderState {
                f_plus: c(0.3, 0.0),
                f_minus: c(0.0, 0.4),
                z: c(0.0, 0.6),
            },
        ];
        let s = unfold(&states);
        assert_eq!(s.max_order(), 1);
        assert_eq!(s.transversal, [c(0.0, -0.4), c(0.1, 0.2), c(0.3, 0.0)]);
        assert_eq!(s.longitudinal, [c(0.0, 0.6), c(0.5, 0.0), c(0.0, 0.6)]);
    }

    #[test]
    fn inverse_transform_is_an_unnormalized_centred_sum() {
        let spectrum = [c(0.2, 0.0), c(1.0, 0.0), c(0.0, 0.3)];
        let mut planner = FftPlanner::new();
        let out = inverse_transform(&mut planner, &spectrum);
        let len = spectrum.len() as f64;
        for (i, value) in out.iter().enumerate() {
            let j = i as f64 - 1.0;
            let expected: Complex64 = spectrum
                .iter()
                .enumerate()
                .map(|(m, f)| f * Complex64::from_polar(1.0, TAU * (m as f64 - 1.0) * j / len))
                .sum();
            assert!((value - expected).norm() < 1e-12, "sample {i}");
        }
    }

    #[test]
    fn single_order_transforms_to_constant() {
        let mut planner = FftPlanner::new();
        let out = inverse_transform(&mut planner, &[c(0.7, 0.0)]);
        assert_eq!(out, [c(0.7, 0.0)]);
    }

    #[test]
    fn spatial_step_needs_an_order_above_zero() {
        assert_eq!(
            spatial_step(0, 100.0),
            Err(SimulationError::DegenerateSpectrum)
        );
        assert_eq!(
            spatial_step(3, 0.0),
            Err(SimulationError::DegenerateSpectrum)
        );
        let step = spatial_step(10, TAU * 50.0).unwrap();
        assert!((step - 1.0 / 1000.0).abs() < 1e-15);
    }

    #[test]
    fn crop_keeps_closed_window() {
        let axis = [-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0];
        assert_eq!(crop_window(&axis, 1.0), 1..6);
        assert_eq!(crop_window(&axis, 0.1), 3..4);
        assert_eq!(crop_window(&axis, 5.0), 0..7);
    }

    #[test]
    fn zero_crossings_must_be_positive() {
        let config = SliceProfileConfig {
            zero_crossings: 0,
            ..SliceProfileConfig::default()
        };
        assert!(matches!(
            slice_profile(&config),
            Err(SimulationError::InvalidParameter {
                name: "zero_crossings",
                ..
            })
        ));
    }
}
