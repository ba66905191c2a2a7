//! Experiment pipelines producing named plot series.
//!
//! Each pipeline runs one simulation and repackages its output as
//! [`Series`] keyed by plot name, in the order a front end draws them,
//! together with the run's [`RunMetrics`].

use indexmap::IndexMap;
use mrsim_core::units::{DEG, MM, MS};
use mrsim_core::{Series, SimulationError};

use crate::config::{
    ContrastConfig, EfficiencyConfig, EnsembleConfig, SliceProfileConfig, SpoilingConfig,
};
use crate::metrics::RunMetrics;

/// Named series of one experiment plus its timing.
#[derive(Clone, Debug, Default)]
pub struct ExperimentOutput {
    /// Plot series in drawing order.
    pub series: IndexMap<String, Series>,
    /// Run timing.
    pub metrics: RunMetrics,
}

impl ExperimentOutput {
    fn new(metrics: RunMetrics) -> Self {
        Self {
            series: IndexMap::new(),
            metrics,
        }
    }

    fn with(mut self, name: &str, series: Series) -> Self {
        self.series.insert(name.to_owned(), series);
        self
    }

    /// Look up a series by name.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    /// `"Runtime: …"` label for the run.
    pub fn runtime_label(&self) -> String {
        self.metrics.runtime_label()
    }
}

fn scaled(values: &[f64], unit: f64) -> Vec<f64> {
    values.iter().map(|v| v / unit).collect()
}

fn paired(x: &[f64], y: &[f64]) -> Series {
    Series::from_points(x.iter().copied().zip(y.iter().copied()))
}

/// Magnitude and phase envelope of an ensemble spin-echo train vs time (ms).
pub fn fast_spin_echo(config: &EnsembleConfig) -> Result<ExperimentOutput, SimulationError> {
    let out = crate::ensemble::simulate_ensemble(config)?;
    Ok(ExperimentOutput::new(out.metrics)
        .with("magnitude", paired(&out.times_ms, &out.magnitude))
        .with("phase_min", paired(&out.times_ms, &out.phase_min))
        .with("phase_max", paired(&out.times_ms, &out.phase_max)))
}

/// Echo magnitude per repetition, with the ideal level drawn across the train.
pub fn rf_spoiling_evolution(config: &SpoilingConfig) -> Result<ExperimentOutput, SimulationError> {
    let out = crate::spoiling::rf_spoiling(config)?;
    let repetitions = out.echoes.len() as f64;
    let signal = Series::from_points(
        out.echoes
            .iter()
            .enumerate()
            .map(|(r, e)| (r as f64, e.norm())),
    );
    let ideal = Series::from_points([(0.0, out.ideal), (repetitions, out.ideal)]);
    Ok(ExperimentOutput::new(out.metrics)
        .with("signal", signal)
        .with("ideal_spoiling", ideal))
}

/// Steady-state magnitude vs phase increment (degrees).
pub fn rf_spoiling_efficiency(
    config: &EfficiencyConfig,
) -> Result<ExperimentOutput, SimulationError> {
    let out = crate::spoiling::spoiling_efficiency(config)?;
    let steps_deg = scaled(&out.phase_steps, DEG);
    let ideal = Series::from_points(steps_deg.iter().map(|&x| (x, out.ideal)));
    Ok(ExperimentOutput::new(out.metrics)
        .with("signal", paired(&steps_deg, &out.signal))
        .with("ideal_spoiling", ideal))
}

/// Transverse and longitudinal slice profiles vs position (mm).
pub fn slice_profile(config: &SliceProfileConfig) -> Result<ExperimentOutput, SimulationError> {
    let out = crate::slice_profile::slice_profile(config)?;
    let positions_mm = scaled(&out.positions, MM);
    Ok(ExperimentOutput::new(out.metrics)
        .with("transversal", paired(&positions_mm, &out.transversal))
        .with("longitudinal", paired(&positions_mm, &out.longitudinal)))
}

/// Spin-echo signal vs T1 and vs T2 (ms).
pub fn spin_echo_contrast(config: &ContrastConfig) -> Result<ExperimentOutput, SimulationError> {
    let out = crate::contrast::spin_echo_contrast(config)?;
    Ok(ExperimentOutput::new(out.metrics)
        .with("t1_sweep", paired(&scaled(&out.t1_values, MS), &out.t1_signal))
        .with("t2_sweep", paired(&scaled(&out.t2_values, MS), &out.t2_signal)))
}
