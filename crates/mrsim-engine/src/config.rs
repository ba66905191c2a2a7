//! Simulation configuration, validation, and error types.
//!
//! Each simulation entry point takes one config struct. Defaults carry the
//! parameter values of the interactive demos; [`validate()`] methods check
//! structural invariants before any work starts.
//!
//! [`validate()`]: EnsembleConfig::validate

use std::error::Error;
use std::fmt;

use mrsim_arena::{ArenaConfig, ArenaError};
use mrsim_core::units::{DEG, MM, MS, MT_PER_M};
use mrsim_core::{SequenceError, SimulationError, Species};
use mrsim_propagator::PipelineError;
use mrsim_space::SpaceError;

use crate::schedule::SequenceParameters;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a simulation config.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Sequence timing cannot be scheduled.
    Sequence(SequenceError),
    /// Propagator pipeline validation failed.
    Pipeline(PipelineError),
    /// Arena sizing is invalid.
    Arena(ArenaError),
    /// The isochromat layout is invalid.
    Space(SpaceError),
    /// A relaxation time is NaN or negative.
    InvalidSpecies {
        /// Description of the validation failure.
        reason: String,
    },
    /// A quantity that must be finite and positive is not.
    InvalidValue {
        /// Which parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Timing parameters are inconsistent with each other.
    InvalidTiming {
        /// Description of the inconsistency.
        reason: String,
    },
    /// A sweep or repetition count resolves to zero entries.
    EmptySweep {
        /// Which parameter.
        name: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(e) => write!(f, "sequence: {e}"),
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Space(e) => write!(f, "space: {e}"),
            Self::InvalidSpecies { reason } => write!(f, "invalid species: {reason}"),
            Self::InvalidValue { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::InvalidTiming { reason } => write!(f, "invalid timing: {reason}"),
            Self::EmptySweep { name } => write!(f, "{name} resolves to zero entries"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sequence(e) => Some(e),
            Self::Pipeline(e) => Some(e),
            Self::Arena(e) => Some(e),
            Self::Space(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SequenceError> for ConfigError {
    fn from(e: SequenceError) -> Self {
        Self::Sequence(e)
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Sequence(e) => SimulationError::Sequence(e),
            other => SimulationError::InvalidConfig {
                reason: other.to_string(),
            },
        }
    }
}

// ── Shared checks ──────────────────────────────────────────────────

fn check_species(species: &Species) -> Result<(), ConfigError> {
    for (name, value) in [("T1", species.t1), ("T2", species.t2)] {
        if value.is_nan() || value < 0.0 {
            return Err(ConfigError::InvalidSpecies {
                reason: format!("{name} must be non-negative, got {value} s"),
            });
        }
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { name, value })
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { name, value })
    }
}

// ── EnsembleConfig ─────────────────────────────────────────────────

/// Configuration of an isochromat-ensemble spin-echo simulation.
#[derive(Clone, Debug)]
pub struct EnsembleConfig {
    /// Relaxation times. Default: T1 = 600 ms, T2 = 400 ms.
    pub species: Species,
    /// Pulse angles and timing.
    pub sequence: SequenceParameters,
    /// Voxel size along the readout axis, in metres. Default: 1 mm.
    pub voxel_size: f64,
    /// Number of isochromats across the voxel. Default: 50.
    pub position_count: usize,
    /// Worker threads. `None` = auto-detect
    /// (`available_parallelism / 2`, clamped to `[1, 16]`).
    pub worker_count: Option<usize>,
    /// Upper bound on recorded `samples × positions` states.
    pub max_recorded_states: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            species: Species::new(600.0 * MS, 400.0 * MS),
            sequence: SequenceParameters::default(),
            voxel_size: 1.0 * MM,
            position_count: 50,
            worker_count: None,
            max_recorded_states: ArenaConfig::DEFAULT_MAX_RECORDED_STATES,
        }
    }
}

impl EnsembleConfig {
    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_species(&self.species)?;
        self.sequence.validate()?;
        check_positive("voxel_size", self.voxel_size)?;
        if self.position_count == 0 {
            return Err(ConfigError::Space(SpaceError::EmptySpace));
        }
        self.arena_config().validate()?;
        Ok(())
    }

    /// Trajectory sizing for this run.
    pub fn arena_config(&self) -> ArenaConfig {
        ArenaConfig {
            max_recorded_states: self.max_recorded_states,
            ..ArenaConfig::new(self.position_count, self.sequence.step_count())
        }
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`. The result never exceeds
    /// the number of positions, so every worker owns at least one.
    pub fn resolved_worker_count(&self) -> usize {
        let workers = match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                (cpus / 2).clamp(1, 16)
            }
        };
        workers.min(self.position_count.max(1))
    }
}

// ── SpoilingConfig ─────────────────────────────────────────────────

/// Configuration of an RF-spoiled gradient-echo train.
#[derive(Clone, Debug)]
pub struct SpoilingConfig {
    /// Relaxation times. Default: T1 = T2 = 1000 ms.
    pub species: Species,
    /// Flip angle, in radians. Default: 30°.
    pub flip_angle: f64,
    /// Echo time, in seconds. Default: 5 ms.
    pub echo_time: f64,
    /// Repetition time, in seconds. Default: 25 ms.
    pub repetition_time: f64,
    /// Slice thickness setting the per-TR dephasing, in metres.
    /// Default: 1 mm.
    pub slice_thickness: f64,
    /// Quadratic phase increment, in radians. Default: 0°.
    pub phase_step: f64,
    /// Number of repetitions. `None` = `floor(4·T1/TR)`.
    pub repetitions: Option<usize>,
}

impl Default for SpoilingConfig {
    fn default() -> Self {
        Self {
            species: Species::new(1000.0 * MS, 1000.0 * MS),
            flip_angle: 30.0 * DEG,
            echo_time: 5.0 * MS,
            repetition_time: 25.0 * MS,
            slice_thickness: 1.0 * MM,
            phase_step: 0.0,
            repetitions: None,
        }
    }
}

impl SpoilingConfig {
    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_species(&self.species)?;
        check_finite("flip_angle", self.flip_angle)?;
        check_finite("phase_step", self.phase_step)?;
        check_positive("repetition_time", self.repetition_time)?;
        check_positive("slice_thickness", self.slice_thickness)?;
        if !self.echo_time.is_finite()
            || self.echo_time < 0.0
            || self.echo_time >= self.repetition_time
        {
            return Err(ConfigError::InvalidTiming {
                reason: format!(
                    "TE must satisfy 0 <= TE < TR, got TE = {} s, TR = {} s",
                    self.echo_time, self.repetition_time
                ),
            });
        }
        if self.resolved_repetitions() == 0 {
            return Err(ConfigError::EmptySweep {
                name: "repetitions",
            });
        }
        Ok(())
    }

    /// Resolve the repetition count, applying the `floor(4·T1/TR)` default.
    pub fn resolved_repetitions(&self) -> usize {
        self.repetitions
            .unwrap_or_else(|| default_repetitions(&self.species, self.repetition_time))
    }
}

/// Repetitions needed to approach the steady state: `floor(4·T1/TR)`.
///
/// Returns 0 when `TR` is not positive.
pub fn default_repetitions(species: &Species, repetition_time: f64) -> usize {
    if repetition_time > 0.0 && species.t1.is_finite() {
        (4.0 * species.t1 / repetition_time).floor().max(0.0) as usize
    } else {
        0
    }
}

// ── EfficiencyConfig ───────────────────────────────────────────────

/// Configuration of a spoiling-efficiency sweep over phase increments.
#[derive(Clone, Debug)]
pub struct EfficiencyConfig {
    /// The spoiled train. Its `phase_step` is replaced by each swept value.
    pub spoiling: SpoilingConfig,
    /// First phase increment, in radians. Default: 0°.
    pub phase_step_start: f64,
    /// Last phase increment (inclusive), in radians. Default: 180°.
    pub phase_step_stop: f64,
    /// Sweep resolution, in radians. Default: 1.5°.
    pub phase_step_increment: f64,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            spoiling: SpoilingConfig::default(),
            phase_step_start: 0.0,
            phase_step_stop: 180.0 * DEG,
            phase_step_increment: 1.5 * DEG,
        }
    }
}

impl EfficiencyConfig {
    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spoiling.validate()?;
        check_finite("phase_step_start", self.phase_step_start)?;
        check_finite("phase_step_stop", self.phase_step_stop)?;
        check_positive("phase_step_increment", self.phase_step_increment)?;
        if self.phase_step_stop < self.phase_step_start {
            return Err(ConfigError::EmptySweep {
                name: "phase_steps",
            });
        }
        Ok(())
    }

    /// Swept phase increments, `start..=stop` every `increment`.
    pub fn phase_steps(&self) -> Vec<f64> {
        if self.phase_step_stop < self.phase_step_start || self.phase_step_increment <= 0.0 {
            return Vec::new();
        }
        let span = (self.phase_step_stop - self.phase_step_start) / self.phase_step_increment;
        let count = (span + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| self.phase_step_start + i as f64 * self.phase_step_increment)
            .collect()
    }
}

// ── SliceProfileConfig ─────────────────────────────────────────────

/// Configuration of a sinc-pulse slice-profile reconstruction.
#[derive(Clone, Debug)]
pub struct SliceProfileConfig {
    /// Relaxation times. Default: T1 = 1000 ms, T2 = 100 ms.
    pub species: Species,
    /// Flip angle, in radians. Default: 90°.
    pub flip_angle: f64,
    /// Pulse duration, in seconds. Default: 10 ms.
    pub duration: f64,
    /// Zero crossings of the sinc on each side of its centre. Default: 10.
    pub zero_crossings: u32,
    /// Slice thickness, in metres. Also the half-width of the returned
    /// profile window. Default: 1 mm.
    pub slice_thickness: f64,
    /// Number of hard sub-pulses. Default: 101.
    pub support_size: usize,
}

impl Default for SliceProfileConfig {
    fn default() -> Self {
        Self {
            species: Species::new(1000.0 * MS, 100.0 * MS),
            flip_angle: 90.0 * DEG,
            duration: 10.0 * MS,
            zero_crossings: 10,
            slice_thickness: 1.0 * MM,
            support_size: 101,
        }
    }
}

impl SliceProfileConfig {
    /// Check structural invariants.
    ///
    /// A zero `zero_crossings` is reported by the reconstructor itself as
    /// an invalid parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_species(&self.species)?;
        check_finite("flip_angle", self.flip_angle)?;
        check_positive("duration", self.duration)?;
        check_positive("slice_thickness", self.slice_thickness)?;
        if self.support_size == 0 {
            return Err(ConfigError::EmptySweep {
                name: "support_size",
            });
        }
        Ok(())
    }
}

// ── ContrastConfig ─────────────────────────────────────────────────

/// Named TE/TR pairs giving classic spin-echo weightings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContrastPreset {
    /// Short TE, short TR.
    T1Weighted,
    /// Long TE, long TR.
    T2Weighted,
    /// Short TE, long TR.
    ProtonDensityWeighted,
}

impl ContrastPreset {
    /// `(TE, TR)` in seconds.
    pub fn timing(self) -> (f64, f64) {
        match self {
            Self::T1Weighted => (10.0 * MS, 600.0 * MS),
            Self::T2Weighted => (100.0 * MS, 3000.0 * MS),
            Self::ProtonDensityWeighted => (10.0 * MS, 3000.0 * MS),
        }
    }
}

/// Configuration of a spin-echo contrast sweep over T1 and T2.
#[derive(Clone, Debug)]
pub struct ContrastConfig {
    /// Excitation flip angle, in radians. Default: 90°.
    pub excitation: f64,
    /// Refocalization flip angle, in radians. Default: 180°.
    pub refocalization: f64,
    /// Echo time, in seconds.
    pub echo_time: f64,
    /// Repetition time, in seconds.
    pub repetition_time: f64,
    /// Repetitions before the echo is read. Default: 150.
    pub repetitions: usize,
    /// Phase-graph pruning threshold. Default: 1e-3.
    pub threshold: f64,
    /// Crusher gradient around the refocalization, in T/m. Default: 1 mT/m.
    pub gradient: f64,
    /// Relaxation times per sweep. Default: 20.
    pub sweep_points: usize,
    /// Largest swept relaxation time, in seconds. Default: 1 s.
    pub sweep_max: f64,
    /// T1 held fixed while T2 is swept. Default: 1000 ms.
    pub fixed_t1: f64,
    /// T2 held fixed while T1 is swept. Default: 100 ms.
    pub fixed_t2: f64,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self::preset(ContrastPreset::T1Weighted)
    }
}

impl ContrastConfig {
    /// Defaults with the timing of `preset`.
    pub fn preset(preset: ContrastPreset) -> Self {
        let (echo_time, repetition_time) = preset.timing();
        Self {
            excitation: 90.0 * DEG,
            refocalization: 180.0 * DEG,
            echo_time,
            repetition_time,
            repetitions: 150,
            threshold: 1e-3,
            gradient: 1.0 * MT_PER_M,
            sweep_points: 20,
            sweep_max: 1.0,
            fixed_t1: 1000.0 * MS,
            fixed_t2: 100.0 * MS,
        }
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_finite("excitation", self.excitation)?;
        check_finite("refocalization", self.refocalization)?;
        check_finite("gradient", self.gradient)?;
        check_positive("sweep_max", self.sweep_max)?;
        if self.threshold.is_nan() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "threshold",
                value: self.threshold,
            });
        }
        check_species(&Species::new(self.fixed_t1, self.fixed_t2))?;
        if !self.echo_time.is_finite()
            || self.echo_time < 0.0
            || !self.repetition_time.is_finite()
            || self.repetition_time < self.echo_time / 2.0
        {
            return Err(ConfigError::InvalidTiming {
                reason: format!(
                    "TE must satisfy 0 <= TE/2 <= TR, got TE = {} s, TR = {} s",
                    self.echo_time, self.repetition_time
                ),
            });
        }
        if self.repetitions == 0 {
            return Err(ConfigError::EmptySweep {
                name: "repetitions",
            });
        }
        if self.sweep_points == 0 {
            return Err(ConfigError::EmptySweep {
                name: "sweep_points",
            });
        }
        Ok(())
    }
}
