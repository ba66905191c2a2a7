//! Pipeline validation.
//!
//! [`validate_pipeline`] runs once at engine startup and checks that every
//! propagator was built for the space and time step it is about to run
//! on. A mismatch here would otherwise index per-position tables out of
//! range or apply operators computed for the wrong interval.

use indexmap::IndexSet;
use mrsim_space::Space;

use crate::propagator::Propagator;

use std::error::Error;
use std::fmt;

/// Relative tolerance when comparing declared and configured time steps.
const TIME_STEP_TOLERANCE: f64 = 1e-12;

// ── Plan ───────────────────────────────────────────────────────────

/// Execution order of a validated pipeline.
///
/// The engine keys its per-propagator timings by these names, so
/// reported timings always follow pipeline order.
#[derive(Debug, Clone)]
#[must_use]
pub struct PipelinePlan {
    order: IndexSet<String>,
}

impl PipelinePlan {
    /// Number of propagators.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the plan is empty. Always `false` for a validated plan.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Propagator names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from pipeline validation (startup-time, not per-sample).
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// No propagators registered.
    EmptyPipeline,

    /// Two propagators share a name, which would make failures and
    /// timings ambiguous.
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// The configured time step is NaN, infinite, zero, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },

    /// A propagator was built for a different time step.
    TimeStepMismatch {
        /// Which propagator.
        propagator: String,
        /// The time step it declares.
        declared: f64,
        /// The time step of the timeline.
        configured: f64,
    },

    /// A propagator holds per-position data for a different ensemble size.
    CellCountMismatch {
        /// Which propagator.
        propagator: String,
        /// The count it declares.
        declared: usize,
        /// The number of positions in the space.
        actual: usize,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPipeline => write!(f, "pipeline has no propagators"),
            Self::DuplicateName { name } => {
                write!(f, "propagator name '{name}' is used more than once")
            }
            Self::InvalidTimeStep { value } => {
                write!(f, "time step must be finite and positive, got {value}")
            }
            Self::TimeStepMismatch {
                propagator,
                declared,
                configured,
            } => {
                write!(
                    f,
                    "propagator '{propagator}' was built for time step {declared} s, \
                     timeline uses {configured} s"
                )
            }
            Self::CellCountMismatch {
                propagator,
                declared,
                actual,
            } => {
                write!(
                    f,
                    "propagator '{propagator}' holds {declared} positions, space has {actual}"
                )
            }
        }
    }
}

impl Error for PipelineError {}

// ── Validation ─────────────────────────────────────────────────────

/// Validate a propagator pipeline against its space and time step.
///
/// Checks performed:
///
/// 1. `time_step` is finite and positive.
/// 2. Pipeline is non-empty.
/// 3. Propagator names are unique.
/// 4. Declared cell counts match `space.cell_count()`.
/// 5. Declared time steps match `time_step`.
pub fn validate_pipeline(
    propagators: &[Box<dyn Propagator>],
    space: &dyn Space,
    time_step: f64,
) -> Result<PipelinePlan, PipelineError> {
    if !time_step.is_finite() || time_step <= 0.0 {
        return Err(PipelineError::InvalidTimeStep { value: time_step });
    }
    if propagators.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    let mut order = IndexSet::with_capacity(propagators.len());
    for prop in propagators {
        let name = prop.name().to_string();
        if order.contains(&name) {
            return Err(PipelineError::DuplicateName { name });
        }

        if let Some(declared) = prop.cell_count() {
            if declared != space.cell_count() {
                return Err(PipelineError::CellCountMismatch {
                    propagator: name,
                    declared,
                    actual: space.cell_count(),
                });
            }
        }

        if let Some(declared) = prop.time_step() {
            if (declared - time_step).abs() > TIME_STEP_TOLERANCE * time_step {
                return Err(PipelineError::TimeStepMismatch {
                    propagator: name,
                    declared,
                    configured: time_step,
                });
            }
        }

        order.insert(name);
    }

    Ok(PipelinePlan { order })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StepContext;
    use mrsim_core::PropagatorError;
    use mrsim_space::Line1D;

    // ── Test propagators ───────────────────────────────────────

    struct Named(&'static str);
    impl Propagator for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
            Ok(())
        }
    }

    struct Fixed(usize);
    impl Propagator for Fixed {
        fn name(&self) -> &str {
            "sized"
        }
        fn cell_count(&self) -> Option<usize> {
            Some(self.0)
        }
        fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
            Ok(())
        }
    }

    struct Stepped(f64);
    impl Propagator for Stepped {
        fn name(&self) -> &str {
            "stepped"
        }
        fn time_step(&self) -> Option<f64> {
            Some(self.0)
        }
        fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
            Ok(())
        }
    }

    fn space(n: usize) -> Line1D {
        Line1D::centered(1e-3, n).unwrap()
    }

    #[test]
    fn valid_pipeline_keeps_order() {
        let props: Vec<Box<dyn Propagator>> = vec![
            Box::new(Named("pulse")),
            Box::new(Fixed(4)),
            Box::new(Stepped(0.01)),
        ];
        let plan = validate_pipeline(&props, &space(4), 0.01).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(!plan.is_empty());
        assert_eq!(plan.names().collect::<Vec<_>>(), ["pulse", "sized", "stepped"]);
    }

    #[test]
    fn empty_pipeline_fails() {
        let props: Vec<Box<dyn Propagator>> = vec![];
        assert_eq!(
            validate_pipeline(&props, &space(4), 0.01).unwrap_err(),
            PipelineError::EmptyPipeline
        );
    }

    #[test]
    fn invalid_time_step_fails() {
        let props: Vec<Box<dyn Propagator>> = vec![Box::new(Named("a"))];
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_pipeline(&props, &space(4), dt),
                Err(PipelineError::InvalidTimeStep { .. })
            ));
        }
    }

    #[test]
    fn duplicate_names_fail() {
        let props: Vec<Box<dyn Propagator>> = vec![Box::new(Named("a")), Box::new(Named("a"))];
        assert_eq!(
            validate_pipeline(&props, &space(4), 0.01).unwrap_err(),
            PipelineError::DuplicateName { name: "a".into() }
        );
    }

    #[test]
    fn cell_count_mismatch_fails() {
        let props: Vec<Box<dyn Propagator>> = vec![Box::new(Fixed(5))];
        assert_eq!(
            validate_pipeline(&props, &space(4), 0.01).unwrap_err(),
            PipelineError::CellCountMismatch {
                propagator: "sized".into(),
                declared: 5,
                actual: 4,
            }
        );
    }

    #[test]
    fn time_step_mismatch_fails() {
        let props: Vec<Box<dyn Propagator>> = vec![Box::new(Stepped(0.02))];
        assert!(matches!(
            validate_pipeline(&props, &space(4), 0.01),
            Err(PipelineError::TimeStepMismatch { .. })
        ));
    }
}
