//! Run metrics and the elapsed-time label.
//!
//! [`RunMetrics`] captures timing for one simulation run. The label
//! helpers render a duration in engineering notation with SI prefixes,
//! the form shown next to each plot.

use indexmap::IndexMap;

/// Timing collected during a single simulation run.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Wall-clock time for the whole run, in microseconds.
    pub total_us: u64,
    /// Accumulated execution time per propagator, in pipeline order.
    pub propagator_us: IndexMap<String, u64>,
    /// Number of timeline samples or repetitions simulated.
    pub sample_count: usize,
    /// Number of isochromats (1 for phase-graph runs).
    pub position_count: usize,
    /// Number of workers that advanced the ensemble.
    pub worker_count: usize,
}

impl RunMetrics {
    /// Wall-clock time in seconds.
    pub fn total_seconds(&self) -> f64 {
        self.total_us as f64 * 1e-6
    }

    /// `"Runtime: <value>"` with one decimal, e.g. `"Runtime: 12.3 ms"`.
    pub fn runtime_label(&self) -> String {
        format!("Runtime: {}", to_eng_string(self.total_seconds(), "s", 1))
    }
}

const PREFIXES: [(i32, &str); 17] = [
    (24, "Y"),
    (21, "Z"),
    (18, "E"),
    (15, "P"),
    (12, "T"),
    (9, "G"),
    (6, "M"),
    (3, "k"),
    (0, ""),
    (-3, "m"),
    (-6, "µ"),
    (-9, "n"),
    (-12, "p"),
    (-15, "f"),
    (-18, "a"),
    (-21, "z"),
    (-24, "y"),
];

/// Format `value` in engineering notation: a mantissa in `[1, 1000)` and
/// the SI prefix of its power-of-thousand exponent.
///
/// Zero and non-finite values are printed without a prefix. Exponents
/// outside the prefix table are clamped to its ends.
pub fn to_eng_string(value: f64, unit: &str, decimals: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value:.decimals$} {unit}");
    }
    let exponent = value.abs().log10().floor() as i32;
    let eng = (exponent.div_euclid(3) * 3).clamp(-24, 24);
    let mut mantissa = value / 10f64.powi(eng);
    let mut eng = eng;
    // Rounding can carry into the next prefix (999.96 → "1000.0").
    let scale = 10f64.powi(decimals as i32);
    if (mantissa.abs() * scale).round() / scale >= 1000.0 && eng < 24 {
        eng += 3;
        mantissa /= 1000.0;
    }
    let prefix = PREFIXES
        .iter()
        .find(|(e, _)| *e == eng)
        .map_or("", |(_, p)| p);
    format!("{mantissa:.decimals$} {prefix}{unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.propagator_us.is_empty());
        assert_eq!(m.sample_count, 0);
        assert_eq!(m.position_count, 0);
    }

    #[test]
    fn runtime_label_uses_milliseconds() {
        let m = RunMetrics {
            total_us: 12_340,
            ..RunMetrics::default()
        };
        assert_eq!(m.runtime_label(), "Runtime: 12.3 ms");
    }

    #[test]
    fn eng_string_picks_prefix() {
        assert_eq!(to_eng_string(1.5, "s", 1), "1.5 s");
        assert_eq!(to_eng_string(0.000_25, "s", 0), "250 µs");
        assert_eq!(to_eng_string(4_200.0, "Hz", 2), "4.20 kHz");
        assert_eq!(to_eng_string(-0.02, "T", 1), "-20.0 mT");
    }

    #[test]
    fn eng_string_carries_rounding_into_next_prefix() {
        assert_eq!(to_eng_string(0.999_96, "s", 1), "1.0 s");
    }

    #[test]
    fn eng_string_handles_zero() {
        assert_eq!(to_eng_string(0.0, "s", 1), "0.0 s");
    }
}
