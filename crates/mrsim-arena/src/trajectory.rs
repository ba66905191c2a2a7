//! Recorded ensemble trajectories.

use std::ops::Range;

use mrsim_core::{Complex64, Magnetization};

use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Every isochromat state at every sample, row-major by sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    cell_count: usize,
    sample_capacity: usize,
    states: Vec<Magnetization>,
}

impl Trajectory {
    /// Allocate an empty trajectory sized by `config`.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            cell_count: config.cell_count,
            sample_capacity: config.sample_count,
            states: Vec::with_capacity(config.cell_count * config.sample_count),
        })
    }

    /// Number of isochromats per sample.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Number of samples recorded so far.
    pub fn sample_count(&self) -> usize {
        self.states.len() / self.cell_count
    }

    /// Whether every sample the trajectory was sized for is recorded.
    pub fn is_complete(&self) -> bool {
        self.sample_count() == self.sample_capacity
    }

    /// Append one sample.
    pub fn record(&mut self, states: &[Magnetization]) -> Result<(), ArenaError> {
        if states.len() != self.cell_count {
            return Err(ArenaError::LengthMismatch {
                expected: self.cell_count,
                actual: states.len(),
            });
        }
        if self.is_complete() {
            return Err(ArenaError::TrajectoryFull {
                capacity: self.sample_capacity,
            });
        }
        self.states.extend_from_slice(states);
        Ok(())
    }

    /// All isochromat states at one sample.
    pub fn sample(&self, index: usize) -> Option<&[Magnetization]> {
        let start = index.checked_mul(self.cell_count)?;
        self.states.get(start..start + self.cell_count)
    }

    /// One isochromat at one sample.
    pub fn state(&self, sample: usize, cell: usize) -> Option<Magnetization> {
        if cell >= self.cell_count {
            return None;
        }
        self.sample(sample).map(|s| s[cell])
    }

    /// Iterate over samples in time order.
    pub fn samples(&self) -> impl Iterator<Item = &[Magnetization]> + '_ {
        self.states.chunks_exact(self.cell_count)
    }

    /// Complex transverse signal of every isochromat at one sample.
    pub fn transverse(&self, sample: usize) -> Option<Vec<Complex64>> {
        Some(self.sample(sample)?.iter().map(Magnetization::transverse).collect())
    }

    /// Stitch trajectories recorded over disjoint position ranges back
    /// into one trajectory over `0..cell_count`.
    ///
    /// `chunks` must cover every position exactly once and hold the same
    /// number of samples.
    pub fn merge(
        cell_count: usize,
        mut chunks: Vec<(Range<usize>, Trajectory)>,
    ) -> Result<Trajectory, ArenaError> {
        chunks.sort_by_key(|(range, _)| range.start);
        let mut expected_start = 0;
        for (range, part) in &chunks {
            if range.start != expected_start || range.len() != part.cell_count {
                return Err(ArenaError::InvalidChunks {
                    reason: format!(
                        "chunk {range:?} does not continue at {expected_start} \
                         with {} positions",
                        part.cell_count
                    ),
                });
            }
            expected_start = range.end;
        }
        if expected_start != cell_count {
            return Err(ArenaError::InvalidChunks {
                reason: format!("chunks cover {expected_start} of {cell_count} positions"),
            });
        }
        let sample_count = chunks.first().map_or(0, |(_, t)| t.sample_count());
        if chunks.iter().any(|(_, t)| t.sample_count() != sample_count) {
            return Err(ArenaError::InvalidChunks {
                reason: "chunks hold different sample counts".to_string(),
            });
        }

        let config = ArenaConfig::new(cell_count, sample_count);
        let mut merged = Trajectory::new(&config)?;
        let mut row = Vec::with_capacity(cell_count);
        for sample in 0..sample_count {
            row.clear();
            for (_, part) in &chunks {
                if let Some(states) = part.sample(sample) {
                    row.extend_from_slice(states);
                }
            }
            merged.record(&row)?;
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(cells: Range<usize>, samples: usize) -> Trajectory {
        let mut t = Trajectory::new(&ArenaConfig::new(cells.len(), samples)).unwrap();
        for s in 0..samples {
            let row: Vec<_> = cells
                .clone()
                .map(|c| Magnetization::from_array([c as f64, s as f64, 0.0, 1.0]))
                .collect();
            t.record(&row).unwrap();
        }
        t
    }

    #[test]
    fn records_samples_in_order() {
        let t = filled(0..3, 4);
        assert!(t.is_complete());
        assert_eq!(t.sample_count(), 4);
        assert_eq!(t.state(2, 1).map(|m| (m.x, m.y)), Some((1.0, 2.0)));
        assert_eq!(t.samples().count(), 4);
        assert_eq!(t.transverse(3).unwrap()[2], Complex64::new(2.0, 3.0));
        assert!(t.sample(4).is_none());
        assert!(t.state(0, 3).is_none());
    }

    #[test]
    fn rejects_wrong_width_and_overflow() {
        let mut t = Trajectory::new(&ArenaConfig::new(2, 1)).unwrap();
        assert_eq!(
            t.record(&[Magnetization::EQUILIBRIUM]),
            Err(ArenaError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        t.record(&[Magnetization::EQUILIBRIUM; 2]).unwrap();
        assert_eq!(
            t.record(&[Magnetization::EQUILIBRIUM; 2]),
            Err(ArenaError::TrajectoryFull { capacity: 1 })
        );
    }

    #[test]
    fn merge_restores_position_order() {
        let whole = filled(0..7, 3);
        let chunks = vec![(4..7, filled(4..7, 3)), (0..4, filled(0..4, 3))];
        assert_eq!(Trajectory::merge(7, chunks).unwrap(), whole);
    }

    #[test]
    fn merge_rejects_gaps() {
        let chunks = vec![(0..2, filled(0..2, 3)), (3..5, filled(3..5, 3))];
        assert!(matches!(
            Trajectory::merge(5, chunks),
            Err(ArenaError::InvalidChunks { .. })
        ));
    }

    #[test]
    fn merge_rejects_uneven_sample_counts() {
        let chunks = vec![(0..2, filled(0..2, 3)), (2..4, filled(2..4, 2))];
        assert!(matches!(
            Trajectory::merge(4, chunks),
            Err(ArenaError::InvalidChunks { .. })
        ));
    }
}
