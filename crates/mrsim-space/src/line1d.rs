//! Isochromats spread along one axis.

use crate::error::SpaceError;
use crate::space::Space;

/// `count` evenly spaced values from `start` to `stop`, both included.
///
/// A single value sits at the midpoint of the range.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.5 * (start + stop)],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Isochromat positions along a single axis.
///
/// # Examples
///
/// ```
/// use mrsim_space::{Line1D, Space};
///
/// let line = Line1D::centered(1e-3, 5).unwrap();
/// assert_eq!(line.cell_count(), 5);
/// assert_eq!(line.position(0), Some(-0.5e-3));
/// assert_eq!(line.position(2), Some(0.0));
/// assert_eq!(line.position(5), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Line1D {
    positions: Vec<f64>,
}

impl Line1D {
    /// `count` positions evenly spanning `[-extent/2, +extent/2]`, endpoints
    /// included. A single position sits at 0.
    pub fn centered(extent: f64, count: usize) -> Result<Self, SpaceError> {
        if count == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if !extent.is_finite() || extent < 0.0 {
            return Err(SpaceError::InvalidExtent { value: extent });
        }
        Ok(Self {
            positions: linspace(-0.5 * extent, 0.5 * extent, count),
        })
    }

    /// Arbitrary positions, in metres.
    pub fn from_positions(positions: Vec<f64>) -> Result<Self, SpaceError> {
        if positions.is_empty() {
            return Err(SpaceError::EmptySpace);
        }
        if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
            return Err(SpaceError::NonFinitePosition { index });
        }
        Ok(Self { positions })
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always returns `false`; construction rejects empty lines.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Space for Line1D {
    fn cell_count(&self) -> usize {
        self.positions.len()
    }

    fn positions(&self) -> &[f64] {
        &self.positions
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn partition_is_contiguous(count in 1usize..500, parts in 0usize..40) {
            let line = Line1D::centered(1e-3, count).unwrap();
            let chunks = line.partition(parts);
            prop_assert!(!chunks.is_empty());
            prop_assert_eq!(chunks[0].start, 0);
            prop_assert_eq!(chunks[chunks.len() - 1].end, count);
            for w in chunks.windows(2) {
                prop_assert_eq!(w[0].end, w[1].start);
            }
            prop_assert!(chunks.iter().all(|c| !c.is_empty()));
        }
    }
}
