//! The core `Space` trait.

use smallvec::SmallVec;
use std::ops::Range;

/// Layout of the isochromats simulated in one voxel.
///
/// Each isochromat has a flat index in `0..cell_count()` and a signed
/// displacement along the gradient axis, in metres.
///
/// # Thread Safety
///
/// `Sync` is required because one `&dyn Space` is handed to every worker
/// of a parallel run.
pub trait Space: Send + Sync + 'static {
    /// Number of isochromats.
    fn cell_count(&self) -> usize;

    /// Displacement of every isochromat, indexed by flat index.
    fn positions(&self) -> &[f64];

    /// Displacement of one isochromat.
    fn position(&self, index: usize) -> Option<f64> {
        self.positions().get(index).copied()
    }

    /// Split the flat index range into at most `parts` contiguous,
    /// non-empty chunks of near-equal size, in index order.
    fn partition(&self, parts: usize) -> SmallVec<[Range<usize>; 8]> {
        let n = self.cell_count();
        let parts = parts.clamp(1, n.max(1));
        let base = n / parts;
        let extra = n % parts;
        let mut chunks = SmallVec::new();
        let mut start = 0;
        for i in 0..parts {
            let len = base + usize::from(i < extra);
            if len == 0 {
                continue;
            }
            chunks.push(start..start + len);
            start += len;
        }
        chunks
    }
}
