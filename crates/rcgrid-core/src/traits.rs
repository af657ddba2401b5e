//! Traits at the seams between the stepping engine and its collaborators.
//!
//! - [`GridRead`]: read-only, bounds-checked access to a `rows × cols` mesh.
//! - [`Stencil`]: computes one node's next voltage from the previous grid.
//! - [`BoundarySource`]: supplies the corner voltage once per step.
//! - [`OutputSink`]: consumes one grid snapshot per step.

use crate::error::SinkError;
use crate::id::StepId;

/// Read-only view of a row-major voltage mesh.
pub trait GridRead {
    /// Number of rows.
    fn rows(&self) -> usize;

    /// Number of columns.
    fn cols(&self) -> usize;

    /// Voltage at `(row, col)`, or `None` if the index is out of range.
    fn get(&self, row: usize, col: usize) -> Option<f64>;

    /// `(rows, cols)`.
    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Total node count.
    fn node_count(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Copy the mesh out in row-major order.
    fn to_row_major(&self) -> Vec<f64> {
        let (rows, cols) = self.shape();
        let mut out = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                out.push(self.get(i, j).unwrap_or(0.0));
            }
        }
        out
    }
}

/// Per-node update rule applied by every worker.
///
/// Implementations must be pure functions of their arguments: the result
/// for `(row, col)` may depend only on `previous`, the coordinates, and
/// `source`. The engine's determinism across worker counts relies on it.
pub trait Stencil: Send + Sync + 'static {
    /// Human-readable name, used in log events.
    fn name(&self) -> &str;

    /// Next voltage of node `(row, col)`.
    ///
    /// `previous` is the fully-formed grid of the previous step and
    /// `source` the boundary voltage applied during this step.
    fn next_voltage(&self, previous: &dyn GridRead, row: usize, col: usize, source: f64) -> f64;
}

/// Supplier of the boundary voltage clamped at the four corner nodes.
///
/// Called by the controller exactly once per step, in increasing step
/// order, before the workers are released for that step.
pub trait BoundarySource: Send {
    /// Corner voltage for `step`.
    fn voltage(&mut self, step: StepId) -> f64;
}

impl<F> BoundarySource for F
where
    F: FnMut(StepId) -> f64 + Send,
{
    fn voltage(&mut self, step: StepId) -> f64 {
        self(step)
    }
}

/// Consumer of per-step grid snapshots.
///
/// `append` is called exactly once per controller iteration, in
/// increasing step order, while the controller holds exclusive access to
/// the grid. Implementations that need to keep the data must copy it.
pub trait OutputSink {
    /// Accept the snapshot for `step`.
    fn append(&mut self, step: StepId, snapshot: &dyn GridRead) -> Result<(), SinkError>;

    /// Flush buffered output after the final step. Default: no-op.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn append(&mut self, step: StepId, snapshot: &dyn GridRead) -> Result<(), SinkError> {
        (**self).append(step, snapshot)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn append(&mut self, step: StepId, snapshot: &dyn GridRead) -> Result<(), SinkError> {
        (**self).append(step, snapshot)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}
