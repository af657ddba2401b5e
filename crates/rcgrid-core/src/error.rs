//! Error types shared across the rcgrid workspace.
//!
//! Organised by subsystem: mesh and partition construction, RC constant
//! validation, and the output sink boundary.

use std::error::Error;
use std::fmt;

use crate::id::{StepId, WorkerId};

/// Errors from mesh, buffer, and partition construction.
///
/// All of these are setup-time failures: they are reported before any
/// worker thread exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A mesh dimension is zero.
    EmptyMesh {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },
    /// `rows * cols` does not fit in `usize`.
    CellCountOverflow {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },
    /// The worker count is zero.
    ZeroWorkers,
    /// The row count is not a multiple of the worker count.
    IndivisibleRows {
        /// Mesh row count.
        rows: usize,
        /// Requested worker count.
        workers: usize,
    },
    /// The worker count does not fit in a [`WorkerId`].
    TooManyWorkers {
        /// Requested worker count.
        workers: usize,
    },
    /// A row range has `from > to` or reaches past the last row.
    InvalidRange {
        /// Worker owning the range.
        worker: WorkerId,
        /// First row (inclusive).
        from: usize,
        /// Last row (inclusive).
        to: usize,
    },
    /// Two workers claim the same row.
    PartitionOverlap {
        /// The doubly-owned row.
        row: usize,
    },
    /// No worker owns this row.
    PartitionGap {
        /// The unowned row.
        row: usize,
    },
    /// A node index lies outside the mesh.
    NodeOutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Mesh shape `(rows, cols)`.
        shape: (usize, usize),
    },
    /// Two grids that must share a shape do not.
    ShapeMismatch {
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Actual `(rows, cols)`.
        found: (usize, usize),
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMesh { rows, cols } => {
                write!(f, "mesh must have at least one node, got {rows}x{cols}")
            }
            Self::CellCountOverflow { rows, cols } => {
                write!(f, "node count {rows}x{cols} overflows usize")
            }
            Self::ZeroWorkers => write!(f, "worker count must be at least 1"),
            Self::IndivisibleRows { rows, workers } => write!(
                f,
                "row count {rows} is not divisible by worker count {workers}"
            ),
            Self::TooManyWorkers { workers } => {
                write!(f, "worker count {workers} exceeds u32::MAX")
            }
            Self::InvalidRange { worker, from, to } => {
                write!(f, "worker {worker} has invalid row range [{from}, {to}]")
            }
            Self::PartitionOverlap { row } => write!(f, "row {row} is owned by two workers"),
            Self::PartitionGap { row } => write!(f, "row {row} is owned by no worker"),
            Self::NodeOutOfBounds { row, col, shape } => write!(
                f,
                "node ({row}, {col}) outside {}x{} mesh",
                shape.0, shape.1
            ),
            Self::ShapeMismatch { expected, found } => write!(
                f,
                "grid shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
        }
    }
}

impl Error for MeshError {}

/// Errors from [`RcConstants::validate()`](crate::RcConstants::validate).
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantsError {
    /// A constant is NaN or infinite.
    NonFinite {
        /// Which constant.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// A constant is zero or negative.
    NonPositive {
        /// Which constant.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// `4h / (C·R)` exceeds 2; the explicit update would diverge.
    Unstable {
        /// The computed ratio.
        ratio: f64,
    },
}

impl fmt::Display for ConstantsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { name, value } => write!(f, "{name} must be finite, got {value}"),
            Self::NonPositive { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
            Self::Unstable { ratio } => {
                write!(f, "stability ratio 4h/(C*R) = {ratio} exceeds 2")
            }
        }
    }
}

impl Error for ConstantsError {}

/// Errors reported by an [`OutputSink`](crate::OutputSink).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkError {
    /// Writing the frame failed.
    Io {
        /// Step whose frame was being written.
        step: StepId,
        /// Underlying I/O error, rendered.
        reason: String,
    },
    /// The sink refused the frame (closed, full, or out of order).
    Rejected {
        /// Step whose frame was refused.
        step: StepId,
        /// Why it was refused.
        reason: String,
    },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { step, reason } => write!(f, "write of step {step} failed: {reason}"),
            Self::Rejected { step, reason } => write!(f, "step {step} rejected: {reason}"),
        }
    }
}

impl Error for SinkError {}
