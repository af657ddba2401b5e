//! Double-buffered voltage grid.
//!
//! [`GridBuffers`] holds the `previous` and `current` meshes of two
//! adjacent steps. The lifecycle per step is:
//!
//! 1. Workers read `previous` and write their bands of `current`.
//! 2. The controller hands `previous` to the output sink.
//! 3. [`promote()`](GridBuffers::promote): copy `current` into
//!    `previous`, then zero `current`.
//!
//! Both buffers are allocated once and always share a shape.

use rcgrid_core::{GridRead, MeshError};

use crate::grid::{Grid, RowBand, SharedGrid};
use crate::partition::RowRange;

/// The `previous` / `current` pair of shared grids.
#[derive(Debug)]
pub struct GridBuffers {
    previous: SharedGrid,
    current: SharedGrid,
}

impl GridBuffers {
    /// Allocate both buffers zero-filled.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MeshError> {
        Ok(Self {
            previous: SharedGrid::zeros(rows, cols)?,
            current: SharedGrid::zeros(rows, cols)?,
        })
    }

    /// Allocate both buffers with `initial` as the previous-step state.
    pub fn from_initial(initial: &Grid) -> Self {
        let current = SharedGrid::from_grid(initial);
        current.clear();
        Self {
            previous: SharedGrid::from_grid(initial),
            current,
        }
    }

    /// `(rows, cols)` of both buffers.
    pub fn shape(&self) -> (usize, usize) {
        self.previous.shape()
    }

    /// The fully-formed grid of the previous step.
    pub fn previous(&self) -> &SharedGrid {
        &self.previous
    }

    /// The grid being computed in the current step.
    pub fn current(&self) -> &SharedGrid {
        &self.current
    }

    /// Write access to one worker's rows of `current`.
    pub fn current_band(&self, range: RowRange) -> Result<RowBand<'_>, MeshError> {
        self.current.band(range)
    }

    /// Set the four corners of `previous` to `voltage`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. [`zeros`](Self::zeros) rejects
    /// such a mesh, so only an empty grid passed to
    /// [`from_initial`](Self::from_initial) can reach it.
    pub fn seed_corners(&self, voltage: f64) {
        let (rows, cols) = self.shape();
        for (r, c) in [(0, 0), (0, cols - 1), (rows - 1, 0), (rows - 1, cols - 1)] {
            self.previous
                .store(r, c, voltage)
                .expect("corner inside a non-empty mesh");
        }
    }

    /// Make `current` the new `previous` and zero `current`.
    ///
    /// # Panics
    ///
    /// Panics if the two buffers differ in shape. Both are allocated
    /// together with one shape and never reallocated.
    pub fn promote(&self) {
        self.previous
            .copy_from(&self.current)
            .expect("previous and current share a shape");
        self.current.clear();
    }
}
