//! Row-major voltage grids.
//!
//! - [`Grid`]: an owned, single-threaded snapshot. Sinks and tests keep
//!   these.
//! - [`SharedGrid`]: the lock-free buffer shared between the controller
//!   and the workers. Reads go through [`GridRead`]; worker writes go
//!   through a [`RowBand`] restricted to one partition range.

use rcgrid_core::{GridRead, MeshError, VoltageCell};

use crate::partition::RowRange;

/// Validate `rows × cols` and return the node count.
pub(crate) fn checked_node_count(rows: usize, cols: usize) -> Result<usize, MeshError> {
    if rows == 0 || cols == 0 {
        return Err(MeshError::EmptyMesh { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(MeshError::CellCountOverflow { rows, cols })
}

// ── Grid ───────────────────────────────────────────────────────────

/// Owned `rows × cols` voltage mesh in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// A zero-filled grid.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MeshError> {
        let n = checked_node_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; n],
        })
    }

    /// Wrap existing row-major data.
    ///
    /// Returns `Err(MeshError::ShapeMismatch)` if `data.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, MeshError> {
        let n = checked_node_count(rows, cols)?;
        if data.len() != n {
            return Err(MeshError::ShapeMismatch {
                expected: (rows, cols),
                found: (data.len() / cols, cols),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Copy any readable grid.
    pub fn capture(source: &dyn GridRead) -> Self {
        Self {
            rows: source.rows(),
            cols: source.cols(),
            data: source.to_row_major(),
        }
    }

    /// Row-major node values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// One row, or `None` past the last row.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// Mutable access to one node.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut f64> {
        if row < self.rows && col < self.cols {
            Some(&mut self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// The four corner values in `(0,0), (0,c-1), (r-1,0), (r-1,c-1)` order.
    pub fn corners(&self) -> [f64; 4] {
        let (r, c) = (self.rows - 1, self.cols - 1);
        [
            self.data[0],
            self.data[c],
            self.data[r * self.cols],
            self.data[r * self.cols + c],
        ]
    }

    /// Largest absolute node value.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0f64, |m, v| m.max(v.abs()))
    }

    /// Whether every node is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Consume the grid, returning its row-major data.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

impl GridRead for Grid {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    fn to_row_major(&self) -> Vec<f64> {
        self.data.clone()
    }
}

// ── SharedGrid ─────────────────────────────────────────────────────

/// Lock-free `rows × cols` voltage buffer shared between threads.
///
/// Every accessor is bounds-checked. Mutating methods take `&self`; the
/// caller is responsible for only using them while it owns the buffer
/// (see the crate-level ownership model).
pub struct SharedGrid {
    rows: usize,
    cols: usize,
    cells: Box<[VoltageCell]>,
}

impl SharedGrid {
    /// A zero-filled shared grid.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MeshError> {
        let n = checked_node_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: (0..n).map(|_| VoltageCell::default()).collect(),
        })
    }

    /// Build a shared grid holding a copy of `grid`.
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            rows: grid.rows,
            cols: grid.cols,
            cells: grid.data.iter().map(|&v| VoltageCell::new(v)).collect(),
        }
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, MeshError> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(MeshError::NodeOutOfBounds {
                row,
                col,
                shape: (self.rows, self.cols),
            })
        }
    }

    /// Overwrite one node.
    pub fn store(&self, row: usize, col: usize, value: f64) -> Result<(), MeshError> {
        let idx = self.index(row, col)?;
        self.cells[idx].set(value);
        Ok(())
    }

    /// Set every node to `value`.
    pub fn fill(&self, value: f64) {
        for cell in self.cells.iter() {
            cell.set(value);
        }
    }

    /// Set every node to zero.
    pub fn clear(&self) {
        self.fill(0.0);
    }

    /// Copy every node of `other` into `self`.
    ///
    /// Returns `Err(MeshError::ShapeMismatch)` if the shapes differ.
    pub fn copy_from(&self, other: &SharedGrid) -> Result<(), MeshError> {
        if self.shape() != other.shape() {
            return Err(MeshError::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        for (dst, src) in self.cells.iter().zip(other.cells.iter()) {
            dst.set(src.get());
        }
        Ok(())
    }

    /// Copy the buffer into an owned [`Grid`].
    pub fn snapshot(&self) -> Grid {
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self.cells.iter().map(VoltageCell::get).collect(),
        }
    }

    /// A writer restricted to the rows of `range`.
    ///
    /// Returns `Err(MeshError::InvalidRange)` if the range is inverted or
    /// reaches past the last row.
    pub fn band(&self, range: RowRange) -> Result<RowBand<'_>, MeshError> {
        if range.from > range.to || range.to >= self.rows {
            return Err(MeshError::InvalidRange {
                worker: range.worker,
                from: range.from,
                to: range.to,
            });
        }
        Ok(RowBand { grid: self, range })
    }
}

impl GridRead for SharedGrid {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.index(row, col).ok().map(|i| self.cells[i].get())
    }

    fn to_row_major(&self) -> Vec<f64> {
        self.cells.iter().map(VoltageCell::get).collect()
    }
}

impl std::fmt::Debug for SharedGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedGrid")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish_non_exhaustive()
    }
}

// ── RowBand ────────────────────────────────────────────────────────

/// Write access to the rows one worker owns in a [`SharedGrid`].
///
/// Created by [`SharedGrid::band()`]. Because the partition table hands
/// each worker a disjoint range, no two live bands ever write the same
/// node.
#[derive(Debug)]
pub struct RowBand<'g> {
    grid: &'g SharedGrid,
    range: RowRange,
}

impl RowBand<'_> {
    /// The owned row range.
    pub fn range(&self) -> RowRange {
        self.range
    }

    /// Column count of the underlying grid.
    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    /// Write one node of an owned row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is outside this band or `col` is outside the mesh.
    /// Either means the partition invariant has been broken.
    #[inline]
    pub fn write(&self, row: usize, col: usize, value: f64) {
        assert!(
            self.range.contains(row),
            "worker {} wrote row {row} outside its band [{}, {}]",
            self.range.worker,
            self.range.from,
            self.range.to,
        );
        assert!(col < self.grid.cols, "column {col} outside mesh");
        self.grid.cells[row * self.grid.cols + col].set(value);
    }
}
